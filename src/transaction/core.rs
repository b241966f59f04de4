//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, category::CategoryName, database_id::TransactionId, period::parse_date};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionKind {
    /// The kind as it is stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidKind(other.to_owned())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

impl From<TransactionKind> for Value {
    fn from(kind: TransactionKind) -> Self {
        Value::Text(kind.as_str().to_owned())
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The category the transaction belongs to, e.g. "Groceries".
    pub category: CategoryName,
    /// The amount of money spent or earned, always positive.
    pub amount: f64,
    /// An optional text description of what the transaction was for.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        kind: TransactionKind,
        category: CategoryName,
        amount: f64,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            category,
            amount,
            description: None,
            date,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The builder is validated by [create_transaction] before anything is
/// written to the database.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The category the transaction belongs to.
    pub category: CategoryName,
    /// The amount of money, must be greater than zero.
    pub amount: f64,
    /// An optional description.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
}

impl TransactionBuilder {
    /// Validate raw caller input and turn it into a builder.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidKind] if `kind` is not "income" or "expense",
    /// - [Error::InvalidAmount] if `amount` is not greater than zero,
    /// - [Error::EmptyCategory] if `category` is empty,
    /// - or [Error::InvalidDate] if `date` is not a `YYYY-MM-DD` date.
    pub fn parse(
        kind: &str,
        category: &str,
        amount: f64,
        description: Option<&str>,
        date: &str,
    ) -> Result<Self, Error> {
        let kind = kind.parse()?;
        validate_amount(amount)?;
        let category = CategoryName::new(category)?;
        let date = parse_date(date)?;

        Ok(Transaction::build(kind, category, amount, date).description(description))
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(ToOwned::to_owned);
        self
    }
}

/// Check that `amount` can be stored as a transaction or budget amount.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `amount` is zero, negative or NaN.
pub(crate) fn validate_amount(amount: f64) -> Result<(), Error> {
    if amount > 0.0 && amount.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The number of rows changed by a statement.
pub type RowsAffected = usize;

/// Create a new transaction in the database from a builder.
///
/// The store assigns the ID. IDs are never reused, even after the transaction
/// holding it has been deleted.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not greater than zero,
/// - [Error::EmptyCategory] if the category is empty,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(builder.amount)?;
    builder.category.validate()?;

    let transaction = connection
        .prepare(
            "INSERT INTO transactions (kind, category, amount, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, kind, category, amount, description, date",
        )?
        .query_row(
            (
                builder.kind,
                builder.category.as_ref(),
                builder.amount,
                builder.description,
                builder.date,
            ),
            map_transaction_row,
        )?;

    tracing::debug!(
        "Created {} transaction {} for {}",
        transaction.kind,
        transaction.id,
        transaction.category
    );

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, kind, category, amount, description, date FROM transactions WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Delete a transaction by its `id`.
///
/// Deleting an ID that is not in the database is not an error, the returned
/// row count is zero in that case.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingTransactionId] if `id` is zero or negative,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    if id <= 0 {
        return Err(Error::MissingTransactionId);
    }

    let rows_affected =
        connection.execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])?;

    tracing::debug!("Deleted transaction {id}, {rows_affected} row(s) affected");

    Ok(rows_affected)
}

/// Create the transaction table and its indexes in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL CHECK(kind IN ('income', 'expense')),
            category TEXT NOT NULL CHECK(category <> ''),
            amount REAL NOT NULL CHECK(amount > 0),
            description TEXT,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_kind ON transactions(kind);
        CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
        CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let kind = row.get(1)?;
    let raw_category: String = row.get(2)?;
    let amount = row.get(3)?;
    let description = row.get(4)?;
    let date = row.get(5)?;

    Ok(Transaction {
        id,
        kind,
        category: CategoryName::new_unchecked(&raw_category),
        amount,
        description,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod builder_tests {
    use time::macros::date;

    use crate::{Error, category::CategoryName};

    use super::{TransactionBuilder, TransactionKind};

    #[test]
    fn parse_succeeds_on_valid_input() {
        let builder =
            TransactionBuilder::parse("expense", "Food", 12.5, Some("Lunch"), "2025-06-18");

        assert_eq!(
            builder,
            Ok(TransactionBuilder {
                kind: TransactionKind::Expense,
                category: CategoryName::new_unchecked("Food"),
                amount: 12.5,
                description: Some("Lunch".to_owned()),
                date: date!(2025 - 06 - 18),
            })
        );
    }

    #[test]
    fn parse_fails_on_invalid_kind() {
        let builder = TransactionBuilder::parse("transfer", "Food", 12.5, None, "2025-06-18");

        assert_eq!(builder, Err(Error::InvalidKind("transfer".to_owned())));
    }

    #[test]
    fn parse_fails_on_non_positive_amount() {
        for amount in [0.0, -1.0, f64::NAN] {
            let builder = TransactionBuilder::parse("income", "Salary", amount, None, "2025-06-18");

            assert!(
                matches!(builder, Err(Error::InvalidAmount(_))),
                "want amount {amount} to be rejected, got {builder:?}"
            );
        }
    }

    #[test]
    fn parse_fails_on_empty_category() {
        let builder = TransactionBuilder::parse("income", "", 1.0, None, "2025-06-18");

        assert_eq!(builder, Err(Error::EmptyCategory));
    }

    #[test]
    fn parse_fails_on_malformed_date() {
        let builder = TransactionBuilder::parse("income", "Salary", 1.0, None, "18-06-2025");

        assert_eq!(builder, Err(Error::InvalidDate("18-06-2025".to_owned())));
    }
}
