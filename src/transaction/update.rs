//! Partial updates of stored transactions.

use rusqlite::{Connection, params_from_iter};
use time::Date;

use crate::{
    Error,
    category::CategoryName,
    database_id::TransactionId,
    predicate::{Assignments, Column, Operator, Predicate, date_value},
};

use super::core::{TransactionKind, validate_amount};

/// The fields to change on a transaction.
///
/// Only the fields that are `Some` are written, every other field keeps its
/// stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// The new kind.
    pub kind: Option<TransactionKind>,
    /// The new category.
    pub category: Option<CategoryName>,
    /// The new amount, must be greater than zero.
    pub amount: Option<f64>,
    /// The new description.
    pub description: Option<String>,
    /// The new date.
    pub date: Option<Date>,
}

impl TransactionUpdate {
    /// Whether the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    fn assignments(&self) -> Assignments {
        Assignments::new()
            .set_if(Column::Kind, self.kind)
            .set_if(Column::Category, self.category.clone())
            .set_if(Column::Amount, self.amount)
            .set_if(Column::Description, self.description.clone())
            .set_if(Column::Date, self.date.map(date_value))
    }
}

/// Apply `update` to the transaction with the given `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingTransactionId] if `id` is zero or negative,
/// - [Error::NothingToUpdate] if `update` does not set any field,
/// - [Error::InvalidAmount] if the new amount is not greater than zero,
/// - [Error::EmptyCategory] if the new category is empty,
/// - [Error::UpdateMissingTransaction] if no transaction has the ID `id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: &TransactionUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    if id <= 0 {
        return Err(Error::MissingTransactionId);
    }

    let assignments = update.assignments();

    if assignments.is_empty() {
        return Err(Error::NothingToUpdate);
    }

    if let Some(amount) = update.amount {
        validate_amount(amount)?;
    }

    if let Some(category) = &update.category {
        category.validate()?;
    }

    let (set_clause, mut query_parameters) = assignments.to_sql(1);
    let (where_clause, id_parameters) = Predicate::new()
        .and(Column::Id, Operator::Equal, id)
        .to_sql(query_parameters.len() + 1);
    query_parameters.extend(id_parameters);

    let query_string = format!("UPDATE transactions {set_clause} {where_clause}");
    let rows_affected =
        connection.execute(&query_string, params_from_iter(query_parameters.iter()))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    tracing::debug!("Updated transaction {id}");

    Ok(())
}
