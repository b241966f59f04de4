//! Income/expense totals and per-category expense sums over a period.
//!
//! Both aggregations resolve their period with [PeriodQuery::resolve], so the
//! totals line up with the spending used by budget checks.

use std::collections::HashMap;

use rusqlite::{Connection, params_from_iter};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    category::CategoryName,
    period::{DateWindow, PeriodQuery},
    predicate::{Column, Operator, Predicate},
    transaction::TransactionKind,
};

/// The total income and expenses over a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Balance {
    /// The sum of all income amounts.
    pub income: f64,
    /// The sum of all expense amounts.
    pub expense: f64,
}

impl Balance {
    /// Income minus expenses.
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Calculate the income and expense totals for a period.
///
/// A period without transactions has a balance of zero for both totals.
///
/// # Errors
/// This function will return a:
/// - [Error::RangeRequired] if a custom period is missing a bound,
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_balance(
    query: &PeriodQuery,
    today: Date,
    connection: &Connection,
) -> Result<Balance, Error> {
    let window = query.resolve(today)?;

    get_balance_in_window(window, connection)
}

/// Calculate the income and expense totals for the transactions in `window`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_balance_in_window(
    window: DateWindow,
    connection: &Connection,
) -> Result<Balance, Error> {
    let (where_clause, params) = Predicate::new().and_window(window).to_sql(1);
    let query = format!("SELECT kind, SUM(amount) FROM transactions {where_clause} GROUP BY kind");

    let mut balance = Balance::default();

    let mut stmt = connection.prepare(&query)?;
    let mut rows = stmt.query(params_from_iter(params.iter()))?;

    while let Some(row) = rows.next()? {
        let kind: TransactionKind = row.get(0)?;
        let total: f64 = row.get(1)?;

        match kind {
            TransactionKind::Income => balance.income = total,
            TransactionKind::Expense => balance.expense = total,
        }
    }

    Ok(balance)
}

/// Expense totals grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// The summed expenses per category. Categories without expenses in the
    /// period are absent.
    pub totals: HashMap<CategoryName, f64>,
    /// The sum of all expenses in the period.
    pub total_expense: f64,
}

impl CategoryBreakdown {
    /// The value to divide by when turning a category total into a share of
    /// all expenses.
    ///
    /// This is the total expense, or 1.0 when there were no expenses so that
    /// the share is 0% rather than undefined.
    pub fn denominator(&self) -> f64 {
        if self.total_expense == 0.0 {
            1.0
        } else {
            self.total_expense
        }
    }

    /// `amount` as a percentage of the total expense.
    pub fn percentage_of_total(&self, amount: f64) -> f64 {
        amount / self.denominator() * 100.0
    }

    /// The categories ordered by total, largest first. Equal totals are
    /// ordered by category name.
    pub fn ranked(&self) -> Vec<(&CategoryName, f64)> {
        let mut ranked: Vec<_> = self
            .totals
            .iter()
            .map(|(category, total)| (category, *total))
            .collect();

        ranked.sort_by(|(name_a, total_a), (name_b, total_b)| {
            total_b.total_cmp(total_a).then_with(|| name_a.cmp(name_b))
        });

        ranked
    }

    /// Whether there were no expenses in the period.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Sum the expenses for a period per category.
///
/// # Errors
/// This function will return a:
/// - [Error::RangeRequired] if a custom period is missing a bound,
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_category_breakdown(
    query: &PeriodQuery,
    today: Date,
    connection: &Connection,
) -> Result<CategoryBreakdown, Error> {
    let window = query.resolve(today)?;

    get_category_breakdown_in_window(window, connection)
}

/// Sum the expenses in `window` per category.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_category_breakdown_in_window(
    window: DateWindow,
    connection: &Connection,
) -> Result<CategoryBreakdown, Error> {
    let (where_clause, params) = Predicate::new()
        .and(Column::Kind, Operator::Equal, TransactionKind::Expense)
        .and_window(window)
        .to_sql(1);
    let query =
        format!("SELECT category, SUM(amount) FROM transactions {where_clause} GROUP BY category");

    let totals = connection
        .prepare(&query)?
        .query_map(params_from_iter(params.iter()), |row| {
            let raw_category: String = row.get(0)?;
            let total: f64 = row.get(1)?;

            Ok((CategoryName::new_unchecked(&raw_category), total))
        })?
        .collect::<Result<HashMap<_, _>, rusqlite::Error>>()?;

    let total_expense = totals.values().sum();

    Ok(CategoryBreakdown {
        totals,
        total_expense,
    })
}


#[cfg(test)]
mod category_breakdown_tests {
    use std::collections::HashMap;

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::CategoryName,
        db::initialize,
        period::{Period, PeriodQuery},
        transaction::{Transaction, TransactionKind, create_transaction},
    };

    use super::{CategoryBreakdown, get_balance, get_category_breakdown};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert(
        kind: TransactionKind,
        category: &str,
        amount: f64,
        date: time::Date,
        conn: &Connection,
    ) {
        create_transaction(
            Transaction::build(kind, CategoryName::new_unchecked(category), amount, date),
            conn,
        )
        .expect("Could not create transaction");
    }

    #[test]
    fn groups_expenses_by_category() {
        let conn = get_test_connection();
        let today = date!(2025 - 06 - 18);
        insert(TransactionKind::Expense, "Food", 10.0, today, &conn);
        insert(TransactionKind::Expense, "Food", 5.0, today, &conn);
        insert(TransactionKind::Expense, "Rent", 500.0, today, &conn);
        insert(TransactionKind::Income, "Salary", 1000.0, today, &conn);

        let breakdown =
            get_category_breakdown(&PeriodQuery::new(Period::Month), today, &conn).unwrap();

        assert_eq!(
            breakdown.totals,
            HashMap::from([
                (CategoryName::new_unchecked("Food"), 15.0),
                (CategoryName::new_unchecked("Rent"), 500.0),
            ])
        );
        assert_eq!(breakdown.total_expense, 515.0);
    }

    #[test]
    fn totals_add_up_to_expense_balance() {
        let conn = get_test_connection();
        let today = date!(2025 - 06 - 18);
        insert(TransactionKind::Expense, "Food", 10.25, today, &conn);
        insert(TransactionKind::Expense, "Fun", 7.5, date!(2025 - 06 - 02), &conn);
        insert(
            TransactionKind::Expense,
            "Rent",
            500.0,
            date!(2025 - 05 - 02),
            &conn,
        );
        let query = PeriodQuery::new(Period::Month);

        let breakdown = get_category_breakdown(&query, today, &conn).unwrap();
        let balance = get_balance(&query, today, &conn).unwrap();

        let sum: f64 = breakdown.totals.values().sum();
        assert_eq!(sum, balance.expense);
        assert!(
            !breakdown
                .totals
                .contains_key(&CategoryName::new_unchecked("Rent"))
        );
    }

    #[test]
    fn categories_with_only_income_are_absent() {
        let conn = get_test_connection();
        let today = date!(2025 - 06 - 18);
        insert(TransactionKind::Income, "Salary", 1000.0, today, &conn);

        let breakdown =
            get_category_breakdown(&PeriodQuery::new(Period::All), today, &conn).unwrap();

        assert!(breakdown.is_empty());
        assert_eq!(breakdown.total_expense, 0.0);
    }

    #[test]
    fn custom_breakdown_without_end_fails() {
        let conn = get_test_connection();
        let query = PeriodQuery {
            period: Period::Custom,
            start: Some(date!(2025 - 01 - 10)),
            end: None,
        };

        let result = get_category_breakdown(&query, date!(2025 - 06 - 18), &conn);

        assert_eq!(result, Err(Error::RangeRequired));
    }

    #[test]
    fn zero_total_uses_denominator_of_one() {
        let breakdown = CategoryBreakdown::default();

        assert_eq!(breakdown.denominator(), 1.0);
        assert_eq!(breakdown.percentage_of_total(0.0), 0.0);
    }

    #[test]
    fn percentage_is_share_of_total_expense() {
        let breakdown = CategoryBreakdown {
            totals: HashMap::from([
                (CategoryName::new_unchecked("Food"), 25.0),
                (CategoryName::new_unchecked("Rent"), 75.0),
            ]),
            total_expense: 100.0,
        };

        assert_eq!(breakdown.percentage_of_total(25.0), 25.0);
    }

    #[test]
    fn ranked_orders_by_total_descending() {
        let breakdown = CategoryBreakdown {
            totals: HashMap::from([
                (CategoryName::new_unchecked("Food"), 25.0),
                (CategoryName::new_unchecked("Rent"), 75.0),
                (CategoryName::new_unchecked("Fun"), 25.0),
            ]),
            total_expense: 125.0,
        };

        let ranked: Vec<_> = breakdown
            .ranked()
            .into_iter()
            .map(|(name, total)| (name.to_string(), total))
            .collect();

        assert_eq!(
            ranked,
            vec![
                ("Rent".to_owned(), 75.0),
                ("Food".to_owned(), 25.0),
                ("Fun".to_owned(), 25.0),
            ]
        );
    }
}
