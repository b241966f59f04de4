//! Defines the budget model and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::CategoryName,
    database_id::BudgetId,
    period::{Period, parse_date},
    transaction::validate_amount,
};

/// How often a budget's amount is available to spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// The amount is available each calendar month.
    Monthly,
    /// The amount is available each week.
    Weekly,
    /// The amount is available each calendar year.
    Yearly,
}

impl BudgetPeriod {
    /// The period as it is stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    /// The aggregation period that covers one budget period.
    pub fn as_period(self) -> Period {
        match self {
            BudgetPeriod::Monthly => Period::Month,
            BudgetPeriod::Weekly => Period::Week,
            BudgetPeriod::Yearly => Period::Year,
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "weekly" => Ok(BudgetPeriod::Weekly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(Error::InvalidBudgetPeriod(other.to_owned())),
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A spending ceiling for one category.
///
/// There is at most one budget per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The category the budget limits spending for.
    pub category: CategoryName,
    /// The most that should be spent in one period.
    pub amount: f64,
    /// How often `amount` is available to spend.
    pub period: BudgetPeriod,
    /// The first day the budget applies to.
    pub start_date: Option<Date>,
    /// The last day the budget applies to.
    pub end_date: Option<Date>,
}

/// The data for creating a [Budget].
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The category to limit spending for.
    pub category: CategoryName,
    /// The spending ceiling, must be greater than zero.
    pub amount: f64,
    /// How often `amount` is available to spend.
    pub period: BudgetPeriod,
    /// The first day the budget applies to.
    pub start_date: Option<Date>,
    /// The last day the budget applies to. Requires `start_date`.
    pub end_date: Option<Date>,
}

impl NewBudget {
    /// A budget without start or end dates.
    pub fn new(category: CategoryName, amount: f64, period: BudgetPeriod) -> Self {
        Self {
            category,
            amount,
            period,
            start_date: None,
            end_date: None,
        }
    }

    /// Set the dates the budget applies to.
    pub fn dates(mut self, start_date: Option<Date>, end_date: Option<Date>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Validate raw caller input and turn it into a [NewBudget].
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyCategory] if `category` is empty,
    /// - [Error::InvalidBudgetPeriod] if `period` is not "monthly", "weekly" or "yearly",
    /// - [Error::InvalidDate] if either date is not a `YYYY-MM-DD` date,
    /// - or any error from [NewBudget::validate].
    pub fn parse(
        category: &str,
        amount: f64,
        period: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, Error> {
        let category = CategoryName::new(category)?;
        let period = period.parse()?;
        let start_date = start_date.map(parse_date).transpose()?;
        let end_date = end_date.map(parse_date).transpose()?;

        let new_budget = NewBudget::new(category, amount, period).dates(start_date, end_date);
        new_budget.validate()?;

        Ok(new_budget)
    }

    /// Check the amount and dates.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the amount is not greater than zero,
    /// - [Error::EmptyCategory] if the category is empty,
    /// - [Error::BudgetEndWithoutStart] if there is an end date but no start date,
    /// - or [Error::BudgetEndBeforeStart] if the end date is before the start date.
    pub fn validate(&self) -> Result<(), Error> {
        validate_amount(self.amount)?;
        self.category.validate()?;

        match (self.start_date, self.end_date) {
            (None, Some(_)) => Err(Error::BudgetEndWithoutStart),
            (Some(start), Some(end)) if end < start => {
                Err(Error::BudgetEndBeforeStart { start, end })
            }
            _ => Ok(()),
        }
    }
}

/// Add a budget for a category that does not have one yet.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateBudget] if the category already has a budget,
/// - any validation error from [NewBudget::validate],
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    new_budget.validate()?;

    if get_budget(&new_budget.category, connection)?.is_some() {
        return Err(Error::DuplicateBudget(new_budget.category.to_string()));
    }

    let budget = connection
        .prepare(
            "INSERT OR REPLACE INTO budgets (category, amount, period, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, category, amount, period, start_date, end_date",
        )?
        .query_row(
            (
                new_budget.category.as_ref(),
                new_budget.amount,
                new_budget.period,
                new_budget.start_date,
                new_budget.end_date,
            ),
            map_budget_row,
        )?;

    tracing::debug!(
        "Added {} budget of {} for {}",
        budget.period,
        budget.amount,
        budget.category
    );

    Ok(budget)
}

/// Retrieve the budget for `category`, if there is one.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_budget(
    category: &CategoryName,
    connection: &Connection,
) -> Result<Option<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, category, amount, period, start_date, end_date
             FROM budgets WHERE category = :category",
        )?
        .query_row(&[(":category", category.as_ref())], map_budget_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve all budgets ordered by category.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_budgets(connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, category, amount, period, start_date, end_date
             FROM budgets ORDER BY category ASC",
        )?
        .query_map([], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Remove the budget for `category`.
///
/// Removing a budget that does not exist is not an error.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn remove_budget(category: &CategoryName, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budgets WHERE category = ?1",
        [category.as_ref()],
    )?;

    tracing::debug!("Removed budget for {category}, {rows_affected} row(s) affected");

    Ok(())
}

/// Initialize the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL UNIQUE CHECK(category <> ''),
            amount REAL NOT NULL CHECK(amount > 0),
            period TEXT NOT NULL CHECK(period IN ('monthly', 'weekly', 'yearly')),
            start_date TEXT,
            end_date TEXT
        )",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_category: String = row.get(1)?;
    let amount = row.get(2)?;
    let period = row.get(3)?;
    let start_date = row.get(4)?;
    let end_date = row.get(5)?;

    Ok(Budget {
        id,
        category: CategoryName::new_unchecked(&raw_category),
        amount,
        period,
        start_date,
        end_date,
    })
}

#[cfg(test)]
mod new_budget_tests {
    use time::macros::date;

    use crate::{Error, category::CategoryName};

    use super::{BudgetPeriod, NewBudget};

    #[test]
    fn parse_succeeds_on_valid_input() {
        let new_budget = NewBudget::parse(
            "Food",
            300.0,
            "monthly",
            Some("2025-01-01"),
            Some("2025-12-31"),
        );

        assert_eq!(
            new_budget,
            Ok(NewBudget {
                category: CategoryName::new_unchecked("Food"),
                amount: 300.0,
                period: BudgetPeriod::Monthly,
                start_date: Some(date!(2025 - 01 - 01)),
                end_date: Some(date!(2025 - 12 - 31)),
            })
        );
    }

    #[test]
    fn parse_fails_on_invalid_period() {
        let new_budget = NewBudget::parse("Food", 300.0, "daily", None, None);

        assert_eq!(
            new_budget,
            Err(Error::InvalidBudgetPeriod("daily".to_owned()))
        );
    }

    #[test]
    fn parse_fails_on_empty_category() {
        let new_budget = NewBudget::parse("", 300.0, "weekly", None, None);

        assert_eq!(new_budget, Err(Error::EmptyCategory));
    }

    #[test]
    fn parse_fails_on_malformed_date() {
        let new_budget = NewBudget::parse("Food", 300.0, "weekly", Some("01/01/2025"), None);

        assert_eq!(new_budget, Err(Error::InvalidDate("01/01/2025".to_owned())));
    }

    #[test]
    fn validate_fails_on_non_positive_amount() {
        let new_budget = NewBudget::new(
            CategoryName::new_unchecked("Food"),
            0.0,
            BudgetPeriod::Yearly,
        );

        assert_eq!(new_budget.validate(), Err(Error::InvalidAmount(0.0)));
    }

    #[test]
    fn validate_fails_on_empty_category() {
        let new_budget = NewBudget::new(
            CategoryName::new_unchecked(""),
            10.0,
            BudgetPeriod::Monthly,
        );

        assert_eq!(new_budget.validate(), Err(Error::EmptyCategory));
    }

    #[test]
    fn validate_fails_on_end_without_start() {
        let new_budget = NewBudget::new(
            CategoryName::new_unchecked("Food"),
            10.0,
            BudgetPeriod::Yearly,
        )
        .dates(None, Some(date!(2025 - 12 - 31)));

        assert_eq!(new_budget.validate(), Err(Error::BudgetEndWithoutStart));
    }

    #[test]
    fn validate_fails_on_end_before_start() {
        let start = date!(2025 - 12 - 31);
        let end = date!(2025 - 01 - 01);
        let new_budget = NewBudget::new(
            CategoryName::new_unchecked("Food"),
            10.0,
            BudgetPeriod::Yearly,
        )
        .dates(Some(start), Some(end));

        assert_eq!(
            new_budget.validate(),
            Err(Error::BudgetEndBeforeStart { start, end })
        );
    }

    #[test]
    fn validate_accepts_same_start_and_end() {
        let day = date!(2025 - 06 - 18);
        let new_budget = NewBudget::new(
            CategoryName::new_unchecked("Food"),
            10.0,
            BudgetPeriod::Weekly,
        )
        .dates(Some(day), Some(day));

        assert_eq!(new_budget.validate(), Ok(()));
    }

    #[test]
    fn validate_accepts_start_without_end() {
        let new_budget = NewBudget::new(
            CategoryName::new_unchecked("Food"),
            10.0,
            BudgetPeriod::Weekly,
        )
        .dates(Some(date!(2025 - 06 - 18)), None);

        assert_eq!(new_budget.validate(), Ok(()));
    }
}
