//! Compares the spending in a category against its budget.

use rusqlite::{Connection, params_from_iter};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    category::CategoryName,
    period::{DateWindow, Period, resolve_window},
    predicate::{Column, Operator, Predicate},
    transaction::TransactionKind,
};

use super::core::{Budget, get_budget, list_budgets};

/// Spending above this percentage of a budget is approaching the limit.
pub const APPROACHING_THRESHOLD_PERCENT: f64 = 90.0;

/// Spending above this percentage of a budget has exceeded the limit.
pub const EXCEEDED_THRESHOLD_PERCENT: f64 = 100.0;

/// How much of a budget has been used, as a named band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdBand {
    /// At most [APPROACHING_THRESHOLD_PERCENT] of the budget has been spent.
    WithinBudget,
    /// More than [APPROACHING_THRESHOLD_PERCENT] and at most
    /// [EXCEEDED_THRESHOLD_PERCENT] of the budget has been spent.
    Approaching,
    /// More than the whole budget has been spent.
    Exceeded,
}

impl ThresholdBand {
    /// The band for `percent_used`, e.g. `95.0` for 95%.
    pub fn from_percent(percent_used: f64) -> Self {
        if percent_used > EXCEEDED_THRESHOLD_PERCENT {
            ThresholdBand::Exceeded
        } else if percent_used > APPROACHING_THRESHOLD_PERCENT {
            ThresholdBand::Approaching
        } else {
            ThresholdBand::WithinBudget
        }
    }
}

/// The spending in a category compared to its budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetUsage {
    /// The total expenses in the category over the period.
    pub spent: f64,
    /// The budget amount for the category.
    pub allotted: f64,
}

impl BudgetUsage {
    /// The share of the budget that has been spent as a percentage.
    pub fn percent_used(&self) -> f64 {
        self.spent / self.allotted * 100.0
    }

    /// The threshold band for the spending.
    pub fn band(&self) -> ThresholdBand {
        ThresholdBand::from_percent(self.percent_used())
    }

    /// How much can still be spent, negative once the budget is exceeded.
    pub fn remaining(&self) -> f64 {
        self.allotted - self.spent
    }
}

/// Compare the expenses in `category` over `period` to the category's budget.
///
/// Returns `None` when the category has no budget. This means there is no
/// limit to check against, not that the limit is zero.
///
/// # Errors
/// This function will return a:
/// - [Error::RangeRequired] if `period` is [Period::Custom], since there are
///   no bounds to check a custom period against,
/// - or [Error::SqlError] if there is an SQL error.
pub fn check_budget(
    category: &CategoryName,
    period: Period,
    today: Date,
    connection: &Connection,
) -> Result<Option<BudgetUsage>, Error> {
    let Some(budget) = get_budget(category, connection)? else {
        return Ok(None);
    };

    let window = resolve_window(period, None, None, today)?;
    let spent = get_spent_in_window(category, window, connection)?;

    Ok(Some(BudgetUsage {
        spent,
        allotted: budget.amount,
    }))
}

/// A budget together with the spending over the budget's own period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// The budget.
    pub budget: Budget,
    /// The spending compared to the budget.
    pub usage: BudgetUsage,
}

/// Evaluate every budget over its own period, e.g. the current month for a
/// monthly budget.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn budget_summary(today: Date, connection: &Connection) -> Result<Vec<BudgetStatus>, Error> {
    list_budgets(connection)?
        .into_iter()
        .map(|budget| {
            let window = resolve_window(budget.period.as_period(), None, None, today)?;
            let spent = get_spent_in_window(&budget.category, window, connection)?;
            let usage = BudgetUsage {
                spent,
                allotted: budget.amount,
            };

            Ok(BudgetStatus { budget, usage })
        })
        .collect()
}

/// Sum the expenses in `category` over `window`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_spent_in_window(
    category: &CategoryName,
    window: DateWindow,
    connection: &Connection,
) -> Result<f64, Error> {
    let (where_clause, params) = Predicate::new()
        .and(Column::Kind, Operator::Equal, TransactionKind::Expense)
        .and(Column::Category, Operator::Equal, category.clone())
        .and_window(window)
        .to_sql(1);
    let query = format!("SELECT COALESCE(SUM(amount), 0.0) FROM transactions {where_clause}");

    connection
        .query_row(&query, params_from_iter(params.iter()), |row| row.get(0))
        .map_err(|error| error.into())
}
