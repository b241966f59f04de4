//! Defines the crate level error type and the conversion from SQLite errors.

use time::Date;

/// The errors that may occur in the ledger.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction kind other than "income" or "expense" was given.
    #[error("\"{0}\" is not a valid transaction kind, use 'income' or 'expense'")]
    InvalidKind(String),

    /// An amount that is zero, negative or not a number was given.
    ///
    /// Both transactions and budgets require strictly positive amounts.
    #[error("{0} is not a valid amount, amounts must be positive")]
    InvalidAmount(f64),

    /// An empty string was used as a category.
    #[error("category cannot be empty")]
    EmptyCategory,

    /// A date string could not be parsed as an ISO `YYYY-MM-DD` date.
    #[error("\"{0}\" is not a valid date, use YYYY-MM-DD")]
    InvalidDate(String),

    /// A budget period other than "monthly", "weekly" or "yearly" was given.
    #[error("\"{0}\" is not a valid budget period, use 'monthly', 'weekly' or 'yearly'")]
    InvalidBudgetPeriod(String),

    /// A budget was given an end date that is earlier than its start date.
    #[error("the budget end date {end} is before its start date {start}")]
    BudgetEndBeforeStart {
        /// The first day the budget applies to.
        start: Date,
        /// The last day the budget applies to.
        end: Date,
    },

    /// A budget was given an end date without a start date.
    #[error("a budget with an end date must also have a start date")]
    BudgetEndWithoutStart,

    /// An update or delete was requested without a transaction ID, or with
    /// the ID zero, which is never assigned by the store.
    #[error("a transaction ID is required")]
    MissingTransactionId,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// An update request did not set any fields.
    #[error("nothing to update")]
    NothingToUpdate,

    /// A budget already exists for the category.
    ///
    /// Budgets must be removed before a new one can be added for the same
    /// category.
    #[error("a budget for the category \"{0}\" already exists")]
    DuplicateBudget(String),

    /// A custom period was requested without both a start and an end date.
    #[error("start and end dates are required for a custom period")]
    RangeRequired,

    /// A write was rejected by a constraint in the database schema.
    #[error("a database constraint was violated: {0}")]
    ConstraintViolation(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl Error {
    /// Whether the error was caused by caller supplied data that breaks a
    /// domain rule.
    ///
    /// Validation errors are always detected before the store is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidKind(_)
                | Error::InvalidAmount(_)
                | Error::EmptyCategory
                | Error::InvalidDate(_)
                | Error::InvalidBudgetPeriod(_)
                | Error::BudgetEndBeforeStart { .. }
                | Error::BudgetEndWithoutStart
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_CHECK,
                },
                description,
            ) => Error::ConstraintViolation(
                description.unwrap_or_else(|| "CHECK constraint failed".to_owned()),
            ),
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
