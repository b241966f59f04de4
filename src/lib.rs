//! A personal finance ledger backed by SQLite.
//!
//! The ledger records income and expense transactions, aggregates them over
//! calendar periods, and compares spending per category against budgets.
//!
//! Every operation takes the [rusqlite::Connection] to work on, so the caller
//! decides how the database is opened and shared:
//!
//! ```
//! use finance_rs::{
//!     CategoryName, Transaction, TransactionKind, create_transaction, initialize_db,
//! };
//! use rusqlite::Connection;
//! use time::macros::date;
//!
//! let connection = Connection::open_in_memory().unwrap();
//! initialize_db(&connection).unwrap();
//!
//! let transaction = create_transaction(
//!     Transaction::build(
//!         TransactionKind::Expense,
//!         CategoryName::new("Food").unwrap(),
//!         12.5,
//!         date!(2025 - 06 - 18),
//!     ),
//!     &connection,
//! )
//! .unwrap();
//!
//! assert_eq!(transaction.id, 1);
//! ```

#![warn(missing_docs)]

mod aggregation;
mod budget;
mod category;
mod database_id;
mod db;
mod error;
mod period;
mod predicate;
mod timezone;
mod transaction;

pub mod report;

pub use aggregation::{
    Balance, CategoryBreakdown, get_balance, get_balance_in_window, get_category_breakdown,
    get_category_breakdown_in_window,
};
pub use budget::{
    APPROACHING_THRESHOLD_PERCENT, Budget, BudgetPeriod, BudgetStatus, BudgetUsage,
    EXCEEDED_THRESHOLD_PERCENT, NewBudget, ThresholdBand, add_budget, budget_summary,
    check_budget, get_budget, get_spent_in_window, list_budgets, remove_budget,
};
pub use category::CategoryName;
pub use database_id::{BudgetId, DatabaseId, TransactionId};
pub use db::{initialize as initialize_db, open as open_db, reset as reset_db};
pub use error::Error;
pub use period::{DateWindow, Period, PeriodQuery, parse_date, resolve_window};
pub use predicate::{Assignments, Column, Condition, Operator, Predicate};
pub use timezone::{get_local_offset, today_in_timezone};
pub use transaction::{
    RowsAffected, Transaction, TransactionBuilder, TransactionKind, TransactionQuery,
    TransactionUpdate, count_transactions, create_transaction, delete_transaction,
    get_transaction, list_transactions, update_transaction,
};
