//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, listing, updating and deleting transactions

mod core;
mod query;
mod update;

pub use core::{
    RowsAffected, Transaction, TransactionBuilder, TransactionKind, count_transactions,
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    map_transaction_row,
};
pub(crate) use core::validate_amount;
pub use query::{TransactionQuery, list_transactions};
pub use update::{TransactionUpdate, update_transaction};
