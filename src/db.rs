//! Opening, initializing and resetting the ledger's SQLite database.

use std::path::Path;

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, budget::create_budget_table, transaction::create_transaction_table};

/// The tables that hold user data, in the order they are cleared.
const DATA_TABLES: [&str; 2] = ["transactions", "budgets"];

/// Open the database file at `path`, creating it if needed, and make sure the
/// schema exists.
///
/// # Errors
/// Returns an [Error::SqlError] if the file cannot be opened or the schema
/// cannot be created.
pub fn open(path: &Path) -> Result<Connection, Error> {
    let connection = Connection::open(path)?;
    initialize(&connection)?;

    Ok(connection)
}

/// Create the tables for transactions and budgets if they do not exist.
///
/// The tables are created in a single exclusive transaction, so either the
/// whole schema exists afterwards or none of it was written.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;
    tracing::info!("Initialized the database schema");

    Ok(())
}

/// Delete every transaction and budget and restart ID assignment from 1.
///
/// All of the changes are made in one transaction: if any step fails the
/// database is left as it was.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn reset(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    for table in DATA_TABLES {
        transaction.execute(&format!("DELETE FROM {table}"), ())?;
        transaction.execute("DELETE FROM sqlite_sequence WHERE name = ?1", [table])?;
    }

    transaction.commit()?;
    tracing::debug!("Deleted all transactions and budgets");

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        budget::{BudgetPeriod, NewBudget, add_budget, list_budgets},
        category::CategoryName,
        transaction::{Transaction, TransactionKind, count_transactions, create_transaction},
    };

    use super::{initialize, reset};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_test_data(conn: &Connection) {
        for amount in [1.0, 2.0, 3.0] {
            create_transaction(
                Transaction::build(
                    TransactionKind::Expense,
                    CategoryName::new_unchecked("Food"),
                    amount,
                    date!(2025 - 06 - 18),
                ),
                conn,
            )
            .unwrap();
        }

        add_budget(
            NewBudget::new(
                CategoryName::new_unchecked("Food"),
                100.0,
                BudgetPeriod::Monthly,
            ),
            conn,
        )
        .unwrap();
    }

    #[test]
    fn initialize_is_idempotent() {
        let conn = get_test_connection();

        assert_eq!(initialize(&conn), Ok(()));
    }

    #[test]
    fn reset_clears_data_and_restarts_ids() {
        let conn = get_test_connection();
        insert_test_data(&conn);

        reset(&conn).unwrap();

        assert_eq!(count_transactions(&conn), Ok(0));
        assert_eq!(list_budgets(&conn), Ok(vec![]));
        let transaction = create_transaction(
            Transaction::build(
                TransactionKind::Income,
                CategoryName::new_unchecked("Salary"),
                10.0,
                date!(2025 - 06 - 18),
            ),
            &conn,
        )
        .unwrap();
        assert_eq!(transaction.id, 1);
    }

    #[test]
    fn reset_on_empty_database_succeeds() {
        let conn = get_test_connection();

        assert_eq!(reset(&conn), Ok(()));
    }

    #[test]
    fn failed_reset_keeps_data() {
        let conn = get_test_connection();
        insert_test_data(&conn);
        conn.execute("DROP TABLE budgets", ()).unwrap();

        let result = reset(&conn);

        assert!(result.is_err());
        assert_eq!(count_transactions(&conn), Ok(3));
    }
}
