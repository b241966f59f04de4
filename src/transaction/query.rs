//! Filtered listing of transactions.

use rusqlite::{Connection, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error,
    category::CategoryName,
    predicate::{Column, Operator, Predicate, date_value},
};

use super::core::{Transaction, TransactionKind, map_transaction_row};

/// The optional filters for listing transactions.
///
/// A field that is `None` places no constraint on the results. The fields
/// that are set are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Only include transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Only include transactions in this category.
    pub category: Option<CategoryName>,
    /// Only include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only include transactions on or before this date.
    pub end_date: Option<Date>,
    /// Return at most this many transactions. Zero means no limit.
    pub limit: Option<u32>,
}

impl TransactionQuery {
    /// The predicate selecting the transactions that match the filters.
    pub fn predicate(&self) -> Predicate {
        Predicate::new()
            .and_if(Column::Kind, Operator::Equal, self.kind)
            .and_if(Column::Category, Operator::Equal, self.category.clone())
            .and_if(
                Column::Date,
                Operator::GreaterOrEqual,
                self.start_date.map(date_value),
            )
            .and_if(
                Column::Date,
                Operator::LessOrEqual,
                self.end_date.map(date_value),
            )
    }
}

/// Query for transactions in the database, most recent first.
///
/// Transactions on the same date are returned in no particular order.
///
/// # Errors
/// This function will return a [Error::SqlError] there is a SQL error.
pub fn list_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query_string_parts =
        vec!["SELECT id, kind, category, amount, description, date FROM transactions".to_owned()];

    let (where_clause, mut query_parameters) = query.predicate().to_sql(1);

    if !where_clause.is_empty() {
        query_string_parts.push(where_clause);
    }

    query_string_parts.push("ORDER BY date DESC".to_owned());

    if let Some(limit) = query.limit.filter(|&limit| limit > 0) {
        query_string_parts.push(format!("LIMIT ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Integer(limit.into()));
    }

    let query_string = query_string_parts.join(" ");

    connection
        .prepare(&query_string)?
        .query_map(params_from_iter(query_parameters.iter()), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Duration, macros::date};

    use crate::{
        category::CategoryName,
        db::initialize,
        transaction::{Transaction, TransactionKind, create_transaction},
    };

    use super::{TransactionQuery, list_transactions};

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
    ) -> Transaction {
        create_transaction(
            Transaction::build(kind, CategoryName::new_unchecked(category), amount, date),
            conn,
        )
        .expect("Could not create transaction")
    }

    #[test]
    fn no_filters_returns_all_most_recent_first() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        for offset in [3, 0, 5, 1] {
            insert(
                TransactionKind::Expense,
                "Food",
                1.0,
                today - Duration::days(offset),
                &conn,
            );
        }

        let got = list_transactions(&TransactionQuery::default(), &conn).unwrap();

        let dates: Vec<_> = got.iter().map(|transaction| transaction.date).collect();
        assert_eq!(
            dates,
            vec![
                today,
                today - Duration::days(1),
                today - Duration::days(3),
                today - Duration::days(5)
            ]
        );
    }

    #[test]
    fn empty_table_returns_empty_list() {
        let conn = get_test_connection();

        let got = list_transactions(&TransactionQuery::default(), &conn).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn filters_by_kind_and_category() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        insert(TransactionKind::Expense, "Food", 10.0, today, &conn);
        insert(TransactionKind::Expense, "Rent", 500.0, today, &conn);
        let want = insert(TransactionKind::Income, "Food", 2.0, today, &conn);

        let got = list_transactions(
            &TransactionQuery {
                kind: Some(TransactionKind::Income),
                category: Some(CategoryName::new_unchecked("Food")),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn category_filter_is_case_sensitive() {
        let conn = get_test_connection();
        insert(
            TransactionKind::Expense,
            "Food",
            10.0,
            date!(2025 - 10 - 05),
            &conn,
        );

        let got = list_transactions(
            &TransactionQuery {
                category: Some(CategoryName::new_unchecked("food")),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let conn = get_test_connection();
        let start = date!(2025 - 01 - 10);
        let end = date!(2025 - 01 - 20);
        insert(
            TransactionKind::Expense,
            "Food",
            1.0,
            start - Duration::days(1),
            &conn,
        );
        insert(TransactionKind::Expense, "Food", 2.0, start, &conn);
        insert(TransactionKind::Expense, "Food", 3.0, end, &conn);
        insert(
            TransactionKind::Expense,
            "Food",
            4.0,
            end + Duration::days(1),
            &conn,
        );

        let got = list_transactions(
            &TransactionQuery {
                start_date: Some(start),
                end_date: Some(end),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let amounts: Vec<_> = got.iter().map(|transaction| transaction.amount).collect();
        assert_eq!(amounts, vec![3.0, 2.0]);
    }

    #[test]
    fn limit_caps_number_of_rows() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        for i in 0..10 {
            insert(
                TransactionKind::Expense,
                "Food",
                1.0,
                today - Duration::days(i),
                &conn,
            );
        }

        let got = list_transactions(
            &TransactionQuery {
                limit: Some(3),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 3);
        assert_eq!(got[0].date, today);
    }

    #[test]
    fn zero_limit_means_no_limit() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        for _ in 0..5 {
            insert(TransactionKind::Income, "Salary", 1.0, today, &conn);
        }

        let got = list_transactions(
            &TransactionQuery {
                limit: Some(0),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 5);
    }

    #[test]
    fn limit_follows_filter_parameters() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        for _ in 0..4 {
            insert(TransactionKind::Income, "Salary", 1.0, today, &conn);
            insert(TransactionKind::Expense, "Food", 1.0, today, &conn);
        }

        let got = list_transactions(
            &TransactionQuery {
                kind: Some(TransactionKind::Expense),
                start_date: Some(today),
                limit: Some(2),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 2);
        assert!(
            got.iter()
                .all(|transaction| transaction.kind == TransactionKind::Expense)
        );
    }
}
