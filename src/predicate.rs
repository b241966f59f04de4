//! A structured builder for SQL predicates and column assignments.
//!
//! Callers describe *what* to filter or update as a list of column, operator
//! and value triples. Only the fixed column and operator names ever make it
//! into the SQL text, every caller supplied value is passed as a numbered
//! query parameter.

use rusqlite::types::Value;
use time::Date;

use crate::period::DateWindow;

/// The columns of the ledger tables that may appear in a predicate or an
/// assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// The row ID.
    Id,
    /// The transaction kind, "income" or "expense".
    Kind,
    /// The category of a transaction or budget.
    Category,
    /// The amount of a transaction or budget.
    Amount,
    /// The free text description of a transaction.
    Description,
    /// The date of a transaction.
    Date,
}

impl Column {
    /// The column name as it appears in the schema.
    pub fn as_sql(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Kind => "kind",
            Column::Category => "category",
            Column::Amount => "amount",
            Column::Description => "description",
            Column::Date => "date",
        }
    }
}

/// A comparison between a column and a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `column = value`
    Equal,
    /// `column >= value`
    GreaterOrEqual,
    /// `column <= value`
    LessOrEqual,
}

impl Operator {
    fn as_sql(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
        }
    }
}

/// A single `column operator value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The column on the left-hand side.
    pub column: Column,
    /// How the column is compared to the value.
    pub operator: Operator,
    /// The value on the right-hand side, always bound as a parameter.
    pub value: Value,
}

/// A conjunction of conditions, i.e. every condition must hold for a row to
/// match. An empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Create a predicate that matches every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition that must hold.
    pub fn and(mut self, column: Column, operator: Operator, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            column,
            operator,
            value: value.into(),
        });
        self
    }

    /// Add a condition only if `value` is present.
    pub fn and_if<T: Into<Value>>(
        self,
        column: Column,
        operator: Operator,
        value: Option<T>,
    ) -> Self {
        match value {
            Some(value) => self.and(column, operator, value),
            None => self,
        }
    }

    /// Restrict the date column to `window`, bounds inclusive.
    pub fn and_window(self, window: DateWindow) -> Self {
        match window {
            DateWindow::All => self,
            DateWindow::Range { start, end } => self
                .and(Column::Date, Operator::GreaterOrEqual, date_value(start))
                .and(Column::Date, Operator::LessOrEqual, date_value(end)),
        }
    }

    /// The conditions in the order they were added.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Whether the predicate matches every row.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render the predicate as a `WHERE` clause.
    ///
    /// Parameters are numbered from `first_index`, so the clause can follow
    /// other parameterized SQL. Returns an empty string and no parameters for
    /// an empty predicate.
    pub fn to_sql(&self, first_index: usize) -> (String, Vec<Value>) {
        if self.conditions.is_empty() {
            return (String::new(), Vec::new());
        }

        let clause = self
            .conditions
            .iter()
            .enumerate()
            .map(|(i, condition)| {
                format!(
                    "{} {} ?{}",
                    condition.column.as_sql(),
                    condition.operator.as_sql(),
                    first_index + i
                )
            })
            .collect::<Vec<_>>()
            .join(" AND ");
        let params = self
            .conditions
            .iter()
            .map(|condition| condition.value.clone())
            .collect();

        (format!("WHERE {clause}"), params)
    }
}

/// The list of `column = value` pairs for an `UPDATE` statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments {
    assignments: Vec<(Column, Value)>,
}

impl Assignments {
    /// Create an empty list of assignments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`.
    pub fn set(mut self, column: Column, value: impl Into<Value>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Set `column` only if `value` is present.
    pub fn set_if<T: Into<Value>>(self, column: Column, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(column, value),
            None => self,
        }
    }

    /// Whether no column will be changed.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Render the assignments as a `SET` clause with parameters numbered from
    /// `first_index`.
    pub fn to_sql(&self, first_index: usize) -> (String, Vec<Value>) {
        let clause = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column.as_sql(), first_index + i))
            .collect::<Vec<_>>()
            .join(", ");
        let params = self
            .assignments
            .iter()
            .map(|(_, value)| value.clone())
            .collect();

        (format!("SET {clause}"), params)
    }
}

/// Convert a date into the text form it is stored as.
pub fn date_value(date: Date) -> Value {
    Value::Text(date.to_string())
}
