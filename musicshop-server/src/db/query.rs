//! Parameterized statement builder
//!
//! Table names, column names and SQL expressions are `&'static str`, so
//! they can only come from source code. Everything a caller supplies is a
//! [`Value`] and is bound as a positional parameter (`$1`, `$2`, ...).

use std::fmt::Write as _;

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// Builder misuse, caught before anything reaches the database
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("no columns given for {0}")]
    NoColumns(&'static str),

    #[error("no rows given for insert into {0}")]
    NoRows(&'static str),

    #[error("row {row} has {got} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("refusing to delete from {0} without a filter")]
    UnfilteredDelete(&'static str),
}

/// SQL text plus the values bound to its placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    /// A fixed statement with no parameters (DDL, health probes).
    pub fn raw(sql: &'static str) -> Self {
        Self {
            sql: sql.to_owned(),
            params: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Turn into an sqlx query with every parameter bound.
    pub fn to_query(&self) -> Query<'_, Postgres, PgArguments> {
        self.params
            .iter()
            .fold(sqlx::query(&self.sql), |q, value| match value {
                Value::Int(v) => q.bind(*v),
                Value::Float(v) => q.bind(*v),
                Value::Text(v) => q.bind(v.as_str()),
            })
    }
}

/// Accumulates SQL text and numbers placeholders as values are pushed.
#[derive(Default)]
struct SqlWriter {
    sql: String,
    params: Vec<Value>,
}

impl SqlWriter {
    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn bind(&mut self, value: Value) {
        self.params.push(value);
        // Writing to a String cannot fail
        let _ = write!(self.sql, "${}", self.params.len());
    }

    fn push_filters(&mut self, filters: Vec<Filter>) {
        for (i, filter) in filters.into_iter().enumerate() {
            self.push(if i == 0 { " WHERE " } else { " AND " });
            match filter {
                Filter::Eq(column, value) => {
                    self.push(column);
                    self.push(" = ");
                    self.bind(value);
                }
            }
        }
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// WHERE condition; multiple filters are joined with AND
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
}

pub fn eq(column: &'static str, value: impl Into<Value>) -> Filter {
    Filter::Eq(column, value.into())
}

/// INSERT with one or more value rows
#[derive(Debug, Clone)]
pub struct Insert {
    table: &'static str,
    columns: Vec<&'static str>,
    rows: Vec<Vec<Value>>,
    suffix: Vec<&'static str>,
}

impl Insert {
    pub fn into_table(table: &'static str) -> Self {
        Self {
            table,
            columns: Vec::new(),
            rows: Vec::new(),
            suffix: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: &[&'static str]) -> Self {
        self.columns.extend_from_slice(columns);
        self
    }

    /// Add one row of values, in column order.
    pub fn values<I>(mut self, row: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Trailing clause such as `ON CONFLICT DO NOTHING` or `RETURNING id`.
    pub fn suffix(mut self, clause: &'static str) -> Self {
        self.suffix.push(clause);
        self
    }

    pub fn build(self) -> Result<Statement, QueryError> {
        if self.columns.is_empty() {
            return Err(QueryError::NoColumns(self.table));
        }
        if self.rows.is_empty() {
            return Err(QueryError::NoRows(self.table));
        }
        let width = self.columns.len();
        if let Some((row, values)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != width)
        {
            return Err(QueryError::RowWidth {
                row,
                expected: width,
                got: values.len(),
            });
        }

        let mut w = SqlWriter::default();
        w.push("INSERT INTO ");
        w.push(self.table);
        w.push(" (");
        w.push(&self.columns.join(", "));
        w.push(") VALUES ");
        for (i, row) in self.rows.into_iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push("(");
            for (j, value) in row.into_iter().enumerate() {
                if j > 0 {
                    w.push(", ");
                }
                w.bind(value);
            }
            w.push(")");
        }
        for clause in self.suffix {
            w.push(" ");
            w.push(clause);
        }
        Ok(w.finish())
    }
}

/// SELECT with optional joins, filters, grouping and ordering
#[derive(Debug, Clone)]
pub struct Select {
    columns: Vec<&'static str>,
    from: &'static str,
    joins: Vec<(&'static str, &'static str)>,
    filters: Vec<Filter>,
    group_by: Vec<&'static str>,
    order_by: Vec<&'static str>,
}

impl Select {
    pub fn columns(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            from: "",
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn from(mut self, table: &'static str) -> Self {
        self.from = table;
        self
    }

    pub fn left_join(mut self, table: &'static str, on: &'static str) -> Self {
        self.joins.push((table, on));
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn group_by(mut self, columns: &[&'static str]) -> Self {
        self.group_by.extend_from_slice(columns);
        self
    }

    pub fn order_by(mut self, columns: &[&'static str]) -> Self {
        self.order_by.extend_from_slice(columns);
        self
    }

    pub fn build(self) -> Result<Statement, QueryError> {
        if self.columns.is_empty() {
            return Err(QueryError::NoColumns(self.from));
        }

        let mut w = SqlWriter::default();
        w.push("SELECT ");
        w.push(&self.columns.join(", "));
        w.push(" FROM ");
        w.push(self.from);
        for (table, on) in self.joins {
            w.push(" LEFT JOIN ");
            w.push(table);
            w.push(" ON ");
            w.push(on);
        }
        w.push_filters(self.filters);
        if !self.group_by.is_empty() {
            w.push(" GROUP BY ");
            w.push(&self.group_by.join(", "));
        }
        if !self.order_by.is_empty() {
            w.push(" ORDER BY ");
            w.push(&self.order_by.join(", "));
        }
        Ok(w.finish())
    }
}

/// DELETE by key; an unfiltered delete is refused
#[derive(Debug, Clone)]
pub struct Delete {
    table: &'static str,
    filters: Vec<Filter>,
}

impl Delete {
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn build(self) -> Result<Statement, QueryError> {
        if self.filters.is_empty() {
            return Err(QueryError::UnfilteredDelete(self.table));
        }

        let mut w = SqlWriter::default();
        w.push("DELETE FROM ");
        w.push(self.table);
        w.push_filters(self.filters);
        Ok(w.finish())
    }
}
