use crate::error::EtlError;
use rusqlite::Connection;
use rusqlite::types::Value;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryBatch {
    Single(String),
    Many(Vec<String>),
}

impl QueryBatch {
    pub fn statements(&self) -> Vec<&str> {
        match self {
            QueryBatch::Single(statement) => vec![statement.as_str()],
            QueryBatch::Many(statements) => statements.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for QueryBatch {
    fn from(value: &str) -> Self {
        QueryBatch::Single(value.to_string())
    }
}

impl From<String> for QueryBatch {
    fn from(value: String) -> Self {
        QueryBatch::Single(value)
    }
}

impl From<Vec<String>> for QueryBatch {
    fn from(value: Vec<String>) -> Self {
        QueryBatch::Many(value)
    }
}

impl From<&[&str]> for QueryBatch {
    fn from(value: &[&str]) -> Self {
        QueryBatch::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub statement: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

pub fn run_query(conn: &Connection, statement: &str) -> Result<QueryResult, EtlError> {
    let store_err = |err| EtlError::store(format!("running {statement:?}"), err);

    let mut stmt = conn.prepare(statement).map_err(store_err)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([]).map_err(store_err)?;
    while let Some(row) = cursor.next().map_err(store_err)? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(row.get::<_, Value>(i).map_err(store_err)?);
        }
        rows.push(values);
    }

    debug!(statement, rows = rows.len(), "query complete");
    Ok(QueryResult {
        statement: statement.to_string(),
        columns,
        rows,
    })
}

pub fn run_queries(
    conn: &Connection,
    batch: impl Into<QueryBatch>,
) -> Result<Vec<QueryResult>, EtlError> {
    batch
        .into()
        .statements()
        .into_iter()
        .map(|statement| run_query(conn, statement))
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => format!("{v:?}"),
        Value::Text(v) => v.clone(),
        Value::Blob(v) => format!("<{} bytes>", v.len()),
    }
}

// A column right-aligns when every non-null value in it is a number.
fn numeric_columns(columns: usize, rows: &[Vec<Value>]) -> Vec<bool> {
    (0..columns)
        .map(|i| {
            let mut values = rows
                .iter()
                .filter_map(|row| row.get(i))
                .filter(|v| !matches!(v, Value::Null))
                .peekable();
            values.peek().is_some()
                && values.all(|v| matches!(v, Value::Integer(_) | Value::Real(_)))
        })
        .collect()
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.statement)?;

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(render_value).collect())
            .collect();

        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let numeric = numeric_columns(self.columns.len(), &self.rows);
        let write_cell = |f: &mut fmt::Formatter<'_>, text: &str, i: usize| {
            let width = widths[i];
            if numeric[i] {
                write!(f, "  {text:>width$}")
            } else {
                write!(f, "  {text:<width$}")
            }
        };

        write!(f, "{:index_width$}", "")?;
        for (i, name) in self.columns.iter().enumerate() {
            write_cell(f, name, i)?;
        }
        writeln!(f)?;

        if self.rows.is_empty() {
            return writeln!(f, "(no rows)");
        }

        for (index, rendered) in cells.iter().enumerate() {
            write!(f, "{index:<index_width$}")?;
            for (i, cell) in rendered.iter().enumerate() {
                write_cell(f, cell, i)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
