//! Execution outcomes, before they are shaped into the wire envelope.

use fedsql_commons::Value;
use serde::{Deserialize, Serialize};

/// Columns plus rows. Column names are ordered and may repeat.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TableData {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Case-insensitive column position.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Drop rows past `max`. Returns whether anything was dropped.
    pub fn truncate(&mut self, max: usize) -> bool {
        if self.rows.len() > max {
            self.rows.truncate(max);
            true
        } else {
            false
        }
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_json_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter())
                    .map(|(col, value)| (col.clone(), value.to_json()))
                    .collect()
            })
            .collect()
    }
}

/// Session context carried by the client between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlContext {
    pub db: String,
}

impl SqlContext {
    pub fn new(db: impl Into<String>) -> Self {
        Self { db: db.into() }
    }
}

impl Default for SqlContext {
    fn default() -> Self {
        Self::new(fedsql_commons::DEFAULT_PROJECT)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// A result set (possibly zero rows)
    Table(TableData),
    /// Statement succeeded without a result set
    Ok,
}
