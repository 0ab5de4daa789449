//! SQL request model
//!
//! Body of `POST /api/sql/query`.

use fedsql_core::SqlContext;
use serde::{Deserialize, Serialize};

/// Request payload for SQL execution
///
/// # Example
/// ```json
/// {
///   "query": "SELECT * FROM files.rentals LIMIT 10",
///   "context": {"db": "files"}
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// A single SQL statement
    pub query: String,

    /// Session context returned by the previous response
    #[serde(default)]
    pub context: Option<SqlContext>,
}

impl QueryRequest {
    /// Missing or blank context means the default project.
    pub fn context_or_default(&self) -> SqlContext {
        self.context
            .clone()
            .filter(|c| !c.db.trim().is_empty())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_optional() {
        let request: QueryRequest = serde_json::from_str(r#"{"query": "select 1"}"#).unwrap();
        assert_eq!(request.query, "select 1");
        assert_eq!(request.context_or_default().db, "mindsdb");

        let request: QueryRequest =
            serde_json::from_str(r#"{"query": "show tables", "context": {"db": "files"}}"#).unwrap();
        assert_eq!(request.context_or_default().db, "files");
    }
}
