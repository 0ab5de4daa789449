//! SQL response model
//!
//! The envelope returned by `POST /api/sql/query`. Exactly one of three shapes:
//!
//! ```json
//! {"type": "table", "column_names": ["a", "a"], "data": [[1, "x"]], "context": {"db": "mindsdb"}}
//! {"type": "ok", "context": {"db": "files"}}
//! {"type": "error", "error_code": "UNKNOWN_TABLE", "error_message": "...", "context": {"db": "mindsdb"}}
//! ```

use actix_web::http::StatusCode;
use fedsql_auth::AuthError;
use fedsql_core::{ExecutionResult, GatewayError, SqlContext, TableData};
use serde::{Deserialize, Serialize};

/// Error codes carried by `error_code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// SQL could not be parsed
    InvalidSql,
    /// Rejected input (bad target column, empty credentials, ...)
    ValidationError,
    UnknownDatabase,
    UnknownTable,
    UnknownColumn,
    NotFound,
    DuplicateName,
    /// Predictor version not trained yet, or training failed
    NotReady,
    Forbidden,
    NotSupported,
    /// External engine or connector failure
    EngineError,
    InternalError,
    /// Protected endpoint reached without an authenticated session
    Unauthenticated,
    InvalidCredentials,
    /// Malformed request body
    InvalidInput,
    FileTooLarge,
    MissingFile,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidSql => "INVALID_SQL",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::UnknownDatabase => "UNKNOWN_DATABASE",
            ErrorCode::UnknownTable => "UNKNOWN_TABLE",
            ErrorCode::UnknownColumn => "UNKNOWN_COLUMN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::DuplicateName => "DUPLICATE_NAME",
            ErrorCode::NotReady => "NOT_READY",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotSupported => "NOT_SUPPORTED",
            ErrorCode::EngineError => "ENGINE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::FileTooLarge => "FILE_TOO_LARGE",
            ErrorCode::MissingFile => "MISSING_FILE",
        }
    }

    /// HTTP status of the category.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::Forbidden | ErrorCode::Unauthenticated => StatusCode::FORBIDDEN,
            ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::EngineError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Whether the code means the addressed thing does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ErrorCode::NotFound | ErrorCode::UnknownDatabase | ErrorCode::UnknownTable
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&GatewayError> for ErrorCode {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::InvalidSql(_) => ErrorCode::InvalidSql,
            GatewayError::Validation(_) => ErrorCode::ValidationError,
            GatewayError::UnknownDatabase(_) => ErrorCode::UnknownDatabase,
            GatewayError::UnknownTable(_) => ErrorCode::UnknownTable,
            GatewayError::UnknownColumn(_) => ErrorCode::UnknownColumn,
            GatewayError::NotFound(_) => ErrorCode::NotFound,
            GatewayError::DuplicateName(_) => ErrorCode::DuplicateName,
            GatewayError::NotReady(_) => ErrorCode::NotReady,
            GatewayError::Forbidden(_) => ErrorCode::Forbidden,
            GatewayError::NotSupported(_) => ErrorCode::NotSupported,
            GatewayError::Engine(_) => ErrorCode::EngineError,
            GatewayError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl From<&AuthError> for ErrorCode {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::Validation(_) => ErrorCode::ValidationError,
            AuthError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AuthError::Unauthenticated => ErrorCode::Unauthenticated,
            AuthError::HashingError(_) => ErrorCode::InternalError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Table,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// Ordered, never de-duplicated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Vec<serde_json::Value>>>,

    /// Session context after the statement; unchanged on error
    pub context: SqlContext,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl QueryResponse {
    pub fn table(data: &TableData, context: SqlContext) -> Self {
        Self {
            response_type: ResponseType::Table,
            column_names: Some(data.columns.clone()),
            data: Some(
                data.rows
                    .iter()
                    .map(|row| row.iter().map(|v| v.to_json()).collect())
                    .collect(),
            ),
            context,
            error_code: None,
            error_message: None,
        }
    }

    pub fn ok(context: SqlContext) -> Self {
        Self {
            response_type: ResponseType::Ok,
            column_names: None,
            data: None,
            context,
            error_code: None,
            error_message: None,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>, context: SqlContext) -> Self {
        Self {
            response_type: ResponseType::Error,
            column_names: None,
            data: None,
            context,
            error_code: Some(code.as_str().to_string()),
            error_message: Some(message.into()),
        }
    }

    /// Shape an execution outcome. `after` is the context once the statement
    /// ran; `before` is echoed back on error.
    pub fn from_outcome(
        outcome: &Result<ExecutionResult, GatewayError>,
        before: SqlContext,
        after: SqlContext,
    ) -> (StatusCode, Self) {
        match outcome {
            Ok(ExecutionResult::Table(data)) => (StatusCode::OK, Self::table(data, after)),
            Ok(ExecutionResult::Ok) => (StatusCode::OK, Self::ok(after)),
            Err(err) => {
                let code = ErrorCode::from(err);
                (code.status(), Self::error(code, err.to_string(), before))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedsql_commons::Value;
    use serde_json::json;

    #[test]
    fn test_table_envelope_keeps_duplicate_columns_and_types() {
        let data = TableData::new(
            vec!["a".to_string(), "a".to_string(), "c".to_string()],
            vec![vec![Value::Int(1), Value::from("x"), Value::Null]],
        );
        let body = serde_json::to_value(QueryResponse::table(&data, SqlContext::new("files"))).unwrap();
        assert_eq!(
            body,
            json!({
                "type": "table",
                "column_names": ["a", "a", "c"],
                "data": [[1, "x", null]],
                "context": {"db": "files"}
            })
        );
    }

    #[test]
    fn test_ok_envelope_has_no_result_keys() {
        let body = serde_json::to_value(QueryResponse::ok(SqlContext::default())).unwrap();
        assert_eq!(body, json!({"type": "ok", "context": {"db": "mindsdb"}}));
    }

    #[test]
    fn test_error_keeps_previous_context() {
        let outcome = Err(GatewayError::unknown_database("nope"));
        let (status, response) = QueryResponse::from_outcome(
            &outcome,
            SqlContext::new("files"),
            SqlContext::new("nope"),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response.response_type, ResponseType::Error);
        assert_eq!(response.error_code.as_deref(), Some("UNKNOWN_DATABASE"));
        assert_eq!(response.context.db, "files");
    }

    #[test]
    fn test_status_categories() {
        assert_eq!(
            ErrorCode::from(&GatewayError::Forbidden("x".into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::from(&GatewayError::Internal("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        for err in [
            GatewayError::InvalidSql("x".into()),
            GatewayError::NotReady("x".into()),
            GatewayError::DuplicateName("x".into()),
            GatewayError::NotSupported("x".into()),
        ] {
            assert_eq!(ErrorCode::from(&err).status(), StatusCode::BAD_REQUEST, "{:?}", err);
        }
        assert_eq!(
            ErrorCode::from(&AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
