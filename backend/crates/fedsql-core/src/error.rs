// Error types module
use fedsql_sql::StatementClassificationError;
use thiserror::Error;

/// Main error type for the gateway core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Invalid SQL: {0}")]
    InvalidSql(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unknown database: {0}")]
    UnknownDatabase(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    DuplicateName(String),

    /// Predictor exists but the targeted version is not trained yet
    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Failure reported by an external engine or connector
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Lift a DDL parser error.
    pub fn invalid_sql(message: impl Into<String>) -> Self {
        GatewayError::InvalidSql(message.into())
    }

    pub fn unknown_database(name: &str) -> Self {
        GatewayError::UnknownDatabase(name.to_string())
    }

    pub fn unknown_table(database: &str, table: &str) -> Self {
        GatewayError::UnknownTable(format!("{}.{}", database, table))
    }
}

impl From<StatementClassificationError> for GatewayError {
    fn from(err: StatementClassificationError) -> Self {
        match err {
            StatementClassificationError::InvalidSql { message, .. } => GatewayError::InvalidSql(message),
            StatementClassificationError::Unsupported(what) => {
                GatewayError::NotSupported(format!("statement {}", what))
            }
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
