use crate::ddl::*;
use sqlparser::ast::Query;

/// Error returned when classifying or parsing SQL statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementClassificationError {
    /// SQL parsing failed; message contains the parser error.
    InvalidSql { sql: String, message: String },
    /// Syntactically plausible but not something the gateway executes.
    Unsupported(String),
}

impl std::fmt::Display for StatementClassificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementClassificationError::InvalidSql { message, .. } => {
                write!(f, "Invalid SQL: {}", message)
            }
            StatementClassificationError::Unsupported(msg) => {
                write!(f, "Unsupported statement: {}", msg)
            }
        }
    }
}

impl std::error::Error for StatementClassificationError {}

/// A classified statement together with its original text.
#[derive(Debug, Clone)]
pub struct SqlStatement {
    pub(crate) sql_text: String,
    pub(crate) kind: SqlStatementKind,
}

impl SqlStatement {
    pub fn new(sql_text: impl Into<String>, kind: SqlStatementKind) -> Self {
        Self {
            sql_text: sql_text.into(),
            kind,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql_text
    }

    pub fn kind(&self) -> &SqlStatementKind {
        &self.kind
    }

    pub fn into_kind(self) -> SqlStatementKind {
        self.kind
    }

    /// Statement family name, for logging.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            SqlStatementKind::Select(_) => "SELECT",
            SqlStatementKind::Show(_) => "SHOW",
            SqlStatementKind::Use(_) => "USE",
            SqlStatementKind::Describe(_) => "DESCRIBE",
            SqlStatementKind::CreateDatabase(_) => "CREATE DATABASE",
            SqlStatementKind::DropDatabase(_) => "DROP DATABASE",
            SqlStatementKind::DropTable(_) => "DROP TABLE",
            SqlStatementKind::CreateProject(_) => "CREATE PROJECT",
            SqlStatementKind::DropProject(_) => "DROP PROJECT",
            SqlStatementKind::CreatePredictor(_) => "CREATE PREDICTOR",
            SqlStatementKind::RetrainPredictor(_) => "RETRAIN",
            SqlStatementKind::DropPredictor(_) => "DROP PREDICTOR",
            SqlStatementKind::NoOp(_) => "NOOP",
        }
    }
}

/// Statement type variants
#[derive(Debug, Clone)]
pub enum SqlStatementKind {
    /// SELECT ... (parsed by sqlparser)
    Select(Box<Query>),
    /// SHOW ...
    Show(ShowStatement),
    /// USE <db>
    Use(UseDatabaseStatement),
    /// DESCRIBE [db.]name
    Describe(DescribeStatement),

    // ===== Data sources =====
    /// CREATE DATABASE <name> WITH ENGINE = '<kind>', PARAMETERS = {...}
    CreateDatabase(CreateDatabaseStatement),
    /// DROP DATABASE [IF EXISTS] <name>
    DropDatabase(DropDatabaseStatement),
    /// DROP TABLE files.<name>
    DropTable(DropTableStatement),

    // ===== Projects and predictors =====
    CreateProject(CreateProjectStatement),
    DropProject(DropProjectStatement),
    /// CREATE PREDICTOR|MODEL <name> FROM <db> (<select>) PREDICT <col>
    CreatePredictor(CreatePredictorStatement),
    RetrainPredictor(RetrainPredictorStatement),
    DropPredictor(DropPredictorStatement),

    /// Session statements MySQL clients send (`SET NAMES`, `BEGIN`, ...);
    /// acknowledged with OK and otherwise ignored.
    NoOp(String),
}
