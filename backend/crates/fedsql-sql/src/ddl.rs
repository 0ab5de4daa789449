//! Gateway statement parsers.
//!
//! These cover the statements sqlparser has no grammar for: data source
//! registration, projects, predictors and the MySQL-compatible `SHOW`
//! family.

pub mod parsing;

pub mod create_database;
pub mod create_predictor;
pub mod describe;
pub mod drop_database;
pub mod drop_table;
pub mod predictor_commands;
pub mod project_commands;
pub mod show;
pub mod use_database;

/// Result type used by the DDL parsers.
/// Returns String errors so callers can lift them into their own error type.
pub type DdlResult<T> = Result<T, String>;

pub use create_database::CreateDatabaseStatement;
pub use create_predictor::CreatePredictorStatement;
pub use describe::DescribeStatement;
pub use drop_database::DropDatabaseStatement;
pub use drop_table::DropTableStatement;
pub use predictor_commands::{DropPredictorStatement, RetrainPredictorStatement};
pub use project_commands::{CreateProjectStatement, DropProjectStatement};
pub use show::{ShowKind, ShowStatement};
pub use use_database::UseDatabaseStatement;

/// Split `[project.]name` into its parts.
pub(crate) fn split_model_name(parts: Vec<String>) -> DdlResult<(Option<String>, String)> {
    let mut parts = parts;
    match parts.len() {
        1 => Ok((None, parts.remove(0))),
        2 => {
            let name = parts.remove(1);
            Ok((Some(parts.remove(0)), name))
        }
        _ => Err(format!("Invalid model name '{}'", parts.join("."))),
    }
}
