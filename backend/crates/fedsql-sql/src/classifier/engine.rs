use crate::classifier::types::{SqlStatement, SqlStatementKind, StatementClassificationError};
use crate::ddl::parsing::{next_word, normalize_and_upper, trim_statement};
use crate::ddl::*;
use crate::parser::parse_query;

/// Classify and parse a single statement.
pub fn classify(sql: &str) -> Result<SqlStatement, StatementClassificationError> {
    let trimmed = trim_statement(sql);
    if trimmed.is_empty() {
        return Err(invalid(sql, "Empty statement".to_string()));
    }

    let upper = normalize_and_upper(trimmed);
    let words: Vec<&str> = upper.splitn(4, ' ').collect();
    let first = words.first().copied().unwrap_or_default();
    let second = words.get(1).copied().unwrap_or_default();
    // "CREATE MODEL IF NOT EXISTS" style prefixes only need the first two words
    let second = next_word(second).0;

    let lift = |res: DdlResult<SqlStatementKind>| res.map_err(|message| invalid(sql, message));

    let kind = match first {
        "SELECT" | "WITH" => {
            let query = parse_query(trimmed).map_err(|message| invalid(sql, message))?;
            SqlStatementKind::Select(query)
        }
        _ if first.starts_with('(') => {
            let query = parse_query(trimmed).map_err(|message| invalid(sql, message))?;
            SqlStatementKind::Select(query)
        }
        "SHOW" => lift(ShowStatement::parse(trimmed).map(SqlStatementKind::Show))?,
        "USE" => lift(UseDatabaseStatement::parse(trimmed).map(SqlStatementKind::Use))?,
        "DESCRIBE" | "DESC" => lift(DescribeStatement::parse(trimmed).map(SqlStatementKind::Describe))?,
        "CREATE" => match second {
            "DATABASE" | "SCHEMA" => lift(
                CreateDatabaseStatement::parse(trimmed).map(SqlStatementKind::CreateDatabase),
            )?,
            "PROJECT" => lift(
                CreateProjectStatement::parse(trimmed).map(SqlStatementKind::CreateProject),
            )?,
            "PREDICTOR" | "MODEL" => lift(
                CreatePredictorStatement::parse(trimmed).map(SqlStatementKind::CreatePredictor),
            )?,
            _ => return Err(unsupported(&upper)),
        },
        "DROP" => match second {
            "DATABASE" | "SCHEMA" => lift(
                DropDatabaseStatement::parse(trimmed).map(SqlStatementKind::DropDatabase),
            )?,
            "TABLE" => lift(DropTableStatement::parse(trimmed).map(SqlStatementKind::DropTable))?,
            "PROJECT" => lift(
                DropProjectStatement::parse(trimmed).map(SqlStatementKind::DropProject),
            )?,
            "PREDICTOR" | "MODEL" => lift(
                DropPredictorStatement::parse(trimmed).map(SqlStatementKind::DropPredictor),
            )?,
            _ => return Err(unsupported(&upper)),
        },
        "RETRAIN" => lift(
            RetrainPredictorStatement::parse(trimmed).map(SqlStatementKind::RetrainPredictor),
        )?,
        "SET" | "BEGIN" | "START" | "COMMIT" | "ROLLBACK" => SqlStatementKind::NoOp(upper.clone()),
        _ => return Err(unsupported(&upper)),
    };

    Ok(SqlStatement::new(trimmed, kind))
}

fn invalid(sql: &str, message: String) -> StatementClassificationError {
    StatementClassificationError::InvalidSql {
        sql: sql.to_string(),
        message,
    }
}

fn unsupported(upper: &str) -> StatementClassificationError {
    let head: Vec<&str> = upper.split(' ').take(2).collect();
    StatementClassificationError::Unsupported(head.join(" "))
}
