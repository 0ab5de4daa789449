//! Standard SQL parser wrapping sqlparser-rs.
//!
//! The MySQL dialect is tried first: the gateway speaks to MySQL-flavoured
//! clients, so `"a"` is a string literal and backticks quote identifiers.
//! The generic dialect is the fallback for syntax MySQL rejects.

use sqlparser::ast::{Query, Statement};
use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect};
use sqlparser::parser::ParserError;

use super::utils::parse_sql_statements;

/// Parse SQL statement(s), MySQL dialect first, then generic.
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>, String> {
    if let Ok(statements) = try_parse_with_dialect(sql, &MySqlDialect {}) {
        return Ok(statements);
    }

    try_parse_with_dialect(sql, &GenericDialect {}).map_err(|e| format!("Failed to parse SQL: {}", e))
}

fn try_parse_with_dialect(sql: &str, dialect: &dyn Dialect) -> Result<Vec<Statement>, ParserError> {
    parse_sql_statements(sql, dialect)
}

/// Parse exactly one statement.
pub fn parse_single_statement(sql: &str) -> Result<Statement, String> {
    let mut statements = parse_sql(sql)?;

    if statements.len() != 1 {
        return Err(format!(
            "Expected exactly one statement, got {}",
            statements.len()
        ));
    }

    Ok(statements.remove(0))
}

/// Parse a `SELECT`-style query.
pub fn parse_query(sql: &str) -> Result<Box<Query>, String> {
    match parse_single_statement(sql)? {
        Statement::Query(query) => Ok(query),
        other => Err(format!("Expected a SELECT statement, got: {}", other)),
    }
}
