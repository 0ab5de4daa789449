//! USE statement parser
//!
//! - USE db
//! - USE `db`
//! - USE DATABASE db

use crate::ddl::parsing::{ensure_consumed, strip_keyword, take_name, trim_statement};
use crate::ddl::DdlResult;

/// Changes the database that unqualified table names resolve in.
#[derive(Debug, Clone, PartialEq)]
pub struct UseDatabaseStatement {
    pub database: String,
}

impl UseDatabaseStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let rest = strip_keyword(trim_statement(sql), "USE")
            .ok_or_else(|| format!("Expected USE statement, got: {}", sql))?;
        let rest = match strip_keyword(rest, "DATABASE") {
            Some(after) if !after.is_empty() => after,
            _ => rest,
        };
        if rest.trim().is_empty() {
            return Err("USE requires a database name".to_string());
        }
        let (parts, tail) = take_name(rest)?;
        ensure_consumed(tail, "USE")?;
        if parts.len() != 1 {
            return Err(format!("Invalid database name '{}'", parts.join(".")));
        }
        Ok(Self {
            database: parts.into_iter().next().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_use() {
        assert_eq!(UseDatabaseStatement::parse("USE files").unwrap().database, "files");
        assert_eq!(UseDatabaseStatement::parse("use `mindsdb`;").unwrap().database, "mindsdb");
        assert_eq!(UseDatabaseStatement::parse("USE DATABASE pg").unwrap().database, "pg");
        // a database literally called "database"
        assert_eq!(UseDatabaseStatement::parse("USE database").unwrap().database, "database");
        assert!(UseDatabaseStatement::parse("USE").is_err());
        assert!(UseDatabaseStatement::parse("USE a b").is_err());
    }
}
