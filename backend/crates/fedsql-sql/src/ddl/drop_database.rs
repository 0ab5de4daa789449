//! DROP DATABASE statement parser
//!
//! - DROP DATABASE [IF EXISTS] name
//! - DROP SCHEMA [IF EXISTS] name

use crate::ddl::parsing::{ensure_consumed, strip_keywords, take_name, trim_statement};
use crate::ddl::DdlResult;

#[derive(Debug, Clone, PartialEq)]
pub struct DropDatabaseStatement {
    pub name: String,
    pub if_exists: bool,
}

impl DropDatabaseStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let sql = trim_statement(sql);
        let rest = strip_keywords(sql, &["DROP", "DATABASE"])
            .or_else(|| strip_keywords(sql, &["DROP", "SCHEMA"]))
            .ok_or_else(|| "Expected DROP DATABASE statement".to_string())?;
        let (if_exists, rest) = match strip_keywords(rest, &["IF", "EXISTS"]) {
            Some(after) => (true, after),
            None => (false, rest),
        };
        let (parts, rest) = take_name(rest)?;
        ensure_consumed(rest, "DROP DATABASE")?;
        if parts.len() != 1 {
            return Err(format!("Database name must not be qualified: {}", parts.join(".")));
        }
        Ok(Self {
            name: parts.into_iter().next().unwrap_or_default(),
            if_exists,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drop_database() {
        let stmt = DropDatabaseStatement::parse("DROP DATABASE PG;").unwrap();
        assert_eq!(stmt.name, "PG");
        assert!(!stmt.if_exists);

        let stmt = DropDatabaseStatement::parse("drop schema if exists `my db`").unwrap();
        assert_eq!(stmt.name, "my db");
        assert!(stmt.if_exists);

        assert!(DropDatabaseStatement::parse("DROP DATABASE").is_err());
    }
}
