//! DROP TABLE statement parser
//!
//! Only uploaded file tables can be dropped: `DROP TABLE [IF EXISTS] files.name`.

use crate::ddl::parsing::{ensure_consumed, strip_keywords, take_name, trim_statement};
use crate::ddl::DdlResult;

#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Qualifying database, if given
    pub database: Option<String>,
    pub table: String,
    pub if_exists: bool,
}

impl DropTableStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let rest = strip_keywords(trim_statement(sql), &["DROP", "TABLE"])
            .ok_or_else(|| "Expected DROP TABLE statement".to_string())?;
        let (if_exists, rest) = match strip_keywords(rest, &["IF", "EXISTS"]) {
            Some(after) => (true, after),
            None => (false, rest),
        };
        let (mut parts, rest) = take_name(rest)?;
        ensure_consumed(rest, "DROP TABLE")?;
        match parts.len() {
            1 => Ok(Self {
                database: None,
                table: parts.remove(0),
                if_exists,
            }),
            2 => {
                let table = parts.remove(1);
                Ok(Self {
                    database: Some(parts.remove(0)),
                    table,
                    if_exists,
                })
            }
            _ => Err(format!("Invalid table name '{}'", parts.join("."))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drop_table() {
        let stmt = DropTableStatement::parse("DROP TABLE files.test_file").unwrap();
        assert_eq!(stmt.database.as_deref(), Some("files"));
        assert_eq!(stmt.table, "test_file");

        let stmt = DropTableStatement::parse("drop table if exists t;").unwrap();
        assert_eq!(stmt.database, None);
        assert!(stmt.if_exists);
    }
}
