//! CREATE DATABASE statement parser
//!
//! Parses SQL statements like:
//! - CREATE DATABASE pg WITH ENGINE = 'postgres', PARAMETERS = {"host": "..."}
//! - CREATE DATABASE IF NOT EXISTS db ENGINE 'mysql' PARAMETERS {...}
//! - CREATE SCHEMA db WITH ENGINE = 'mariadb'

use crate::ddl::parsing::{
    ensure_consumed, strip_char, strip_keyword, strip_keywords, take_bracketed, take_name,
    take_string_or_word,
};
use crate::ddl::DdlResult;

/// CREATE DATABASE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDatabaseStatement {
    pub name: String,
    /// Engine kind, lowercased (`postgres`, `mysql`, ...)
    pub engine: String,
    /// Connection parameters; always a JSON object
    pub parameters: serde_json::Value,
    pub if_not_exists: bool,
}

impl CreateDatabaseStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let sql = crate::ddl::parsing::trim_statement(sql);
        let rest = strip_keywords(sql, &["CREATE", "DATABASE"])
            .or_else(|| strip_keywords(sql, &["CREATE", "SCHEMA"]))
            .ok_or_else(|| "Expected CREATE DATABASE statement".to_string())?;

        let (if_not_exists, rest) = match strip_keywords(rest, &["IF", "NOT", "EXISTS"]) {
            Some(after) => (true, after),
            None => (false, rest),
        };

        let (parts, rest) = take_name(rest)?;
        if parts.len() != 1 {
            return Err(format!("Database name must not be qualified: {}", parts.join(".")));
        }
        let name = parts.into_iter().next().unwrap_or_default();

        let rest = strip_keyword(rest, "WITH").unwrap_or(rest);
        let rest = strip_keyword(rest, "ENGINE")
            .ok_or_else(|| format!("CREATE DATABASE {} requires an ENGINE clause", name))?;
        let rest = strip_char(rest, '=').unwrap_or(rest);
        let (engine, rest) = take_string_or_word(rest)?;
        if engine.trim().is_empty() {
            return Err("ENGINE cannot be empty".to_string());
        }

        let rest = strip_char(rest, ',').unwrap_or(rest);
        let (parameters, rest) = match strip_keyword(rest, "PARAMETERS") {
            Some(after) => {
                let after = strip_char(after, '=').unwrap_or(after);
                if !after.starts_with('{') {
                    return Err("PARAMETERS must be a JSON object".to_string());
                }
                let (inner, tail) = take_bracketed(after)?;
                let json: serde_json::Value = serde_json::from_str(&format!("{{{}}}", inner))
                    .map_err(|e| format!("Invalid PARAMETERS JSON: {}", e))?;
                (json, tail)
            }
            None => (serde_json::Value::Object(Default::default()), rest),
        };
        ensure_consumed(rest, "CREATE DATABASE")?;

        Ok(Self {
            name,
            engine: engine.trim().to_lowercase(),
            parameters,
            if_not_exists,
        })
    }
}
