//! SHOW statement parser
//!
//! Covers the MySQL-compatible `SHOW` family that clients and GUIs issue on
//! connect, plus the gateway's own `SHOW MODELS` and `SHOW PROJECTS`:
//!
//! - SHOW DATABASES | SCHEMAS [LIKE 'p']
//! - SHOW [FULL] TABLES [FROM|IN db] [LIKE 'p']
//! - SHOW [GLOBAL|SESSION] VARIABLES [LIKE 'p']
//! - SHOW [GLOBAL|SESSION] STATUS [LIKE 'p']
//! - SHOW [STORAGE] ENGINES
//! - SHOW WARNINGS | ERRORS
//! - SHOW CHARSET | CHARACTER SET [LIKE 'p']
//! - SHOW COLLATION [LIKE 'p']
//! - SHOW FUNCTION STATUS [...], SHOW PROCEDURE STATUS [...]
//! - SHOW MODELS | PREDICTORS [FROM|IN project] [LIKE 'p']
//! - SHOW PROJECTS [LIKE 'p']

use crate::ddl::parsing::{
    parse_like_tail, strip_keyword, strip_keywords, take_name, trim_statement,
};
use crate::ddl::DdlResult;

#[derive(Debug, Clone, PartialEq)]
pub enum ShowKind {
    Databases,
    Tables { full: bool, database: Option<String> },
    Variables,
    Status,
    Engines,
    Warnings,
    Charset,
    Collation,
    FunctionStatus,
    ProcedureStatus,
    Models { project: Option<String> },
    Projects,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowStatement {
    pub kind: ShowKind,
    /// `LIKE` pattern applied to the first column
    pub like: Option<String>,
}

impl ShowStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let rest = strip_keyword(trim_statement(sql), "SHOW")
            .ok_or_else(|| format!("Expected SHOW statement, got: {}", sql))?;

        let rest = strip_keyword(rest, "GLOBAL")
            .or_else(|| strip_keyword(rest, "SESSION"))
            .unwrap_or(rest);

        if let Some(tail) = strip_keyword(rest, "DATABASES").or_else(|| strip_keyword(rest, "SCHEMAS")) {
            return Self::with_like(ShowKind::Databases, tail, "SHOW DATABASES");
        }

        let (full, after_full) = match strip_keyword(rest, "FULL") {
            Some(after) => (true, after),
            None => (false, rest),
        };
        if let Some(tail) = strip_keyword(after_full, "TABLES") {
            let (database, tail) = parse_optional_from(tail)?;
            return Self::with_like(ShowKind::Tables { full, database }, tail, "SHOW TABLES");
        }

        if let Some(tail) = strip_keyword(rest, "VARIABLES") {
            return Self::with_like(ShowKind::Variables, tail, "SHOW VARIABLES");
        }
        // filters on these always-empty results are accepted and ignored
        if strip_keywords(rest, &["FUNCTION", "STATUS"]).is_some() {
            return Ok(Self { kind: ShowKind::FunctionStatus, like: None });
        }
        if strip_keywords(rest, &["PROCEDURE", "STATUS"]).is_some() {
            return Ok(Self { kind: ShowKind::ProcedureStatus, like: None });
        }
        if let Some(tail) = strip_keyword(rest, "STATUS") {
            return Self::with_like(ShowKind::Status, tail, "SHOW STATUS");
        }

        let engines = strip_keywords(rest, &["STORAGE", "ENGINES"]).or_else(|| strip_keyword(rest, "ENGINES"));
        if let Some(tail) = engines {
            return Self::with_like(ShowKind::Engines, tail, "SHOW ENGINES");
        }

        if strip_keyword(rest, "WARNINGS").is_some() || strip_keyword(rest, "ERRORS").is_some() {
            return Ok(Self { kind: ShowKind::Warnings, like: None });
        }

        let charset = strip_keyword(rest, "CHARSET")
            .or_else(|| strip_keywords(rest, &["CHARACTER", "SET"]));
        if let Some(tail) = charset {
            return Self::with_like(ShowKind::Charset, tail, "SHOW CHARSET");
        }
        if let Some(tail) = strip_keyword(rest, "COLLATION") {
            return Self::with_like(ShowKind::Collation, tail, "SHOW COLLATION");
        }

        if let Some(tail) = strip_keyword(rest, "MODELS").or_else(|| strip_keyword(rest, "PREDICTORS")) {
            let (project, tail) = parse_optional_from(tail)?;
            return Self::with_like(ShowKind::Models { project }, tail, "SHOW MODELS");
        }
        if let Some(tail) = strip_keyword(rest, "PROJECTS") {
            return Self::with_like(ShowKind::Projects, tail, "SHOW PROJECTS");
        }

        Err(format!("Unsupported SHOW statement: {}", trim_statement(sql)))
    }

    fn with_like(kind: ShowKind, tail: &str, statement: &str) -> DdlResult<Self> {
        let like = parse_like_tail(tail, statement)?;
        Ok(Self { kind, like })
    }
}

/// `[FROM|IN name]`
fn parse_optional_from(tail: &str) -> DdlResult<(Option<String>, &str)> {
    let after = strip_keyword(tail, "FROM").or_else(|| strip_keyword(tail, "IN"));
    match after {
        Some(after) => {
            let (parts, rest) = take_name(after)?;
            if parts.len() != 1 {
                return Err(format!("Invalid database name '{}'", parts.join(".")));
            }
            Ok((parts.into_iter().next(), rest))
        }
        None => Ok((None, tail)),
    }
}

/// MySQL `LIKE` matching (`%` any run, `_` any char), case-insensitive.
pub fn like_matches(pattern: &str, value: &str) -> bool {
    fn matches(p: &[char], v: &[char]) -> bool {
        match p.split_first() {
            None => v.is_empty(),
            Some(('%', rest)) => (0..=v.len()).any(|i| matches(rest, &v[i..])),
            Some(('_', rest)) => !v.is_empty() && matches(rest, &v[1..]),
            Some(('\\', rest)) if !rest.is_empty() => {
                !v.is_empty() && v[0] == rest[0] && matches(&rest[1..], &v[1..])
            }
            Some((c, rest)) => !v.is_empty() && v[0] == *c && matches(rest, &v[1..]),
        }
    }
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let v: Vec<char> = value.to_lowercase().chars().collect();
    matches(&p, &v)
}
