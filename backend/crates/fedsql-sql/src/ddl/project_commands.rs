//! CREATE PROJECT / DROP PROJECT statement parsers

use crate::ddl::parsing::{ensure_consumed, strip_keywords, take_name, trim_statement};
use crate::ddl::DdlResult;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProjectStatement {
    pub name: String,
    pub if_not_exists: bool,
}

impl CreateProjectStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let rest = strip_keywords(trim_statement(sql), &["CREATE", "PROJECT"])
            .ok_or_else(|| "Expected CREATE PROJECT statement".to_string())?;
        let (if_not_exists, rest) = match strip_keywords(rest, &["IF", "NOT", "EXISTS"]) {
            Some(after) => (true, after),
            None => (false, rest),
        };
        let name = single_name(rest, "CREATE PROJECT")?;
        Ok(Self {
            name,
            if_not_exists,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropProjectStatement {
    pub name: String,
    pub if_exists: bool,
}

impl DropProjectStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let rest = strip_keywords(trim_statement(sql), &["DROP", "PROJECT"])
            .ok_or_else(|| "Expected DROP PROJECT statement".to_string())?;
        let (if_exists, rest) = match strip_keywords(rest, &["IF", "EXISTS"]) {
            Some(after) => (true, after),
            None => (false, rest),
        };
        let name = single_name(rest, "DROP PROJECT")?;
        Ok(Self { name, if_exists })
    }
}

fn single_name(rest: &str, statement: &str) -> DdlResult<String> {
    let (parts, tail) = take_name(rest)?;
    ensure_consumed(tail, statement)?;
    if parts.len() != 1 {
        return Err(format!("Project name must not be qualified: {}", parts.join(".")));
    }
    Ok(parts.into_iter().next().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_statements() {
        let stmt = CreateProjectStatement::parse("CREATE PROJECT IF NOT EXISTS sales;").unwrap();
        assert_eq!(stmt.name, "sales");
        assert!(stmt.if_not_exists);

        let stmt = DropProjectStatement::parse("drop project sales").unwrap();
        assert_eq!(stmt.name, "sales");
        assert!(!stmt.if_exists);

        assert!(CreateProjectStatement::parse("CREATE PROJECT a.b").is_err());
    }
}
