//! DESCRIBE statement parser
//!
//! - DESCRIBE [PREDICTOR|MODEL|TABLE] [db.]name
//! - DESC name

use crate::ddl::parsing::{ensure_consumed, strip_keyword, take_name, trim_statement};
use crate::ddl::DdlResult;

#[derive(Debug, Clone, PartialEq)]
pub struct DescribeStatement {
    /// Name parts as written, e.g. `["mindsdb", "p_test_1"]`
    pub parts: Vec<String>,
}

impl DescribeStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let sql = trim_statement(sql);
        let rest = strip_keyword(sql, "DESCRIBE")
            .or_else(|| strip_keyword(sql, "DESC"))
            .ok_or_else(|| "Expected DESCRIBE statement".to_string())?;
        let rest = ["PREDICTOR", "MODEL", "TABLE"]
            .iter()
            .find_map(|kw| strip_keyword(rest, kw).filter(|after| !after.is_empty()))
            .unwrap_or(rest);
        let (parts, tail) = take_name(rest)?;
        ensure_consumed(tail, "DESCRIBE")?;
        if parts.len() > 3 {
            return Err(format!("Invalid name '{}'", parts.join(".")));
        }
        Ok(Self { parts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_describe() {
        let stmt = DescribeStatement::parse("DESCRIBE mindsdb.p_test_1").unwrap();
        assert_eq!(stmt.parts, vec!["mindsdb", "p_test_1"]);

        let stmt = DescribeStatement::parse("desc model m;").unwrap();
        assert_eq!(stmt.parts, vec!["m"]);

        assert!(DescribeStatement::parse("DESCRIBE").is_err());
    }
}
