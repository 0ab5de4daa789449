//! Common parsing utilities

use sqlparser::ast::{ObjectName, ObjectNamePart, Statement};
use sqlparser::dialect::Dialect;
use sqlparser::parser::{Parser, ParserError, ParserOptions};

const DEFAULT_SQL_RECURSION_LIMIT: usize = 256;

/// Default sqlparser options used across the gateway
pub fn parser_options() -> ParserOptions {
    ParserOptions::new().with_trailing_commas(true)
}

/// Parse SQL into statements using gateway defaults (options + recursion limit)
pub fn parse_sql_statements(sql: &str, dialect: &dyn Dialect) -> Result<Vec<Statement>, ParserError> {
    Parser::new(dialect)
        .with_options(parser_options())
        .with_recursion_limit(DEFAULT_SQL_RECURSION_LIMIT)
        .try_with_sql(sql)?
        .parse_statements()
}

/// Unquoted identifier parts of an object name, e.g. `files`.`t` → ["files", "t"].
pub fn object_name_parts(name: &ObjectName) -> Vec<String> {
    name.0
        .iter()
        .filter_map(|part| match part {
            ObjectNamePart::Identifier(ident) => Some(ident.value.clone()),
            #[allow(unreachable_patterns)]
            _ => None,
        })
        .collect()
}
