//! CREATE PREDICTOR / CREATE MODEL statement parser
//!
//! ```sql
//! CREATE PREDICTOR mindsdb.rentals
//! FROM files (SELECT * FROM home_rentals)
//! PREDICT rental_price
//! USING engine = 'baseline';
//! ```

use std::collections::BTreeMap;

use crate::ddl::parsing::{
    ensure_consumed, strip_char, strip_keyword, strip_keywords, take_bracketed, take_name,
    take_string_or_word, trim_statement,
};
use crate::ddl::{split_model_name, DdlResult};

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePredictorStatement {
    /// Owning project; `None` means the session's current project
    pub project: Option<String>,
    pub name: String,
    pub if_not_exists: bool,
    /// Database the training query runs against
    pub source_database: String,
    /// Training query text, without the surrounding parentheses
    pub select_query: String,
    pub target: String,
    /// `USING key = value, ...` pairs, keys lowercased
    pub options: BTreeMap<String, String>,
}

impl CreatePredictorStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let sql = trim_statement(sql);
        let rest = strip_keywords(sql, &["CREATE", "PREDICTOR"])
            .or_else(|| strip_keywords(sql, &["CREATE", "MODEL"]))
            .ok_or_else(|| "Expected CREATE PREDICTOR statement".to_string())?;

        let (if_not_exists, rest) = match strip_keywords(rest, &["IF", "NOT", "EXISTS"]) {
            Some(after) => (true, after),
            None => (false, rest),
        };

        let (parts, rest) = take_name(rest)?;
        let (project, name) = split_model_name(parts)?;

        let rest = strip_keyword(rest, "FROM")
            .ok_or_else(|| format!("CREATE PREDICTOR {} requires a FROM clause", name))?;
        let (db_parts, rest) = take_name(rest)?;
        if db_parts.len() != 1 {
            return Err(format!("Invalid source database '{}'", db_parts.join(".")));
        }
        let source_database = db_parts.into_iter().next().unwrap_or_default();

        if !rest.trim_start().starts_with('(') {
            return Err("Training query must be wrapped in parentheses".to_string());
        }
        let (select_query, rest) = take_bracketed(rest)?;
        let select_query = select_query.trim().to_string();
        if select_query.is_empty() {
            return Err("Training query cannot be empty".to_string());
        }

        let rest = strip_keyword(rest, "PREDICT")
            .ok_or_else(|| format!("CREATE PREDICTOR {} requires a PREDICT clause", name))?;
        let (target_parts, rest) = take_name(rest)?;
        let target = target_parts
            .last()
            .cloned()
            .ok_or_else(|| "PREDICT requires a column".to_string())?;

        let (options, rest) = match strip_keyword(rest, "USING") {
            Some(after) => parse_using(after)?,
            None => (BTreeMap::new(), rest),
        };
        ensure_consumed(rest, "CREATE PREDICTOR")?;

        Ok(Self {
            project,
            name,
            if_not_exists,
            source_database,
            select_query,
            target,
            options,
        })
    }
}

fn parse_using(mut rest: &str) -> DdlResult<(BTreeMap<String, String>, &str)> {
    let mut options = BTreeMap::new();
    loop {
        let (key, after) = take_string_or_word(rest)?;
        let after = strip_char(after, '=')
            .ok_or_else(|| format!("Expected '=' after USING key '{}'", key))?;
        let (value, after) = take_string_or_word(after)?;
        options.insert(key.to_lowercase(), value);
        match strip_char(after, ',') {
            Some(next) => rest = next,
            None => return Ok((options, after)),
        }
    }
}
