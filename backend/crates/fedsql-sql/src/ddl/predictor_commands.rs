//! RETRAIN and DROP PREDICTOR statement parsers
//!
//! - RETRAIN [MODEL] [project.]name
//! - DROP PREDICTOR [IF EXISTS] [project.]name
//! - DROP MODEL [IF EXISTS] [project.]name

use crate::ddl::parsing::{ensure_consumed, strip_keyword, strip_keywords, take_name, trim_statement};
use crate::ddl::{split_model_name, DdlResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RetrainPredictorStatement {
    pub project: Option<String>,
    pub name: String,
}

impl RetrainPredictorStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let rest = strip_keyword(trim_statement(sql), "RETRAIN")
            .ok_or_else(|| "Expected RETRAIN statement".to_string())?;
        let rest = strip_keyword(rest, "MODEL")
            .or_else(|| strip_keyword(rest, "PREDICTOR"))
            .filter(|after| !after.is_empty())
            .unwrap_or(rest);
        let (parts, rest) = take_name(rest)?;
        ensure_consumed(rest, "RETRAIN")?;
        let (project, name) = split_model_name(parts)?;
        Ok(Self { project, name })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropPredictorStatement {
    pub project: Option<String>,
    pub name: String,
    pub if_exists: bool,
}

impl DropPredictorStatement {
    pub fn parse(sql: &str) -> DdlResult<Self> {
        let sql = trim_statement(sql);
        let rest = strip_keywords(sql, &["DROP", "PREDICTOR"])
            .or_else(|| strip_keywords(sql, &["DROP", "MODEL"]))
            .ok_or_else(|| "Expected DROP PREDICTOR statement".to_string())?;
        let (if_exists, rest) = match strip_keywords(rest, &["IF", "EXISTS"]) {
            Some(after) => (true, after),
            None => (false, rest),
        };
        let (parts, rest) = take_name(rest)?;
        ensure_consumed(rest, "DROP PREDICTOR")?;
        let (project, name) = split_model_name(parts)?;
        Ok(Self {
            project,
            name,
            if_exists,
        })
    }
}
