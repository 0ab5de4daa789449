//! DDL handlers: DESCRIBE, data sources, file tables and projects.

use fedsql_commons::Value;
use fedsql_sql::ddl::{
    CreateDatabaseStatement, CreateProjectStatement, DescribeStatement, DropDatabaseStatement,
    DropProjectStatement, DropTableStatement,
};

use crate::error::{GatewayError, GatewayResult};
use crate::registry::{DataSourceKind, TableSource};
use crate::result::{ExecutionResult, TableData};
use crate::sql::executor::SqlExecutor;
use crate::sql::ExecutionContext;

/// Rows sampled to report a column type.
const DESCRIBE_SAMPLE_ROWS: usize = 100;

impl SqlExecutor {
    pub(crate) async fn describe(&self, stmt: &DescribeStatement, ctx: &ExecutionContext) -> GatewayResult<TableData> {
        let tenant = ctx.tenant();
        let (db, table, version) = match stmt.parts.as_slice() {
            [t] => (ctx.database(), t.as_str(), None),
            [d, t] => (d.as_str(), t.as_str(), None),
            [d, t, v] => {
                let v = v
                    .parse::<u32>()
                    .map_err(|_| GatewayError::InvalidSql(format!("Invalid model version '{}'", v)))?;
                (d.as_str(), t.as_str(), Some(v))
            }
            _ => return Err(GatewayError::InvalidSql("DESCRIBE needs a table name".to_string())),
        };

        let source = match (self.registry.resolve(tenant, db, table)?, version) {
            (TableSource::Predictor { project, name, .. }, Some(v)) => TableSource::Predictor {
                project,
                name,
                version: Some(v),
            },
            (_, Some(_)) => {
                return Err(GatewayError::InvalidSql(format!(
                    "'{}.{}' is not a model and has no versions",
                    db, table
                )))
            }
            (source, None) => source,
        };

        let columns = self.registry.describe(tenant, &source).await?;
        let types: Vec<&'static str> = match &source {
            TableSource::Predictor { .. } => vec!["text"; columns.len()],
            _ => {
                let sample = self
                    .registry
                    .scan(tenant, &source, Some(DESCRIBE_SAMPLE_ROWS))
                    .await
                    .unwrap_or_default();
                (0..columns.len())
                    .map(|i| {
                        sample
                            .rows
                            .iter()
                            .filter_map(|row| row.get(i))
                            .find(|v| !v.is_null())
                            .map(Value::type_name)
                            .unwrap_or("text")
                    })
                    .collect()
            }
        };

        Ok(TableData::new(
            vec!["Field".to_string(), "Type".to_string()],
            columns
                .into_iter()
                .zip(types)
                .map(|(field, ty)| vec![Value::Text(field), Value::from(ty)])
                .collect(),
        ))
    }

    pub(crate) fn create_database(
        &self,
        stmt: CreateDatabaseStatement,
        ctx: &ExecutionContext,
    ) -> GatewayResult<ExecutionResult> {
        if stmt.if_not_exists && self.registry.exists(ctx.tenant(), &stmt.name) {
            log::debug!("Database '{}' exists, skipping create", stmt.name);
            return Ok(ExecutionResult::Ok);
        }
        // A concurrent create can still win between the check and the insert
        match self
            .registry
            .register(ctx.tenant(), &stmt.name, &stmt.engine, stmt.parameters)
        {
            Ok(_) => Ok(ExecutionResult::Ok),
            Err(GatewayError::DuplicateName(_)) if stmt.if_not_exists => Ok(ExecutionResult::Ok),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn drop_database(&self, stmt: &DropDatabaseStatement, ctx: &ExecutionContext) -> GatewayResult<ExecutionResult> {
        match self.registry.remove(ctx.tenant(), &stmt.name) {
            Ok(()) => Ok(ExecutionResult::Ok),
            Err(GatewayError::NotFound(_)) if stmt.if_exists => Ok(ExecutionResult::Ok),
            Err(GatewayError::NotFound(_)) => Err(GatewayError::unknown_database(&stmt.name)),
            Err(e) => Err(e),
        }
    }

    /// Only uploaded file tables can be dropped.
    pub(crate) fn drop_table(&self, stmt: &DropTableStatement, ctx: &ExecutionContext) -> GatewayResult<ExecutionResult> {
        let db = stmt.database.as_deref().unwrap_or(ctx.database());
        let source = self.registry.require(ctx.tenant(), db)?;
        if source.kind != DataSourceKind::Files {
            return Err(GatewayError::NotSupported(format!(
                "DROP TABLE in {} database '{}'",
                source.kind, source.name
            )));
        }
        match self.files.delete(ctx.tenant(), &stmt.table) {
            Ok(()) => Ok(ExecutionResult::Ok),
            Err(GatewayError::NotFound(_)) if stmt.if_exists => Ok(ExecutionResult::Ok),
            Err(GatewayError::NotFound(_)) => Err(GatewayError::unknown_table(&source.name, &stmt.table)),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn create_project(&self, stmt: &CreateProjectStatement, ctx: &ExecutionContext) -> GatewayResult<ExecutionResult> {
        match self.registry.create_project(ctx.tenant(), &stmt.name) {
            Ok(_) => Ok(ExecutionResult::Ok),
            Err(GatewayError::DuplicateName(_)) if stmt.if_not_exists => Ok(ExecutionResult::Ok),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn drop_project(&self, stmt: &DropProjectStatement, ctx: &ExecutionContext) -> GatewayResult<ExecutionResult> {
        match self.registry.drop_project(ctx.tenant(), &stmt.name) {
            Ok(()) => Ok(ExecutionResult::Ok),
            Err(GatewayError::NotFound(_)) if stmt.if_exists => Ok(ExecutionResult::Ok),
            Err(e) => Err(e),
        }
    }
}
