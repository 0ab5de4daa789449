//! Predictor handlers: CREATE PREDICTOR, RETRAIN, DROP PREDICTOR.
//!
//! The training query runs here, through the regular SELECT path, and the
//! resulting rows are handed to the [`PredictorManager`](crate::predictors::PredictorManager),
//! which trains in the background and returns immediately.

use fedsql_commons::DEFAULT_PROJECT;
use fedsql_sql::ddl::{CreatePredictorStatement, DropPredictorStatement, RetrainPredictorStatement};
use fedsql_sql::parser::parse_query;

use crate::error::{GatewayError, GatewayResult};
use crate::predictors::{PredictorSummary, TrainingSpec, MODELS_COLUMNS};
use crate::registry::DataSourceKind;
use crate::result::{ExecutionResult, TableData};
use crate::sql::executor::SqlExecutor;
use crate::sql::ExecutionContext;

impl SqlExecutor {
    /// Explicit project, else the active database when it is a project,
    /// else the default project.
    fn target_project(&self, explicit: Option<&str>, ctx: &ExecutionContext) -> GatewayResult<String> {
        if let Some(project) = explicit {
            return Ok(self.registry.require_project(ctx.tenant(), project)?.name.clone());
        }
        match self.registry.get(ctx.tenant(), ctx.database()) {
            Some(source) if source.kind == DataSourceKind::Project => Ok(source.name.clone()),
            _ => Ok(DEFAULT_PROJECT.to_string()),
        }
    }

    async fn training_data(&self, spec: &TrainingSpec, ctx: &ExecutionContext) -> GatewayResult<TableData> {
        let source = self.registry.require(ctx.tenant(), &spec.source_database)?;
        let query = parse_query(&spec.select_query).map_err(GatewayError::invalid_sql)?;
        self.select(&query, &ctx.for_database(source.name.clone())).await
    }

    pub(crate) async fn create_predictor(
        &self,
        stmt: CreatePredictorStatement,
        ctx: &ExecutionContext,
    ) -> GatewayResult<ExecutionResult> {
        let project = self.target_project(stmt.project.as_deref(), ctx)?;
        if self.predictors.exists(ctx.tenant(), &project, &stmt.name) {
            if stmt.if_not_exists {
                return Ok(ExecutionResult::Ok);
            }
            return Err(GatewayError::DuplicateName(format!("model '{}.{}'", project, stmt.name)));
        }

        let spec = TrainingSpec {
            source_database: stmt.source_database,
            select_query: stmt.select_query,
            target: stmt.target,
            options: stmt.options,
        };
        let data = self.training_data(&spec, ctx).await?;
        // The project may have been dropped while the training query ran
        let registry = &self.registry;
        let summary = self.predictors.create(ctx.tenant(), &project, &stmt.name, spec, data, || {
            registry.require_project(ctx.tenant(), &project).is_ok()
        })?;
        Ok(ExecutionResult::Table(model_row(&summary)))
    }

    pub(crate) async fn retrain_predictor(
        &self,
        stmt: &RetrainPredictorStatement,
        ctx: &ExecutionContext,
    ) -> GatewayResult<ExecutionResult> {
        let project = self.target_project(stmt.project.as_deref(), ctx)?;
        let spec = self.predictors.training_spec(ctx.tenant(), &project, &stmt.name)?;
        let data = self.training_data(&spec, ctx).await?;
        let summary = self
            .predictors
            .retrain(ctx.tenant(), &project, &stmt.name, spec, data)?;
        Ok(ExecutionResult::Table(model_row(&summary)))
    }

    pub(crate) fn drop_predictor(
        &self,
        stmt: &DropPredictorStatement,
        ctx: &ExecutionContext,
    ) -> GatewayResult<ExecutionResult> {
        let project = match self.target_project(stmt.project.as_deref(), ctx) {
            Ok(project) => project,
            Err(GatewayError::NotFound(_)) if stmt.if_exists => return Ok(ExecutionResult::Ok),
            Err(e) => return Err(e),
        };
        match self.predictors.drop_predictor(ctx.tenant(), &project, &stmt.name) {
            Ok(()) => Ok(ExecutionResult::Ok),
            Err(GatewayError::NotFound(_)) if stmt.if_exists => Ok(ExecutionResult::Ok),
            Err(e) => Err(e),
        }
    }
}

fn model_row(summary: &PredictorSummary) -> TableData {
    TableData::new(
        MODELS_COLUMNS.iter().map(|c| c.to_string()).collect(),
        vec![summary.to_row(false)],
    )
}
