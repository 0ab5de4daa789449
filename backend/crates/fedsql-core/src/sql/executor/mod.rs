//! SQL executor.
//!
//! Classifies a statement, then routes it to its handler. Errors are
//! returned to the caller, which shapes them into the response envelope;
//! the active database in the [`ExecutionContext`] only changes on success.

pub mod handlers;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fedsql_sql::{classify, redact_sensitive_sql, SqlStatementKind};
use tracing::Instrument;

use super::ExecutionContext;
use crate::error::GatewayResult;
use crate::files::FileTableStore;
use crate::predictors::PredictorManager;
use crate::registry::DataSourceRegistry;
use crate::result::ExecutionResult;

pub struct SqlExecutor {
    registry: Arc<DataSourceRegistry>,
    files: Arc<FileTableStore>,
    predictors: Arc<PredictorManager>,
    max_result_rows: usize,
    started_at: DateTime<Utc>,
    statements: AtomicU64,
}

impl SqlExecutor {
    pub fn new(
        registry: Arc<DataSourceRegistry>,
        files: Arc<FileTableStore>,
        predictors: Arc<PredictorManager>,
        max_result_rows: usize,
    ) -> Self {
        Self {
            registry,
            files,
            predictors,
            max_result_rows,
            started_at: Utc::now(),
            statements: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<DataSourceRegistry> {
        &self.registry
    }

    /// Statements executed since start, for `SHOW STATUS`.
    pub fn statement_count(&self) -> u64 {
        self.statements.load(Ordering::Relaxed)
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// Execute one statement. `USE` updates `ctx` in place.
    pub async fn execute(&self, sql: &str, ctx: &mut ExecutionContext) -> GatewayResult<ExecutionResult> {
        let span = tracing::info_span!(
            "sql.execute",
            tenant = %ctx.tenant(),
            database = %ctx.database(),
            command = tracing::field::Empty,
            rows = tracing::field::Empty,
        );

        async {
            self.statements.fetch_add(1, Ordering::Relaxed);
            let statement = classify(sql)?;
            tracing::Span::current().record("command", statement.name());
            log::debug!("Executing {}: {}", statement.name(), redact_sensitive_sql(sql));

            let result = match statement.into_kind() {
                SqlStatementKind::Select(query) => ExecutionResult::Table(self.select(&query, ctx).await?),
                SqlStatementKind::Show(show) => ExecutionResult::Table(self.show(&show, ctx).await?),
                SqlStatementKind::Use(stmt) => {
                    let source = self.registry.require(ctx.tenant(), &stmt.database)?;
                    ctx.set_database(source.name.clone());
                    ExecutionResult::Ok
                }
                SqlStatementKind::Describe(stmt) => ExecutionResult::Table(self.describe(&stmt, ctx).await?),
                SqlStatementKind::CreateDatabase(stmt) => self.create_database(stmt, ctx)?,
                SqlStatementKind::DropDatabase(stmt) => self.drop_database(&stmt, ctx)?,
                SqlStatementKind::DropTable(stmt) => self.drop_table(&stmt, ctx)?,
                SqlStatementKind::CreateProject(stmt) => self.create_project(&stmt, ctx)?,
                SqlStatementKind::DropProject(stmt) => self.drop_project(&stmt, ctx)?,
                SqlStatementKind::CreatePredictor(stmt) => self.create_predictor(stmt, ctx).await?,
                SqlStatementKind::RetrainPredictor(stmt) => self.retrain_predictor(&stmt, ctx).await?,
                SqlStatementKind::DropPredictor(stmt) => self.drop_predictor(&stmt, ctx)?,
                SqlStatementKind::NoOp(_) => ExecutionResult::Ok,
            };

            if let ExecutionResult::Table(data) = &result {
                tracing::Span::current().record("rows", data.row_count());
            }
            Ok(result)
        }
        .instrument(span)
        .await
    }
}
