//! AppContext for the FedSQL gateway
//!
//! Owns every shared service. Built once at startup and handed to the HTTP
//! layer behind an `Arc`; tests build their own with [`AppContext::new_test`].

use std::sync::Arc;
use std::time::Instant;

use fedsql_configs::ServerConfig;

use crate::connectors::{ConnectorFactory, DriverlessConnectorFactory};
use crate::files::FileTableStore;
use crate::jobs::TokioJobManager;
use crate::predictors::{BaselineTrainer, PredictorManager, Trainer};
use crate::registry::DataSourceRegistry;
use crate::sql::SqlExecutor;
use crate::tabs::TabStore;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppContext {
    config: Arc<ServerConfig>,

    // ===== Stores =====
    files: Arc<FileTableStore>,
    tabs: Arc<TabStore>,

    // ===== Managers =====
    job_manager: Arc<TokioJobManager>,
    predictors: Arc<PredictorManager>,

    // ===== Registries =====
    registry: Arc<DataSourceRegistry>,

    sql_executor: Arc<SqlExecutor>,

    server_start_time: Instant,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("environment", &self.config.server.environment)
            .field("running_jobs", &self.job_manager.running_count())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire the services with the driverless connector factory and the
    /// baseline trainer.
    pub fn init(config: ServerConfig) -> Arc<Self> {
        Arc::new(Self::with_components(
            config,
            Arc::new(DriverlessConnectorFactory),
            Arc::new(BaselineTrainer),
        ))
    }

    pub fn with_components(
        config: ServerConfig,
        connectors: Arc<dyn ConnectorFactory>,
        trainer: Arc<dyn Trainer>,
    ) -> Self {
        let config = Arc::new(config);
        let files = Arc::new(FileTableStore::new(config.files.max_size_bytes));
        let job_manager = Arc::new(TokioJobManager::new(config.predictors.job_history_limit));
        let predictors = Arc::new(PredictorManager::new(
            Arc::clone(&job_manager),
            trainer,
            config.predictors.max_training_rows,
        ));
        let registry = Arc::new(DataSourceRegistry::new(
            Arc::clone(&files),
            Arc::clone(&predictors),
            connectors,
        ));
        let sql_executor = Arc::new(SqlExecutor::new(
            Arc::clone(&registry),
            Arc::clone(&files),
            Arc::clone(&predictors),
            config.limits.max_result_rows,
        ));

        log::debug!(
            "AppContext ready: max_result_rows={}, max_training_rows={}, max_file_bytes={}",
            config.limits.max_result_rows,
            config.predictors.max_training_rows,
            config.files.max_size_bytes
        );

        Self {
            config,
            files,
            tabs: Arc::new(TabStore::new()),
            job_manager,
            predictors,
            registry,
            sql_executor,
            server_start_time: Instant::now(),
        }
    }

    /// Default configuration, for tests.
    pub fn new_test() -> Arc<Self> {
        Self::init(ServerConfig::default())
    }

    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    pub fn files(&self) -> Arc<FileTableStore> {
        Arc::clone(&self.files)
    }

    pub fn tabs(&self) -> Arc<TabStore> {
        Arc::clone(&self.tabs)
    }

    pub fn job_manager(&self) -> Arc<TokioJobManager> {
        Arc::clone(&self.job_manager)
    }

    pub fn predictors(&self) -> Arc<PredictorManager> {
        Arc::clone(&self.predictors)
    }

    pub fn registry(&self) -> Arc<DataSourceRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn sql_executor(&self) -> Arc<SqlExecutor> {
        Arc::clone(&self.sql_executor)
    }

    pub fn server_version(&self) -> &'static str {
        SERVER_VERSION
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }

    /// Abort running training jobs.
    pub fn shutdown(&self) {
        let running = self.job_manager.running_count();
        if running > 0 {
            log::info!("Aborting {} running training job(s)", running);
        }
        self.job_manager.shutdown();
    }
}
