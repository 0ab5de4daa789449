// FedSQL Server entrypoint
//!
//! Initialization, middleware wiring and graceful shutdown live in
//! `lifecycle` so this file remains a thin orchestrator.

use std::env;
use std::time::Instant;

use anyhow::Result;
use fedsql_configs::ServerConfig;
use fedsql_server::lifecycle::{bootstrap, run};
use fedsql_server::logging;
use log::info;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[actix_web::main]
async fn main() -> Result<()> {
    let main_start = Instant::now();

    // Config path: first argument, then FEDSQL_CONFIG, then ./config.toml
    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("FEDSQL_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = match ServerConfig::load_or_default(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("FATAL: invalid configuration in {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    // Logging before any other side effects
    let server_log_path = format!("{}/server.log", config.logging.logs_path);
    logging::init_logging(
        &config.logging.level,
        &server_log_path,
        config.logging.log_to_console,
        Some(&config.logging.targets),
        &config.logging.format,
    )?;

    info!("FedSQL Server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Host: {}  Port: {}  Environment: {}",
        config.server.host, config.server.port, config.server.environment
    );

    let components = bootstrap(&config).await?;

    // Run HTTP server until termination signal is received
    run(&config, components, main_start).await
}
