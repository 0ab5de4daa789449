//! Server lifecycle management helpers.
//!
//! Bootstraps the shared services, wires the HTTP server and coordinates
//! graceful shutdown.

use std::sync::Arc;
use std::time::Instant;

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use fedsql_auth::AuthManager;
use fedsql_configs::defaults::resolve_workers;
use fedsql_configs::ServerConfig;
use fedsql_core::AppContext;
use log::{debug, info, warn};

use crate::middleware;

/// Services shared by every HTTP worker.
#[derive(Clone)]
pub struct ApplicationComponents {
    pub app_context: Arc<AppContext>,
    pub auth: web::Data<AuthManager>,
}

impl std::fmt::Debug for ApplicationComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationComponents")
            .field("app_context", &self.app_context)
            .field("http_auth_enabled", &self.auth.is_enabled())
            .finish()
    }
}

/// Build the application context and the auth manager from configuration.
pub async fn bootstrap(config: &ServerConfig) -> Result<ApplicationComponents> {
    let phase_start = Instant::now();

    let app_context = AppContext::init(config.clone());
    debug!(
        "AppContext initialized ({:.2}ms)",
        phase_start.elapsed().as_secs_f64() * 1000.0
    );

    let auth = AuthManager::from_settings(&config.auth)
        .await
        .map_err(|e| anyhow::anyhow!("Invalid [auth] configuration: {}", e))?;
    if auth.is_enabled() {
        info!("HTTP auth enabled for user '{}'", auth.status().username);
    } else {
        warn!("HTTP auth is DISABLED - every client can use the protected API");
    }

    info!(
        "Bootstrap complete in {:.2}ms",
        phase_start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(ApplicationComponents {
        app_context,
        auth: web::Data::new(auth),
    })
}

/// Register shared state and the API routes. Used by the server and by tests.
pub fn configure(cfg: &mut web::ServiceConfig, components: &ApplicationComponents) {
    cfg.app_data(web::Data::new(Arc::clone(&components.app_context)))
        .app_data(components.auth.clone());
    fedsql_api::configure_routes(cfg, components.app_context.config());
}

/// Start the HTTP server and manage graceful shutdown.
pub async fn run(config: &ServerConfig, components: ApplicationComponents, main_start: Instant) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let workers = resolve_workers(config.server.workers);
    info!("Starting HTTP server on {}", bind_addr);
    debug!(
        "Endpoints under {}: /sql/query, /status, /config, /tree, /files, /projects, /tabs",
        config.server.api_prefix
    );
    info!(
        "Server config: workers={}, body_limit={}KB, max_file_size={}MB, max_result_rows={}",
        workers,
        config.limits.max_request_body_bytes / 1024,
        config.files.max_size_bytes / (1024 * 1024),
        config.limits.max_result_rows
    );

    let app_context = Arc::clone(&components.app_context);
    let server_config = config.clone();

    let server = HttpServer::new(move || {
        let components = components.clone();
        App::new()
            .wrap(middleware::request_logger(&server_config.server.api_prefix))
            .wrap(middleware::build_cors_from_config(&server_config))
            .configure(move |cfg| configure(cfg, &components))
    })
    .workers(workers)
    .bind(&bind_addr)?;

    info!("Server started in {:.2}ms", main_start.elapsed().as_secs_f64() * 1000.0);

    let server = server.run();
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(Err(e)) => log::error!("Server failed: {}", e),
                Err(e) => log::error!("Server task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown...");

            // Stop accepting new HTTP connections
            server_handle.stop(true).await;

            // Training jobs are in memory only; abort what is still running
            app_context.shutdown();

            debug!("Graceful shutdown complete");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    #[actix_web::test]
    async fn test_bootstrap_applies_auth_settings() {
        let mut config = ServerConfig::default();
        config.auth.http_auth_enabled = true;
        config.auth.username = "admin".to_string();
        config.auth.password = "secret".to_string();
        config.auth.bcrypt_cost = 4;

        let components = bootstrap(&config).await.unwrap();
        assert!(components.auth.is_enabled());

        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &components))).await;
        let req = test::TestRequest::get().uri("/api/tabs/").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);
    }

    #[actix_web::test]
    async fn test_bootstrap_rejects_enabled_auth_without_password() {
        let mut config = ServerConfig::default();
        config.auth.http_auth_enabled = true;
        config.auth.username = "admin".to_string();
        config.auth.password = String::new();
        assert!(bootstrap(&config).await.is_err());
    }
}
