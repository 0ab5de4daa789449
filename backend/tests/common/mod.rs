#![allow(dead_code)]
//! Common utilities for FedSQL server integration tests.
//!
//! [`TestServer`] bootstraps the same components `main` does and
//! [`init_app!`] mounts them on an in-process actix service, so tests drive
//! the full HTTP stack without binding a port.
//!
//! ```no_run
//! #[macro_use]
//! mod common;
//!
//! #[actix_web::test]
//! async fn test_example() {
//!     let server = common::TestServer::new().await;
//!     let app = init_app!(server);
//!     let (status, body) = sql!(app, "select 1");
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{test, web};
use async_trait::async_trait;
use fedsql_auth::AuthManager;
use fedsql_commons::{TenantId, Value};
use fedsql_configs::ServerConfig;
use fedsql_core::connectors::{ConnectorFactory, ExternalConnector, KNOWN_ENGINES};
use fedsql_core::predictors::BaselineTrainer;
use fedsql_core::{AppContext, GatewayError, GatewayResult, TableData};
use fedsql_server::lifecycle::{bootstrap, ApplicationComponents};
use serde_json::json;

pub const BOUNDARY: &str = "----fedsqlintegrationboundary";

/// Mount the server's routes and shared state on a test service.
macro_rules! init_app {
    ($server:expr) => {{
        let components = $server.components.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(move |cfg| fedsql_server::lifecycle::configure(cfg, &components)),
        )
        .await
    }};
}

/// POST a query and read the envelope back.
macro_rules! sql {
    ($app:expr, $query:expr) => {
        sql!($app, $query, None::<&str>)
    };
    ($app:expr, $query:expr, $db:expr) => {{
        let req = $crate::common::sql_request($query, $db).to_request();
        let res = actix_web::test::call_service(&$app, req).await;
        let status = res.status();
        let body: serde_json::Value = actix_web::test::read_body_json(res).await;
        (status, body)
    }};
}

/// Default configuration with a cheap bcrypt cost.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.auth.bcrypt_cost = 4;
    config
}

/// Server components built the way `main` builds them.
pub struct TestServer {
    pub components: ApplicationComponents,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: ServerConfig) -> Self {
        let components = bootstrap(&config).await.expect("bootstrap test server");
        Self { components }
    }

    /// Components backed by [`StaticConnectorFactory`] so external
    /// databases answer with canned tables.
    pub async fn with_static_connectors() -> Self {
        let config = test_config();
        let auth = AuthManager::from_settings(&config.auth)
            .await
            .expect("auth manager");
        let app_context = Arc::new(AppContext::with_components(
            config,
            Arc::new(StaticConnectorFactory),
            Arc::new(BaselineTrainer),
        ));
        Self {
            components: ApplicationComponents {
                app_context,
                auth: web::Data::new(auth),
            },
        }
    }

    pub fn app_context(&self) -> &Arc<AppContext> {
        &self.components.app_context
    }

    /// Poll until the active version of `project.name` is trained.
    pub async fn wait_for_model(&self, tenant: &TenantId, project: &str, name: &str) {
        let predictors = self.app_context().predictors();
        for _ in 0..400 {
            if predictors.model(tenant, project, name, None).is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("model {}.{} never finished training", project, name);
    }
}

pub fn sql_request(query: &str, db: Option<&str>) -> test::TestRequest {
    let mut body = json!({ "query": query });
    if let Some(db) = db {
        body["context"] = json!({ "db": db });
    }
    test::TestRequest::post().uri("/api/sql/query").set_json(body)
}

/// Multipart upload of `content` as `files.<name>`.
pub fn upload_request(name: &str, filename: &str, content: &str) -> test::TestRequest {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = filename,
        c = content
    );
    test::TestRequest::put()
        .uri(&format!("/api/files/{}", name))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
}

pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|c| c.name() == "fedsql_session")
        .map(|c| c.into_owned())
}

/// 40 rows of synthetic rental listings. Price grows with size.
pub fn rentals_csv() -> String {
    let mut csv = String::from("sqft,location,neighborhood,rental_price\n");
    for i in 0..40 {
        let location = match i % 3 {
            0 => "good",
            1 => "great",
            _ => "poor",
        };
        csv.push_str(&format!(
            "{},{},n{},{}\n",
            300 + i * 25,
            location,
            i % 5,
            1000 + i * 60
        ));
    }
    csv
}

/// Column `name` of a table envelope as a list.
pub fn column(body: &serde_json::Value, name: &str) -> Vec<serde_json::Value> {
    let idx = body["column_names"]
        .as_array()
        .and_then(|cols| cols.iter().position(|c| c == name))
        .unwrap_or_else(|| panic!("no column {} in {}", name, body));
    body["data"]
        .as_array()
        .map(|rows| rows.iter().map(|r| r[idx].clone()).collect())
        .unwrap_or_default()
}

/// Accepts the known engines and serves a fixed `rentals` table.
pub struct StaticConnectorFactory;

impl ConnectorFactory for StaticConnectorFactory {
    fn engines(&self) -> Vec<(String, String)> {
        KNOWN_ENGINES
            .iter()
            .map(|(e, d)| (e.to_string(), d.to_string()))
            .collect()
    }

    fn create(&self, engine: &str, parameters: &serde_json::Value) -> GatewayResult<Arc<dyn ExternalConnector>> {
        if !self.supports(engine) {
            return Err(GatewayError::Validation(format!("Unknown engine '{}'", engine)));
        }
        fedsql_core::connectors::validate_parameters(parameters)?;
        Ok(Arc::new(StaticConnector))
    }
}

struct StaticConnector;

#[async_trait]
impl ExternalConnector for StaticConnector {
    async fn tables(&self) -> GatewayResult<Vec<String>> {
        Ok(vec!["rentals".to_string()])
    }

    async fn scan(&self, table: &str, limit: Option<usize>) -> GatewayResult<TableData> {
        if table != "rentals" {
            return Err(GatewayError::UnknownTable(table.to_string()));
        }
        let mut rows = vec![
            vec![Value::Int(450), Value::from("good"), Value::Int(1500)],
            vec![Value::Int(800), Value::from("great"), Value::Int(2600)],
            vec![Value::Int(1200), Value::from("poor"), Value::Int(2900)],
        ];
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(TableData::new(
            vec!["sqft".to_string(), "location".to_string(), "rental_price".to_string()],
            rows,
        ))
    }
}
