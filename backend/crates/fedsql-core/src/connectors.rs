//! Seams for external relational engines.
//!
//! The gateway does not ship wire drivers. A [`ConnectorFactory`] decides
//! which engine kinds can be registered and builds an [`ExternalConnector`]
//! per data source; the default factory accepts the known engine kinds and
//! returns connectors that report the missing driver when queried.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{GatewayError, GatewayResult};
use crate::result::TableData;

/// Engine kinds accepted by `CREATE DATABASE ... WITH ENGINE`.
pub const KNOWN_ENGINES: &[(&str, &str)] = &[
    ("postgres", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("mariadb", "MariaDB"),
];

/// Live handle to one external database.
#[async_trait]
pub trait ExternalConnector: Send + Sync {
    /// Table names visible in the database.
    async fn tables(&self) -> GatewayResult<Vec<String>>;

    /// Full contents of `table`, optionally capped at `limit` rows.
    async fn scan(&self, table: &str, limit: Option<usize>) -> GatewayResult<TableData>;

    /// Column names of `table`.
    async fn describe(&self, table: &str) -> GatewayResult<Vec<String>> {
        Ok(self.scan(table, Some(0)).await?.columns)
    }
}

pub trait ConnectorFactory: Send + Sync {
    /// `(engine, description)` pairs this factory accepts.
    fn engines(&self) -> Vec<(String, String)>;

    /// Validate `parameters` and build a connector for `engine`.
    fn create(
        &self,
        engine: &str,
        parameters: &serde_json::Value,
    ) -> GatewayResult<Arc<dyn ExternalConnector>>;

    fn supports(&self, engine: &str) -> bool {
        self.engines().iter().any(|(e, _)| e.eq_ignore_ascii_case(engine))
    }
}

/// Accepts the known engine kinds without a driver behind them.
#[derive(Debug, Default, Clone)]
pub struct DriverlessConnectorFactory;

impl ConnectorFactory for DriverlessConnectorFactory {
    fn engines(&self) -> Vec<(String, String)> {
        KNOWN_ENGINES
            .iter()
            .map(|(e, d)| (e.to_string(), d.to_string()))
            .collect()
    }

    fn create(
        &self,
        engine: &str,
        parameters: &serde_json::Value,
    ) -> GatewayResult<Arc<dyn ExternalConnector>> {
        if !self.supports(engine) {
            return Err(GatewayError::Validation(format!("Unknown engine '{}'", engine)));
        }
        validate_parameters(parameters)?;
        Ok(Arc::new(DriverlessConnector {
            engine: engine.to_lowercase(),
        }))
    }
}

/// Connection parameters must be a JSON object of scalars.
pub fn validate_parameters(parameters: &serde_json::Value) -> GatewayResult<()> {
    let map = parameters
        .as_object()
        .ok_or_else(|| GatewayError::Validation("PARAMETERS must be a JSON object".to_string()))?;
    if let Some((key, _)) = map.iter().find(|(_, v)| v.is_array()) {
        return Err(GatewayError::Validation(format!(
            "Parameter '{}' must be a scalar or object",
            key
        )));
    }
    Ok(())
}

struct DriverlessConnector {
    engine: String,
}

#[async_trait]
impl ExternalConnector for DriverlessConnector {
    async fn tables(&self) -> GatewayResult<Vec<String>> {
        Err(self.unavailable())
    }

    async fn scan(&self, _table: &str, _limit: Option<usize>) -> GatewayResult<TableData> {
        Err(self.unavailable())
    }
}

impl DriverlessConnector {
    fn unavailable(&self) -> GatewayError {
        GatewayError::Engine(format!("no driver available for engine '{}'", self.engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driverless_factory_accepts_known_engines() {
        let factory = DriverlessConnectorFactory;
        for engine in ["postgres", "MySQL", "mariadb"] {
            assert!(factory.create(engine, &serde_json::json!({"host": "h"})).is_ok(), "{}", engine);
        }
        assert!(matches!(
            factory.create("oracle", &serde_json::json!({})),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_parameters_must_be_object() {
        assert!(validate_parameters(&serde_json::json!([1])).is_err());
        assert!(validate_parameters(&serde_json::json!({"hosts": ["a"]})).is_err());
        assert!(validate_parameters(&serde_json::json!({"port": 5432})).is_ok());
    }

    #[tokio::test]
    async fn test_driverless_connector_reports_engine_error() {
        let connector = DriverlessConnectorFactory
            .create("postgres", &serde_json::json!({}))
            .unwrap();
        assert!(matches!(connector.tables().await, Err(GatewayError::Engine(_))));
    }
}
