//! Data source registry.
//!
//! Maps `(tenant, database)` to a [`DataSource`] and `db.table` references to
//! a [`TableSource`]. The built-in databases are synthesized per tenant and
//! never stored; projects and external sources live in a `DashMap` whose
//! entry lock serializes create and drop of the same name.

mod data_source;
mod information_schema;

use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fedsql_commons::{BuiltinDatabase, NameKey, TenantId};

pub use data_source::{
    DataSource, DataSourceInfo, DataSourceKind, InfoSchemaTable, ProjectTable, TableEntry, TableSource,
    BASE_TABLE, MODEL_TABLE, SYSTEM_VIEW,
};

use crate::connectors::ConnectorFactory;
use crate::error::{GatewayError, GatewayResult};
use crate::files::FileTableStore;
use crate::predictors::{PredictorManager, MODELS_COLUMNS, MODELS_TABLE, MODELS_VERSIONS_COLUMNS, MODELS_VERSIONS_TABLE};
use crate::result::TableData;

pub struct DataSourceRegistry {
    sources: DashMap<NameKey, Arc<DataSource>>,
    files: Arc<FileTableStore>,
    predictors: Arc<PredictorManager>,
    connectors: Arc<dyn ConnectorFactory>,
}

impl DataSourceRegistry {
    pub fn new(
        files: Arc<FileTableStore>,
        predictors: Arc<PredictorManager>,
        connectors: Arc<dyn ConnectorFactory>,
    ) -> Self {
        Self {
            sources: DashMap::new(),
            files,
            predictors,
            connectors,
        }
    }

    /// `(engine, description)` pairs accepted by `CREATE DATABASE`.
    pub fn engines(&self) -> Vec<(String, String)> {
        self.connectors.engines()
    }

    /// Register an external database.
    pub fn register(
        &self,
        tenant: &TenantId,
        name: &str,
        engine: &str,
        parameters: serde_json::Value,
    ) -> GatewayResult<Arc<DataSource>> {
        validate_name(name)?;
        if BuiltinDatabase::from_name(name).is_some() {
            return Err(GatewayError::DuplicateName(format!("database '{}'", name)));
        }
        let connector = self.connectors.create(engine, &parameters)?;

        match self.sources.entry(NameKey::new(tenant, name)) {
            Entry::Occupied(_) => Err(GatewayError::DuplicateName(format!("database '{}'", name))),
            Entry::Vacant(vacant) => {
                let source = Arc::new(DataSource {
                    tenant: tenant.clone(),
                    name: name.to_string(),
                    kind: DataSourceKind::External,
                    engine: Some(engine.to_lowercase()),
                    parameters,
                    connector: Some(connector),
                    created_at: Utc::now(),
                });
                vacant.insert(Arc::clone(&source));
                log::info!("Registered {} database '{}' for tenant {}", engine, name, tenant);
                Ok(source)
            }
        }
    }

    pub fn create_project(&self, tenant: &TenantId, name: &str) -> GatewayResult<Arc<DataSource>> {
        validate_name(name)?;
        if BuiltinDatabase::from_name(name).is_some() {
            return Err(GatewayError::DuplicateName(format!("project '{}'", name)));
        }
        match self.sources.entry(NameKey::new(tenant, name)) {
            Entry::Occupied(_) => Err(GatewayError::DuplicateName(format!("project '{}'", name))),
            Entry::Vacant(vacant) => {
                let source = Arc::new(DataSource {
                    tenant: tenant.clone(),
                    name: name.to_string(),
                    kind: DataSourceKind::Project,
                    engine: None,
                    parameters: serde_json::Value::Null,
                    connector: None,
                    created_at: Utc::now(),
                });
                vacant.insert(Arc::clone(&source));
                log::info!("Created project '{}' for tenant {}", name, tenant);
                Ok(source)
            }
        }
    }

    /// Drop a project together with its predictors.
    pub fn drop_project(&self, tenant: &TenantId, name: &str) -> GatewayResult<()> {
        match self.get(tenant, name) {
            Some(source) if source.kind == DataSourceKind::Project => self.remove(tenant, name),
            Some(_) => Err(GatewayError::Validation(format!("'{}' is not a project", name))),
            None => Err(GatewayError::NotFound(format!("project '{}'", name))),
        }
    }

    /// Drop any non-built-in database.
    pub fn remove(&self, tenant: &TenantId, name: &str) -> GatewayResult<()> {
        if BuiltinDatabase::from_name(name).is_some() {
            return Err(GatewayError::Forbidden(format!(
                "database '{}' is built in and cannot be dropped",
                name
            )));
        }
        let (_, source) = self
            .sources
            .remove(&NameKey::new(tenant, name))
            .ok_or_else(|| GatewayError::NotFound(format!("database '{}'", name)))?;
        if source.kind == DataSourceKind::Project {
            let dropped = self.predictors.drop_project(tenant, &source.name);
            log::info!("Dropped project '{}' with {} models", source.name, dropped);
        } else {
            log::info!("Dropped database '{}' for tenant {}", source.name, tenant);
        }
        Ok(())
    }

    /// Case-insensitive lookup, built-ins included.
    pub fn get(&self, tenant: &TenantId, name: &str) -> Option<Arc<DataSource>> {
        if let Some(builtin) = BuiltinDatabase::from_name(name) {
            return Some(Arc::new(DataSource::builtin(tenant, builtin)));
        }
        self.sources
            .get(&NameKey::new(tenant, name))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn exists(&self, tenant: &TenantId, name: &str) -> bool {
        self.get(tenant, name).is_some()
    }

    /// Lookup that fails with `UnknownDatabase`.
    pub fn require(&self, tenant: &TenantId, name: &str) -> GatewayResult<Arc<DataSource>> {
        self.get(tenant, name)
            .ok_or_else(|| GatewayError::unknown_database(name))
    }

    /// Every database of `tenant`, sorted case-insensitively.
    pub fn list(&self, tenant: &TenantId) -> Vec<Arc<DataSource>> {
        let mut sources: Vec<Arc<DataSource>> = BuiltinDatabase::ALL
            .iter()
            .map(|b| Arc::new(DataSource::builtin(tenant, *b)))
            .collect();
        sources.extend(
            self.sources
                .iter()
                .filter(|e| e.key().belongs_to(tenant))
                .map(|e| Arc::clone(e.value())),
        );
        sources.sort_by_key(|s| s.name.to_lowercase());
        sources.dedup_by_key(|s| s.name.to_lowercase());
        sources
    }

    /// Projects of `tenant`, the default project included.
    pub fn projects(&self, tenant: &TenantId) -> Vec<Arc<DataSource>> {
        self.list(tenant)
            .into_iter()
            .filter(|s| s.kind == DataSourceKind::Project)
            .collect()
    }

    /// Project lookup that fails with `NotFound` for unknown or non-project names.
    pub fn require_project(&self, tenant: &TenantId, name: &str) -> GatewayResult<Arc<DataSource>> {
        self.get(tenant, name)
            .filter(|s| s.kind == DataSourceKind::Project)
            .ok_or_else(|| GatewayError::NotFound(format!("project '{}'", name)))
    }

    /// Resolve `db.table`.
    pub fn resolve(&self, tenant: &TenantId, db: &str, table: &str) -> GatewayResult<TableSource> {
        let source = self.require(tenant, db)?;
        match source.kind {
            DataSourceKind::InformationSchema => InfoSchemaTable::from_name(table)
                .map(TableSource::InformationSchema)
                .ok_or_else(|| GatewayError::unknown_table(&source.name, table)),
            DataSourceKind::Files => self
                .files
                .get(tenant, table)
                .map(TableSource::File)
                .ok_or_else(|| GatewayError::unknown_table(&source.name, table)),
            DataSourceKind::Project => {
                let project = source.name.clone();
                if table.eq_ignore_ascii_case(MODELS_TABLE) {
                    Ok(TableSource::ProjectSystem {
                        project,
                        table: ProjectTable::Models,
                    })
                } else if table.eq_ignore_ascii_case(MODELS_VERSIONS_TABLE) {
                    Ok(TableSource::ProjectSystem {
                        project,
                        table: ProjectTable::ModelsVersions,
                    })
                } else if self.predictors.exists(tenant, &project, table) {
                    Ok(TableSource::Predictor {
                        project,
                        name: table.to_string(),
                        version: None,
                    })
                } else {
                    Err(GatewayError::unknown_table(&source.name, table))
                }
            }
            DataSourceKind::External => Ok(TableSource::External {
                source,
                table: table.to_string(),
            }),
        }
    }

    /// Tables of `db`.
    pub async fn tables(&self, tenant: &TenantId, db: &str) -> GatewayResult<Vec<TableEntry>> {
        let source = self.require(tenant, db)?;
        let entries = match source.kind {
            DataSourceKind::InformationSchema => InfoSchemaTable::ALL
                .iter()
                .map(|t| TableEntry {
                    name: t.name().to_string(),
                    table_type: SYSTEM_VIEW,
                })
                .collect(),
            DataSourceKind::Files => self
                .files
                .table_names(tenant)
                .into_iter()
                .map(|name| TableEntry {
                    name,
                    table_type: BASE_TABLE,
                })
                .collect(),
            DataSourceKind::Project => {
                let mut entries = vec![
                    TableEntry {
                        name: MODELS_TABLE.to_string(),
                        table_type: BASE_TABLE,
                    },
                    TableEntry {
                        name: MODELS_VERSIONS_TABLE.to_string(),
                        table_type: BASE_TABLE,
                    },
                ];
                entries.extend(
                    self.predictors
                        .names(tenant, &source.name)
                        .into_iter()
                        .map(|name| TableEntry {
                            name,
                            table_type: MODEL_TABLE,
                        }),
                );
                entries
            }
            DataSourceKind::External => {
                let connector = external_connector(&source)?;
                connector
                    .tables()
                    .await?
                    .into_iter()
                    .map(|name| TableEntry {
                        name,
                        table_type: BASE_TABLE,
                    })
                    .collect()
            }
        };
        Ok(entries)
    }

    /// Read a resolved table. Predictors need input rows and are served by
    /// the executor instead.
    pub async fn scan(
        &self,
        tenant: &TenantId,
        source: &TableSource,
        limit: Option<usize>,
    ) -> GatewayResult<TableData> {
        match source {
            TableSource::File(table) => Ok(table.to_table_data(limit)),
            TableSource::External { source, table } => {
                external_connector(source)?.scan(table, limit).await
            }
            TableSource::ProjectSystem { project, table } => {
                let mut data = self.project_table(tenant, project, *table);
                if let Some(limit) = limit {
                    data.truncate(limit);
                }
                Ok(data)
            }
            TableSource::InformationSchema(table) => {
                let mut data = self.information_schema(tenant, *table).await;
                if let Some(limit) = limit {
                    data.truncate(limit);
                }
                Ok(data)
            }
            TableSource::Predictor { project, name, .. } => Err(GatewayError::Validation(format!(
                "model '{}.{}' must be queried with a WHERE condition or a JOIN",
                project, name
            ))),
        }
    }

    /// Column names of a resolved table.
    pub async fn describe(&self, tenant: &TenantId, source: &TableSource) -> GatewayResult<Vec<String>> {
        match source {
            TableSource::File(table) => Ok(table.columns.clone()),
            TableSource::External { source, table } => external_connector(source)?.describe(table).await,
            TableSource::ProjectSystem { table, .. } => Ok(project_columns(*table)),
            TableSource::InformationSchema(table) => Ok(information_schema::columns(*table)),
            TableSource::Predictor { project, name, version } => {
                let model = self.predictors.model(tenant, project, name, *version)?;
                let mut columns = model.features().to_vec();
                columns.extend(model.output_columns());
                Ok(columns)
            }
        }
    }

    fn project_table(&self, tenant: &TenantId, project: &str, table: ProjectTable) -> TableData {
        let (summaries, with_active) = match table {
            ProjectTable::Models => (self.predictors.summaries(tenant, Some(project)), false),
            ProjectTable::ModelsVersions => (self.predictors.version_summaries(tenant, Some(project)), true),
        };
        TableData::new(
            project_columns(table),
            summaries.iter().map(|s| s.to_row(with_active)).collect(),
        )
    }
}

fn project_columns(table: ProjectTable) -> Vec<String> {
    let columns = match table {
        ProjectTable::Models => MODELS_COLUMNS,
        ProjectTable::ModelsVersions => MODELS_VERSIONS_COLUMNS,
    };
    columns.iter().map(|c| c.to_string()).collect()
}

fn external_connector(source: &DataSource) -> GatewayResult<Arc<dyn crate::connectors::ExternalConnector>> {
    source
        .connector
        .clone()
        .ok_or_else(|| GatewayError::Internal(format!("database '{}' has no connector", source.name)))
}

/// Database and project names: ASCII letters, digits and underscores.
fn validate_name(name: &str) -> GatewayResult<()> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(GatewayError::Validation(format!("Invalid database name '{}'", name)))
    }
}
