use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fedsql_commons::{BuiltinDatabase, TenantId};
use serde::Serialize;

use crate::connectors::ExternalConnector;
use crate::files::FileTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    InformationSchema,
    Files,
    Project,
    External,
}

impl DataSourceKind {
    /// Short class name used by the tree view.
    pub fn class(&self) -> &'static str {
        match self {
            DataSourceKind::InformationSchema | DataSourceKind::Files => "table",
            DataSourceKind::Project => "project",
            DataSourceKind::External => "integration",
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataSourceKind::InformationSchema => "information_schema",
            DataSourceKind::Files => "files",
            DataSourceKind::Project => "project",
            DataSourceKind::External => "external",
        })
    }
}

/// A named database as seen by SQL.
pub struct DataSource {
    pub tenant: TenantId,
    pub name: String,
    pub kind: DataSourceKind,
    pub engine: Option<String>,
    pub parameters: serde_json::Value,
    pub connector: Option<Arc<dyn ExternalConnector>>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("tenant", &self.tenant)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl DataSource {
    pub fn builtin(tenant: &TenantId, builtin: BuiltinDatabase) -> Self {
        let kind = match builtin {
            BuiltinDatabase::InformationSchema => DataSourceKind::InformationSchema,
            BuiltinDatabase::Files => DataSourceKind::Files,
            BuiltinDatabase::DefaultProject => DataSourceKind::Project,
        };
        Self {
            tenant: tenant.clone(),
            name: builtin.name().to_string(),
            kind,
            engine: None,
            parameters: serde_json::Value::Null,
            connector: None,
            created_at: DateTime::<Utc>::default(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        BuiltinDatabase::from_name(&self.name).is_some()
    }

    pub fn info(&self) -> DataSourceInfo {
        DataSourceInfo {
            name: self.name.clone(),
            class: self.kind.class(),
            kind: self.kind,
            engine: self.engine.clone(),
            deletable: !self.is_builtin(),
        }
    }
}

/// Serializable view. Connection parameters are never exposed.
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceInfo {
    pub name: String,
    pub class: &'static str,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    pub engine: Option<String>,
    pub deletable: bool,
}

/// Tables of `information_schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoSchemaTable {
    Schemata,
    Tables,
    Columns,
    Engines,
}

impl InfoSchemaTable {
    pub const ALL: [InfoSchemaTable; 4] = [
        InfoSchemaTable::Schemata,
        InfoSchemaTable::Tables,
        InfoSchemaTable::Columns,
        InfoSchemaTable::Engines,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InfoSchemaTable::Schemata => "SCHEMATA",
            InfoSchemaTable::Tables => "TABLES",
            InfoSchemaTable::Columns => "COLUMNS",
            InfoSchemaTable::Engines => "ENGINES",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

/// System tables every project carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectTable {
    Models,
    ModelsVersions,
}

/// What a `db.table` reference resolved to.
#[derive(Clone)]
pub enum TableSource {
    File(Arc<FileTable>),
    External {
        source: Arc<DataSource>,
        table: String,
    },
    Predictor {
        project: String,
        name: String,
        version: Option<u32>,
    },
    ProjectSystem {
        project: String,
        table: ProjectTable,
    },
    InformationSchema(InfoSchemaTable),
}

impl fmt::Debug for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::File(t) => write!(f, "File({})", t.name),
            TableSource::External { source, table } => write!(f, "External({}.{})", source.name, table),
            TableSource::Predictor { project, name, version } => {
                write!(f, "Predictor({}.{}, {:?})", project, name, version)
            }
            TableSource::ProjectSystem { project, table } => write!(f, "ProjectSystem({}, {:?})", project, table),
            TableSource::InformationSchema(t) => write!(f, "InformationSchema({})", t.name()),
        }
    }
}

/// Entry of `SHOW FULL TABLES`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub table_type: &'static str,
}

pub const BASE_TABLE: &str = "BASE TABLE";
pub const SYSTEM_VIEW: &str = "SYSTEM VIEW";
pub const MODEL_TABLE: &str = "MODEL";
