use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fedsql_commons::{TenantId, Value};
use serde::Serialize;

use super::model::TrainedModel;

/// System table listing one row per predictor.
pub const MODELS_TABLE: &str = "models";

/// System table listing one row per predictor version.
pub const MODELS_VERSIONS_TABLE: &str = "models_versions";

pub const MODELS_COLUMNS: &[&str] = &[
    "name",
    "project",
    "version",
    "status",
    "predict",
    "accuracy",
    "error",
    "select_data_query",
    "training_rows",
];

pub const MODELS_VERSIONS_COLUMNS: &[&str] = &[
    "name",
    "project",
    "version",
    "status",
    "predict",
    "accuracy",
    "error",
    "select_data_query",
    "training_rows",
    "active",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorStatus {
    Generating,
    Training,
    Complete,
    Error,
}

impl PredictorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictorStatus::Generating => "generating",
            PredictorStatus::Training => "training",
            PredictorStatus::Complete => "complete",
            PredictorStatus::Error => "error",
        }
    }
}

impl fmt::Display for PredictorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map key. Project and name are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredictorKey {
    pub tenant: TenantId,
    pub project: String,
    pub name: String,
}

impl PredictorKey {
    pub fn new(tenant: &TenantId, project: &str, name: &str) -> Self {
        Self {
            tenant: tenant.clone(),
            project: project.to_lowercase(),
            name: name.to_lowercase(),
        }
    }
}

/// Everything needed to (re)run training.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSpec {
    pub source_database: String,
    pub select_query: String,
    pub target: String,
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct PredictorVersion {
    pub version: u32,
    /// Job training this version. Status updates from any other job are ignored.
    pub job_id: String,
    pub status: PredictorStatus,
    pub spec: TrainingSpec,
    pub features: Vec<String>,
    pub model: Option<Arc<TrainedModel>>,
    pub error: Option<String>,
    pub training_rows: usize,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl PredictorVersion {
    pub fn is_complete(&self) -> bool {
        self.status == PredictorStatus::Complete
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, PredictorStatus::Generating | PredictorStatus::Training)
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.model.as_ref().map(|m| m.accuracy())
    }
}

#[derive(Debug, Clone)]
pub struct PredictorRecord {
    pub project: String,
    pub name: String,
    /// Ascending by version number
    pub versions: Vec<PredictorVersion>,
}

impl PredictorRecord {
    pub fn latest(&self) -> Option<&PredictorVersion> {
        self.versions.last()
    }

    pub fn latest_complete(&self) -> Option<&PredictorVersion> {
        self.versions.iter().rev().find(|v| v.is_complete())
    }

    pub fn version(&self, version: u32) -> Option<&PredictorVersion> {
        self.versions.iter().find(|v| v.version == version)
    }

    pub fn version_mut(&mut self, version: u32) -> Option<&mut PredictorVersion> {
        self.versions.iter_mut().find(|v| v.version == version)
    }

    pub fn next_version(&self) -> u32 {
        self.versions.iter().map(|v| v.version).max().unwrap_or(0) + 1
    }

    /// Version the unversioned name refers to: latest complete, else latest.
    pub fn active(&self) -> Option<&PredictorVersion> {
        self.latest_complete().or_else(|| self.latest())
    }

    pub fn summary(&self, version: &PredictorVersion) -> PredictorSummary {
        PredictorSummary {
            name: self.name.clone(),
            project: self.project.clone(),
            version: version.version,
            status: version.status,
            predict: version.spec.target.clone(),
            accuracy: version.accuracy(),
            error: version.error.clone(),
            select_data_query: version.spec.select_query.clone(),
            training_rows: version.training_rows,
            active: self.active().map(|a| a.version) == Some(version.version),
            created_at: version.created_at,
        }
    }
}

/// One row of `models` / `models_versions`, also the REST model shape.
#[derive(Debug, Clone, Serialize)]
pub struct PredictorSummary {
    pub name: String,
    pub project: String,
    pub version: u32,
    pub status: PredictorStatus,
    pub predict: String,
    pub accuracy: Option<f64>,
    pub error: Option<String>,
    pub select_data_query: String,
    pub training_rows: usize,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl PredictorSummary {
    pub fn to_row(&self, with_active: bool) -> Vec<Value> {
        let mut row = vec![
            Value::from(self.name.as_str()),
            Value::from(self.project.as_str()),
            Value::Int(self.version as i64),
            Value::from(self.status.as_str()),
            Value::from(self.predict.as_str()),
            self.accuracy.map(Value::Float).unwrap_or(Value::Null),
            Value::from(self.error.clone()),
            Value::from(self.select_data_query.as_str()),
            Value::Int(self.training_rows as i64),
        ];
        if with_active {
            row.push(Value::Bool(self.active));
        }
        row
    }
}
