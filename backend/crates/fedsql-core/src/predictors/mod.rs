//! Predictors: trainable models exposed as versioned, queryable tables.
//!
//! Training is asynchronous. `create` and `retrain` record a new version in
//! `generating` state and return at once; a job moves it through `training`
//! to `complete` or `error`. Clients poll `models` for the status.

mod manager;
mod model;
mod types;

pub use manager::PredictorManager;
pub use model::{BaselineTrainer, TrainedModel, Trainer};
pub use types::{
    PredictorKey, PredictorRecord, PredictorStatus, PredictorSummary, PredictorVersion, TrainingSpec,
    MODELS_COLUMNS, MODELS_TABLE, MODELS_VERSIONS_COLUMNS, MODELS_VERSIONS_TABLE,
};

/// Split `name` or `name.version` as used by the REST predict route.
pub fn parse_versioned_name(raw: &str) -> (String, Option<u32>) {
    match raw.rsplit_once('.') {
        Some((name, version)) if !name.is_empty() => match version.parse::<u32>() {
            Ok(v) => (name.to_string(), Some(v)),
            Err(_) => (raw.to_string(), None),
        },
        _ => (raw.to_string(), None),
    }
}
