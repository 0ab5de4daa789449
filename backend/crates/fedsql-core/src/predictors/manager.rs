use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fedsql_commons::TenantId;

use super::model::{TrainedModel, Trainer};
use super::types::{
    PredictorKey, PredictorRecord, PredictorStatus, PredictorSummary, PredictorVersion, TrainingSpec,
};
use crate::error::{GatewayError, GatewayResult};
use crate::jobs::TokioJobManager;
use crate::result::TableData;

/// Owns every predictor and schedules their training.
pub struct PredictorManager {
    predictors: Arc<DashMap<PredictorKey, PredictorRecord>>,
    jobs: Arc<TokioJobManager>,
    trainer: Arc<dyn Trainer>,
    max_training_rows: usize,
}

impl PredictorManager {
    pub fn new(jobs: Arc<TokioJobManager>, trainer: Arc<dyn Trainer>, max_training_rows: usize) -> Self {
        Self {
            predictors: Arc::new(DashMap::new()),
            jobs,
            trainer,
            max_training_rows,
        }
    }

    /// Register version 1 of a new predictor and start training it.
    ///
    /// `data` is the already executed training query. `project_exists` is
    /// checked under the entry lock: a project dropped after that check sweeps
    /// the new record, one dropped before it fails the create.
    pub fn create(
        &self,
        tenant: &TenantId,
        project: &str,
        name: &str,
        spec: TrainingSpec,
        data: TableData,
        project_exists: impl FnOnce() -> bool,
    ) -> GatewayResult<PredictorSummary> {
        let (spec, data) = self.prepare(spec, data)?;
        let key = PredictorKey::new(tenant, project, name);
        let job_id = training_job_id(&key, 1);

        let summary = match self.predictors.entry(key.clone()) {
            Entry::Occupied(_) => {
                return Err(GatewayError::DuplicateName(format!("model '{}.{}'", project, name)))
            }
            Entry::Vacant(vacant) => {
                if !project_exists() {
                    return Err(GatewayError::NotFound(format!("project '{}'", project)));
                }
                let mut record = PredictorRecord {
                    project: project.to_lowercase(),
                    name: name.to_string(),
                    versions: Vec::new(),
                };
                record
                    .versions
                    .push(new_version(1, job_id.clone(), spec.clone(), &data));
                let summary = record.summary(&record.versions[0]);
                vacant.insert(record);
                summary
            }
        };

        self.schedule_training(key, 1, job_id, spec.target, data)?;
        log::info!("Created model {}.{} for tenant {}", project, name, tenant);
        Ok(summary)
    }

    /// Stored training spec of the latest version, for `RETRAIN`.
    pub fn training_spec(&self, tenant: &TenantId, project: &str, name: &str) -> GatewayResult<TrainingSpec> {
        let record = self.record(tenant, project, name)?;
        record
            .latest()
            .map(|v| v.spec.clone())
            .ok_or_else(|| not_found(project, name))
    }

    /// Append a new version trained on `data`.
    pub fn retrain(
        &self,
        tenant: &TenantId,
        project: &str,
        name: &str,
        spec: TrainingSpec,
        data: TableData,
    ) -> GatewayResult<PredictorSummary> {
        let (spec, data) = self.prepare(spec, data)?;
        let key = PredictorKey::new(tenant, project, name);

        let (version, job_id, summary) = {
            let mut record = self
                .predictors
                .get_mut(&key)
                .ok_or_else(|| not_found(project, name))?;
            let version = record.next_version();
            let job_id = training_job_id(&key, version);
            record
                .versions
                .push(new_version(version, job_id.clone(), spec.clone(), &data));
            let summary = record.summary(&record.versions[record.versions.len() - 1]);
            (version, job_id, summary)
        };

        self.schedule_training(key, version, job_id, spec.target, data)?;
        log::info!("Retraining model {}.{} as version {}", project, name, version);
        Ok(summary)
    }

    /// Remove all versions and cancel their pending training.
    pub fn drop_predictor(&self, tenant: &TenantId, project: &str, name: &str) -> GatewayResult<()> {
        let (_, record) = self
            .predictors
            .remove(&PredictorKey::new(tenant, project, name))
            .ok_or_else(|| not_found(project, name))?;
        self.cancel_training(&record);
        log::info!("Dropped model {}.{}", project, name);
        Ok(())
    }

    /// Remove every predictor of `project`. Returns how many were removed.
    pub fn drop_project(&self, tenant: &TenantId, project: &str) -> usize {
        let project = project.to_lowercase();
        let keys: Vec<PredictorKey> = self
            .predictors
            .iter()
            .filter(|e| e.key().tenant == *tenant && e.key().project == project)
            .map(|e| e.key().clone())
            .collect();
        let mut dropped = 0;
        for key in keys {
            if let Some((_, record)) = self.predictors.remove(&key) {
                self.cancel_training(&record);
                dropped += 1;
            }
        }
        dropped
    }

    fn cancel_training(&self, record: &PredictorRecord) {
        for version in record.versions.iter().filter(|v| v.is_pending()) {
            if let Err(e) = self.jobs.cancel_job(&version.job_id) {
                log::debug!("Training job {} not cancelled: {}", version.job_id, e);
            }
        }
    }

    pub fn exists(&self, tenant: &TenantId, project: &str, name: &str) -> bool {
        self.predictors.contains_key(&PredictorKey::new(tenant, project, name))
    }

    /// Snapshot of one predictor.
    pub fn record(&self, tenant: &TenantId, project: &str, name: &str) -> GatewayResult<PredictorRecord> {
        self.predictors
            .get(&PredictorKey::new(tenant, project, name))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| not_found(project, name))
    }

    /// Status of the active version, or of `version`. Never blocks on training.
    pub fn status(
        &self,
        tenant: &TenantId,
        project: &str,
        name: &str,
        version: Option<u32>,
    ) -> GatewayResult<PredictorStatus> {
        let record = self.record(tenant, project, name)?;
        let v = match version {
            Some(v) => record.version(v),
            None => record.active(),
        };
        v.map(|v| v.status).ok_or_else(|| not_found(project, name))
    }

    /// Predictor names of a project, sorted.
    pub fn names(&self, tenant: &TenantId, project: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .records(tenant, Some(project))
            .into_iter()
            .map(|r| r.name)
            .collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    /// One summary per predictor (its active version).
    pub fn summaries(&self, tenant: &TenantId, project: Option<&str>) -> Vec<PredictorSummary> {
        self.records(tenant, project)
            .iter()
            .filter_map(|r| r.active().map(|v| r.summary(v)))
            .collect()
    }

    /// One summary per version.
    pub fn version_summaries(&self, tenant: &TenantId, project: Option<&str>) -> Vec<PredictorSummary> {
        self.records(tenant, project)
            .iter()
            .flat_map(|r| r.versions.iter().map(move |v| r.summary(v)))
            .collect()
    }

    /// The trained model for `version`, or for the latest complete version.
    pub fn model(
        &self,
        tenant: &TenantId,
        project: &str,
        name: &str,
        version: Option<u32>,
    ) -> GatewayResult<Arc<TrainedModel>> {
        let record = self.record(tenant, project, name)?;
        let target = match version {
            Some(v) => record.version(v).ok_or_else(|| {
                GatewayError::NotFound(format!("model '{}.{}' version {}", project, name, v))
            })?,
            None => match record.latest_complete() {
                Some(v) => v,
                None => {
                    let status = record.latest().map(|v| v.status.as_str()).unwrap_or("unknown");
                    return Err(GatewayError::NotReady(format!(
                        "model '{}.{}' is {}",
                        project, name, status
                    )));
                }
            },
        };
        match (&target.status, &target.model) {
            (PredictorStatus::Complete, Some(model)) => Ok(Arc::clone(model)),
            (PredictorStatus::Error, _) => Err(GatewayError::NotReady(format!(
                "model '{}.{}' version {} failed: {}",
                project,
                name,
                target.version,
                target.error.as_deref().unwrap_or("unknown error")
            ))),
            (status, _) => Err(GatewayError::NotReady(format!(
                "model '{}.{}' version {} is {}",
                project, name, target.version, status
            ))),
        }
    }

    /// Feature columns plus prediction columns, one row per input row.
    pub fn predict(
        &self,
        tenant: &TenantId,
        project: &str,
        name: &str,
        version: Option<u32>,
        input: &TableData,
    ) -> GatewayResult<TableData> {
        Ok(self.model(tenant, project, name, version)?.predict_with_features(input))
    }

    fn records(&self, tenant: &TenantId, project: Option<&str>) -> Vec<PredictorRecord> {
        let project = project.map(str::to_lowercase);
        let mut records: Vec<PredictorRecord> = self
            .predictors
            .iter()
            .filter(|e| e.key().tenant == *tenant)
            .filter(|e| project.as_deref().map(|p| e.key().project == p).unwrap_or(true))
            .map(|e| e.value().clone())
            .collect();
        records.sort_by(|a, b| {
            (a.project.as_str(), a.name.to_lowercase()).cmp(&(b.project.as_str(), b.name.to_lowercase()))
        });
        records
    }

    /// Check the target and cap the training rows.
    fn prepare(&self, mut spec: TrainingSpec, mut data: TableData) -> GatewayResult<(TrainingSpec, TableData)> {
        let idx = data.column_index(&spec.target).ok_or_else(|| {
            GatewayError::Validation(format!(
                "Target column '{}' is not in the training query columns: {}",
                spec.target,
                data.columns.join(", ")
            ))
        })?;
        spec.target = data.columns[idx].clone();
        if data.truncate(self.max_training_rows) {
            log::warn!(
                "Training data truncated to {} rows for target '{}'",
                self.max_training_rows,
                spec.target
            );
        }
        Ok((spec, data))
    }

    fn schedule_training(
        &self,
        key: PredictorKey,
        version: u32,
        job_id: String,
        target: String,
        data: TableData,
    ) -> GatewayResult<()> {
        let predictors = Arc::clone(&self.predictors);
        let trainer = Arc::clone(&self.trainer);

        let job_key = key.clone();
        let job_ref = job_id.clone();
        let job = async move {
            set_status(&predictors, &job_key, version, &job_ref, |v| {
                v.status = PredictorStatus::Training
            });

            let trained = tokio::task::spawn_blocking(move || trainer.train(&data, &target))
                .await
                .map_err(|e| format!("Training task failed: {}", e))
                .and_then(|r| r);

            match trained {
                Ok(model) => {
                    let accuracy = model.accuracy();
                    set_status(&predictors, &job_key, version, &job_ref, |v| {
                        v.status = PredictorStatus::Complete;
                        v.model = Some(Arc::new(model));
                        v.finished_at = Some(Utc::now());
                    });
                    Ok(format!("accuracy {:.4}", accuracy))
                }
                Err(err) => {
                    log::warn!(
                        "Training {}.{} v{} failed: {}",
                        job_key.project,
                        job_key.name,
                        version,
                        err
                    );
                    set_status(&predictors, &job_key, version, &job_ref, |v| {
                        v.status = PredictorStatus::Error;
                        v.error = Some(err.clone());
                        v.finished_at = Some(Utc::now());
                    });
                    Err(err)
                }
            }
        };

        if let Err(e) = self.jobs.start_job(job_id.clone(), "train_predictor", Box::pin(job)) {
            set_status(&self.predictors, &key, version, &job_id, |v| {
                v.status = PredictorStatus::Error;
                v.error = Some(e.to_string());
            });
            return Err(e);
        }
        Ok(())
    }
}

fn training_job_id(key: &PredictorKey, version: u32) -> String {
    format!(
        "train-{}-{}-{}-v{}-{}",
        key.tenant,
        key.project,
        key.name,
        version,
        uuid::Uuid::new_v4().simple()
    )
}

fn new_version(version: u32, job_id: String, spec: TrainingSpec, data: &TableData) -> PredictorVersion {
    let features = data
        .columns
        .iter()
        .filter(|c| !c.eq_ignore_ascii_case(&spec.target))
        .cloned()
        .collect();
    PredictorVersion {
        version,
        job_id,
        status: PredictorStatus::Generating,
        spec,
        features,
        model: None,
        error: None,
        training_rows: data.row_count(),
        created_at: Utc::now(),
        finished_at: None,
    }
}

/// Apply `update` to a version if it still belongs to `job_id`. A dropped
/// and recreated predictor reuses version numbers, never job ids.
fn set_status(
    predictors: &DashMap<PredictorKey, PredictorRecord>,
    key: &PredictorKey,
    version: u32,
    job_id: &str,
    update: impl FnOnce(&mut PredictorVersion),
) {
    if let Some(mut record) = predictors.get_mut(key) {
        match record.version_mut(version) {
            Some(v) if v.job_id == job_id => update(v),
            _ => log::debug!("Ignoring stale training update from job {}", job_id),
        }
    }
}

fn not_found(project: &str, name: &str) -> GatewayError {
    GatewayError::NotFound(format!("model '{}.{}'", project, name))
}
