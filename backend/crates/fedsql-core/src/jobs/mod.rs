//! Background job tracking.
//!
//! Predictor training runs as detached Tokio tasks; the job manager keeps a
//! handle to each one so shutdown can abort them, plus a bounded history of
//! finished jobs.

mod tokio_job_manager;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use tokio_job_manager::{JobFuture, TokioJobManager};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed(Option<String>),
    Failed(String),
    Cancelled,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobInfo {
    pub job_id: String,
    pub job_type: String,
    pub status: JobStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}
