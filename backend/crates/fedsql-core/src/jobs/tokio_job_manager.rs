//! Tokio-based job manager
//!
//! Maintains an in-memory registry of jobs. Each entry carries its
//! `JoinHandle` for `abort()` and the `JobInfo` the task updates when it
//! finishes. The entry is registered before the task is spawned so a job
//! that finishes instantly still records its outcome.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use super::{JobInfo, JobStatus};
use crate::error::{GatewayError, GatewayResult};

pub type JobFuture = Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'static>>;

struct JobEntry {
    info: JobInfo,
    handle: Option<JoinHandle<()>>,
}

pub struct TokioJobManager {
    jobs: Arc<RwLock<HashMap<String, JobEntry>>>,
    /// Finished jobs kept for inspection
    history_limit: usize,
}

impl TokioJobManager {
    pub fn new(history_limit: usize) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            history_limit,
        }
    }

    /// Spawn `job_future` on the current Tokio runtime.
    ///
    /// Fails if `job_id` is already registered.
    pub fn start_job(&self, job_id: String, job_type: &str, job_future: JobFuture) -> GatewayResult<()> {
        {
            let mut jobs = self.jobs.write();
            if jobs.contains_key(&job_id) {
                return Err(GatewayError::Internal(format!("Job with ID {} already exists", job_id)));
            }
            jobs.insert(
                job_id.clone(),
                JobEntry {
                    info: JobInfo {
                        job_id: job_id.clone(),
                        job_type: job_type.to_string(),
                        status: JobStatus::Running,
                        start_time: Utc::now(),
                        end_time: None,
                    },
                    handle: None,
                },
            );
        }

        let jobs_arc = Arc::clone(&self.jobs);
        let id = job_id.clone();
        let handle = tokio::spawn(async move {
            let result = job_future.await;
            let mut jobs = jobs_arc.write();
            if let Some(entry) = jobs.get_mut(&id) {
                entry.info.end_time = Some(Utc::now());
                entry.info.status = match result {
                    Ok(msg) => JobStatus::Completed(Some(msg)),
                    Err(err) => JobStatus::Failed(err),
                };
            }
        });

        if let Some(entry) = self.jobs.write().get_mut(&job_id) {
            entry.handle = Some(handle);
        }
        self.cleanup_finished_jobs();
        log::debug!("Started {} job {}", job_type, job_id);
        Ok(())
    }

    pub fn get_job_status(&self, job_id: &str) -> Option<JobInfo> {
        self.jobs.read().get(job_id).map(|e| e.info.clone())
    }

    pub fn running_count(&self) -> usize {
        self.jobs
            .read()
            .values()
            .filter(|e| !e.info.status.is_finished())
            .count()
    }

    /// Abort a running job.
    pub fn cancel_job(&self, job_id: &str) -> GatewayResult<()> {
        let mut jobs = self.jobs.write();
        let entry = jobs
            .get_mut(job_id)
            .ok_or_else(|| GatewayError::NotFound(format!("job {}", job_id)))?;
        if entry.info.status.is_finished() {
            return Ok(());
        }
        if let Some(handle) = entry.handle.take() {
            handle.abort();
        }
        entry.info.status = JobStatus::Cancelled;
        entry.info.end_time = Some(Utc::now());
        Ok(())
    }

    /// Abort every running job. Called on server shutdown.
    pub fn shutdown(&self) {
        let running: Vec<String> = self
            .jobs
            .read()
            .iter()
            .filter(|(_, e)| !e.info.status.is_finished())
            .map(|(id, _)| id.clone())
            .collect();
        for id in &running {
            let _ = self.cancel_job(id);
        }
        if !running.is_empty() {
            log::info!("Cancelled {} running jobs on shutdown", running.len());
        }
    }

    /// Keep at most `history_limit` finished jobs, dropping the oldest.
    fn cleanup_finished_jobs(&self) {
        let mut jobs = self.jobs.write();
        let mut finished: Vec<(String, chrono::DateTime<Utc>)> = jobs
            .iter()
            .filter(|(_, e)| e.info.status.is_finished())
            .map(|(id, e)| (id.clone(), e.info.start_time))
            .collect();
        if finished.len() <= self.history_limit {
            return;
        }
        finished.sort_by(|a, b| a.1.cmp(&b.1));
        let excess = finished.len() - self.history_limit;
        for (id, _) in finished.into_iter().take(excess) {
            jobs.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn wait_finished(manager: &TokioJobManager, id: &str) -> JobInfo {
        for _ in 0..200 {
            if let Some(info) = manager.get_job_status(id) {
                if info.status.is_finished() {
                    return info;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {} did not finish", id);
    }

    #[tokio::test]
    async fn test_records_completion_and_failure() {
        let manager = TokioJobManager::new(10);
        manager
            .start_job("ok".into(), "train", Box::pin(async { Ok("done".to_string()) }))
            .unwrap();
        manager
            .start_job("bad".into(), "train", Box::pin(async { Err("boom".to_string()) }))
            .unwrap();

        let ok = wait_finished(&manager, "ok").await;
        assert_eq!(ok.status, JobStatus::Completed(Some("done".to_string())));
        assert!(ok.end_time.is_some());
        let bad = wait_finished(&manager, "bad").await;
        assert_eq!(bad.status, JobStatus::Failed("boom".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let manager = TokioJobManager::new(10);
        manager
            .start_job("a".into(), "train", Box::pin(async { Ok(String::new()) }))
            .unwrap();
        assert!(manager
            .start_job("a".into(), "train", Box::pin(async { Ok(String::new()) }))
            .is_err());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_running_jobs() {
        let manager = TokioJobManager::new(10);
        manager
            .start_job(
                "slow".into(),
                "train",
                Box::pin(async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(String::new())
                }),
            )
            .unwrap();
        assert_eq!(manager.running_count(), 1);
        manager.shutdown();
        assert_eq!(
            manager.get_job_status("slow").unwrap().status,
            JobStatus::Cancelled
        );
        assert_eq!(manager.running_count(), 0);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let manager = TokioJobManager::new(2);
        for i in 0..5 {
            let id = format!("job-{}", i);
            manager
                .start_job(id.clone(), "train", Box::pin(async { Ok(String::new()) }))
                .unwrap();
            wait_finished(&manager, &id).await;
        }
        // trimming happens on the next start
        manager
            .start_job("last".into(), "train", Box::pin(async { Ok(String::new()) }))
            .unwrap();
        assert!(manager.get_job_status("job-0").is_none());
        assert!(manager.get_job_status("job-4").is_some());
    }
}
