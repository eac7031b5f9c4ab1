//! Batch runner: many jobs, bounded concurrency, one result per job.
//!
//! Each job runs in its own task behind a semaphore permit. A job that fails
//! validation, fails its search, or panics yields a failed `PipelineResult`
//! without affecting the others. Results come back in input order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::errors::{Severity, SourcingError};
use crate::models::{Job, PipelineResult, Stage};
use crate::pipeline::Pipeline;

impl Pipeline {
    pub async fn run_batch(&self, jobs: Vec<Job>) -> Vec<PipelineResult> {
        let limit = self.config.max_concurrent_jobs.max(1);
        let semaphore = Arc::new(Semaphore::new(limit));
        info!("Running batch of {} jobs, {} at a time", jobs.len(), limit);

        let mut handles = Vec::with_capacity(jobs.len());
        for mut job in jobs {
            let job_id = job.ensure_id().to_string();
            let pipeline = self.clone();
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    SourcingError::Internal(anyhow::anyhow!("batch limiter closed: {e}"))
                })?;
                pipeline.run(job).await
            });
            handles.push((job_id, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (job_id, handle) in handles {
            let result = match handle.await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    warn!("Job {} rejected: {}", job_id, e);
                    let stage = match e.severity() {
                        Severity::Validation => Stage::Validate,
                        _ => Stage::Search,
                    };
                    PipelineResult::failed(job_id, e.to_string(), stage)
                }
                Err(join_error) => {
                    error!("Job {} task failed: {}", job_id, join_error);
                    PipelineResult::failed(
                        job_id,
                        format!("Job task failed: {join_error}"),
                        Stage::Search,
                    )
                }
            };
            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        info!("Batch finished: {}/{} jobs succeeded", succeeded, results.len());
        results
    }
}
