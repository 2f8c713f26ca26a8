//! Background job scheduler and the run guards shared with manual triggers.
//!
//! Each workflow kind owns one [`RunGuard`]. A scheduled tick or HTTP
//! trigger that finds the guard taken is skipped rather than queued.

use std::sync::Arc;

use radar_engine::{PipelineError, PipelineOrchestrator, PipelineSummary, TrendSummary};
use tokio::sync::{Mutex, MutexGuard};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Non-reentrant guard: at most one holder, never waits.
#[derive(Debug, Default)]
pub struct RunGuard(Mutex<()>);

impl RunGuard {
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, ()>> {
        self.0.try_lock().ok()
    }
}

/// Runs the two workflows under their guards. `None` means a run of that
/// kind was already in progress.
pub struct PipelineRunner {
    orchestrator: PipelineOrchestrator,
    pub(crate) scrape_guard: RunGuard,
    pub(crate) trends_guard: RunGuard,
}

impl PipelineRunner {
    #[must_use]
    pub fn new(orchestrator: PipelineOrchestrator) -> Self {
        Self {
            orchestrator,
            scrape_guard: RunGuard::default(),
            trends_guard: RunGuard::default(),
        }
    }

    pub fn orchestrator(&self) -> &PipelineOrchestrator {
        &self.orchestrator
    }

    pub async fn run_full_pipeline(&self) -> Option<Result<PipelineSummary, PipelineError>> {
        let _guard = self.scrape_guard.try_acquire()?;
        Some(self.orchestrator.run_full_pipeline().await)
    }

    pub async fn recalculate_trends(&self) -> Option<Result<TrendSummary, PipelineError>> {
        let _guard = self.trends_guard.try_acquire()?;
        Some(self.orchestrator.recalculate_cluster_trends().await)
    }
}

/// Builds and starts the scheduler with the full-pipeline and trend jobs.
///
/// The returned handle must be kept alive for the lifetime of the process.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if a cron expression is invalid or the
/// scheduler fails to start.
pub async fn build_scheduler(
    runner: Arc<PipelineRunner>,
    scrape_cron: &str,
    trends_cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let scrape_runner = Arc::clone(&runner);
    let scrape_job = Job::new_async(scrape_cron, move |_uuid, _lock| {
        let runner = Arc::clone(&scrape_runner);
        Box::pin(async move {
            match runner.run_full_pipeline().await {
                Some(Ok(_)) => {}
                Some(Err(e)) => tracing::error!(error = %e, "scheduler: pipeline run failed"),
                None => tracing::info!("scheduler: pipeline run still in progress; tick skipped"),
            }
        })
    })?;
    scheduler.add(scrape_job).await?;

    let trends_job = Job::new_async(trends_cron, move |_uuid, _lock| {
        let runner = Arc::clone(&runner);
        Box::pin(async move {
            match runner.recalculate_trends().await {
                Some(Ok(_)) => {}
                Some(Err(e)) => tracing::error!(error = %e, "scheduler: trend refresh failed"),
                None => tracing::info!("scheduler: trend refresh still in progress; tick skipped"),
            }
        })
    })?;
    scheduler.add(trends_job).await?;

    scheduler.start().await?;
    tracing::info!(scrape_cron, trends_cron, "scheduler started");
    Ok(scheduler)
}
