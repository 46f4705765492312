//! Background job scheduling

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::services::{ProcessKind, ProcessorService};

pub const PROCESS_FILTERS_JOB: &str = "process-filters";

/// Delay before the first run after startup
pub const INITIAL_RUN_DELAY: Duration = Duration::from_secs(15);

/// Initialize and start the job scheduler
pub async fn start_scheduler(
    processor: Arc<ProcessorService>,
    schedule: &str,
    dry_run: bool,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job_processor = processor.clone();
    let process_job = Job::new_async(schedule, move |_uuid, _l| {
        let processor = job_processor.clone();
        Box::pin(async move {
            run_process_filters(&processor, dry_run).await;
        })
    })?;
    scheduler.add(process_job).await?;

    scheduler.start().await?;

    info!(job = PROCESS_FILTERS_JOB, schedule, "Job scheduler started");
    Ok(scheduler)
}

/// Process arrs then lists, logging every collected error
pub async fn run_process_filters(processor: &ProcessorService, dry_run: bool) {
    info!(job = PROCESS_FILTERS_JOB, "Running filter processing");

    match processor.process(ProcessKind::Both, dry_run).await {
        Ok(errors) if errors.is_empty() => {
            info!(job = PROCESS_FILTERS_JOB, "Filter processing finished");
        }
        Ok(errors) => {
            for message in &errors {
                error!(job = PROCESS_FILTERS_JOB, "{}", message);
            }
            error!(
                job = PROCESS_FILTERS_JOB,
                failed = errors.len(),
                "Filter processing finished with errors"
            );
        }
        Err(e) => error!(job = PROCESS_FILTERS_JOB, "Filter processing error: {:#}", e),
    }
}

/// Kick off one run after [`INITIAL_RUN_DELAY`]
pub fn spawn_initial_run(
    processor: Arc<ProcessorService>,
    dry_run: bool,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(INITIAL_RUN_DELAY).await;
        run_process_filters(&processor, dry_run).await;
    })
}
