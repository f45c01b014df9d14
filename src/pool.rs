use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{CheckerError, Result};
use crate::output::OutputLog;
use crate::progress::{observe_progress, ProgressSink};
use crate::prober::{ProbeResult, Prober};
use crate::queue::WorkQueue;

pub const DEFAULT_WORKERS: usize = 512;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_GRACE: Duration = Duration::from_secs(1);

/// Knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of concurrent workers, must be positive.
    pub workers: usize,
    /// How often the progress observer samples the queue.
    pub poll_interval: Duration,
    /// How long to wait for workers to exit after cancellation before aborting them.
    pub grace: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            workers: DEFAULT_WORKERS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            grace: DEFAULT_GRACE,
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub checked: usize,
    pub available: usize,
}

#[derive(Debug, Default)]
struct Tally {
    checked: AtomicUsize,
    available: AtomicUsize,
}

impl Tally {
    fn record(&self, result: ProbeResult) {
        self.checked.fetch_add(1, Ordering::Relaxed);
        if result.is_available() {
            self.available.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            checked: self.checked.load(Ordering::Relaxed),
            available: self.available.load(Ordering::Relaxed),
        }
    }
}

/// Probe one name and, if it is free, append it to the log.
///
/// Failing to write the log line is reported but does not stop the run.
pub async fn check_availability<P>(prober: &P, log: &OutputLog, name: &str) -> ProbeResult
where
    P: Prober,
{
    let result = prober.probe(name).await;

    if result.is_available() {
        if let Err(e) = log.record_available(name).await {
            warn!("Could not record '{}': {}", name, e);
        }
    }
    result
}

/// Marks the dequeued name done when dropped, so a probe that panics or is
/// cancelled cannot leave `join` waiting forever.
struct DoneGuard<'a> {
    queue: &'a WorkQueue,
    worker: usize,
}

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.queue.mark_done() {
            warn!("Worker {}: {}", self.worker, e);
        }
    }
}

async fn run_worker<P>(
    id: usize,
    queue: Arc<WorkQueue>,
    prober: Arc<P>,
    log: Arc<OutputLog>,
    tally: Arc<Tally>,
    cancel: CancellationToken,
) where
    P: Prober,
{
    while !cancel.is_cancelled() {
        let Some(name) = queue.try_dequeue() else {
            break;
        };
        let _done = DoneGuard {
            queue: &queue,
            worker: id,
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            result = check_availability(prober.as_ref(), &log, &name) => tally.record(result),
        }
    }
    debug!("Worker {} exiting", id);
}

/// Fill a queue with `names`, drain it with `config.workers` concurrent
/// workers plus one progress observer, and wait for the drain.
///
/// Once every name has been marked done the shared cancellation token fires;
/// tasks that have not exited within `config.grace` are aborted. If every
/// worker stops while names are still queued (a prober panicked in each of
/// them), the run fails with [`CheckerError::WorkersExited`] instead of
/// waiting forever.
pub async fn run_pipeline<P, S>(
    names: Vec<String>,
    prober: Arc<P>,
    log: Arc<OutputLog>,
    progress: S,
    config: &PipelineConfig,
) -> Result<PipelineSummary>
where
    P: Prober + 'static,
    S: ProgressSink + 'static,
{
    if config.workers == 0 {
        return Err(CheckerError::InvalidWorkerCount);
    }

    // Fill the queue before anything that consumes it is spawned
    let queue: Arc<WorkQueue> = Arc::new(names.into_iter().collect());
    let initial = queue.size();
    let tally = Arc::new(Tally::default());
    let cancel = CancellationToken::new();

    info!("Checking {} names with {} workers", initial, config.workers);

    // Observer first, seeded with the full size so early dequeues are counted
    let observer = tokio::spawn(observe_progress(
        Arc::clone(&queue),
        initial,
        progress,
        config.poll_interval,
        cancel.clone(),
    ));

    // Launch the workers
    let mut workers: Vec<JoinHandle<()>> = (0..config.workers)
        .map(|id| {
            tokio::spawn(run_worker(
                id,
                Arc::clone(&queue),
                Arc::clone(&prober),
                Arc::clone(&log),
                Arc::clone(&tally),
                cancel.clone(),
            ))
        })
        .collect();

    // Wait for the drain, or for every worker to be gone
    let outcome = tokio::select! {
        _ = queue.join() => Ok(()),
        results = join_all(workers.iter_mut()) => {
            let panicked = results.iter().filter(|r| r.is_err()).count();
            match queue.unfinished() {
                0 => Ok(()),
                remaining => {
                    error!(
                        "All workers stopped ({} panicked) with {} names unfinished",
                        panicked, remaining
                    );
                    Err(CheckerError::WorkersExited { remaining })
                }
            }
        }
    };
    cancel.cancel();

    // Give everything a moment to wind down, then abort stragglers.
    // Finished handles may already have been polled to completion above.
    let mut handles = workers;
    handles.retain(|handle| !handle.is_finished());
    handles.push(observer);
    if tokio::time::timeout(config.grace, join_all(handles.iter_mut()))
        .await
        .is_err()
    {
        warn!("Tasks still running after {:?}, aborting", config.grace);
        for handle in &handles {
            handle.abort();
        }
    }
    outcome?;

    let summary = tally.summary();
    info!(
        "Checked {} names, {} available",
        summary.checked, summary.available
    );
    Ok(summary)
}
