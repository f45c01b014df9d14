use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::queue::WorkQueue;

/// Display that receives completed-item increments.
pub trait ProgressSink: Send + Sync {
    fn advance(&self, delta: u64);
}

impl ProgressSink for ProgressBar {
    fn advance(&self, delta: u64) {
        self.inc(delta);
    }
}

/// Bar used by the binary, one tick per checked name.
pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {per_sec} {wide_msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Poll the queue depth every `interval` and forward how many names left the
/// queue since the previous sample.
///
/// `initial` is the queue size before any worker started; the caller reads it
/// so that names dequeued before this task first runs are still reported.
/// Read-only with respect to the queue. Returns once a sample sees the queue
/// empty. On `cancel` one last sample is taken before returning.
pub async fn observe_progress<S>(
    queue: Arc<WorkQueue>,
    initial: usize,
    sink: S,
    interval: Duration,
    cancel: CancellationToken,
) where
    S: ProgressSink,
{
    let mut previous = initial;

    loop {
        let current = queue.size();
        let delta = previous.saturating_sub(current);
        if delta > 0 {
            sink.advance(delta as u64);
        }
        previous = current;

        if current == 0 {
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Progress observer cancelled");
                let delta = previous.saturating_sub(queue.size());
                if delta > 0 {
                    sink.advance(delta as u64);
                }
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
