use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::error::{CheckerError, Result};

/// FIFO of candidate names shared by the worker pool.
///
/// Tracks two counts: the number of names still waiting in the deque
/// ([`size`](Self::size)) and the number of names that have been enqueued but
/// not yet marked done ([`unfinished`](Self::unfinished)). [`join`](Self::join)
/// resolves once the latter reaches zero.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<String>>,
    unfinished: AtomicUsize,
    drained: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, name: String) {
        let mut items = self.lock();
        self.unfinished.fetch_add(1, Ordering::AcqRel);
        items.push_back(name);
    }

    /// Bulk insert, used by the orchestrator before any worker starts.
    pub fn extend<I>(&self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut items = self.lock();
        let before = items.len();
        items.extend(names);
        self.unfinished
            .fetch_add(items.len() - before, Ordering::AcqRel);
    }

    /// Remove the next name, or `None` if nothing is waiting.
    pub fn try_dequeue(&self) -> Option<String> {
        self.lock().pop_front()
    }

    /// Record that a previously dequeued name has been fully processed.
    pub fn mark_done(&self) -> Result<()> {
        let previous = self
            .unfinished
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| CheckerError::TooManyMarkDone)?;

        if previous == 1 {
            self.drained.notify_waiters();
        }
        Ok(())
    }

    /// Number of names waiting to be dequeued.
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of names enqueued but not yet marked done.
    pub fn unfinished(&self) -> usize {
        self.unfinished.load(Ordering::Acquire)
    }

    /// Wait until every enqueued name has been dequeued and marked done.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register before checking the counter so a concurrent final
            // mark_done cannot slip between the check and the await.
            notified.as_mut().enable();

            if self.unfinished() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        // The deque is never left half-updated, so a poisoned lock is still usable.
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FromIterator<String> for WorkQueue {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let queue = WorkQueue::new();
        queue.extend(iter);
        queue
    }
}
