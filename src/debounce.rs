// src/debounce.rs - Reset-on-activity task scheduling
use std::{collections::HashMap, fmt::Debug, future::Future, hash::Hash};

use log::{debug, trace};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};

/// Runs at most one delayed task per key.
///
/// Scheduling a key that already has a pending task aborts that task first,
/// so only the most recently scheduled task for a key ever runs. A task can
/// be aborted until it finishes, including after its delay while it is still
/// waiting on a lock, so cancelling a key guarantees its task makes no
/// further progress.
pub struct Debouncer<K> {
    /// Handles of scheduled tasks, by key
    pending: HashMap<K, JoinHandle<()>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Schedules `task` to run after `delay`, replacing any pending task for `key`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, key: K, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.pending.retain(|_, handle| !handle.is_finished());

        if let Some(previous) = self.pending.remove(&key) {
            previous.abort();
            trace!("Reset pending task for {:?}", key);
        }

        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            task.await;
        });
        self.pending.insert(key, handle);
    }

    /// Cancels the pending task for `key`. Returns whether one was waiting.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.pending.remove(key) {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                debug!("Cancelled pending task for {:?}", key);
                true
            }
            _ => false,
        }
    }

    /// Cancels every pending task, returning how many were still waiting
    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for (_, handle) in self.pending.drain() {
            if !handle.is_finished() {
                handle.abort();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!("Cancelled {} pending tasks", cancelled);
        }
        cancelled
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn pending_count(&self) -> usize {
        self.pending
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

impl<K> Default for Debouncer<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        for handle in self.pending.values() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    fn counting_task(counter: &Arc<AtomicUsize>, value: usize) -> impl Future<Output = ()> {
        let counter = Arc::clone(counter);
        async move {
            counter.store(value, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_runs_only_the_latest_task() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();

        debouncer.schedule("note", Duration::from_millis(1000), counting_task(&fired, 1));
        time::sleep(Duration::from_millis(600)).await;
        debouncer.schedule("note", Duration::from_millis(1000), counting_task(&fired, 2));

        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert!(!debouncer.is_pending(&"note"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();

        debouncer.schedule(1, Duration::from_millis(100), counting_task(&fired, 7));
        assert!(debouncer.is_pending(&1));
        assert!(debouncer.cancel(&1));

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(debouncer.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();

        debouncer.schedule("a", Duration::from_millis(100), counting_task(&first, 1));
        debouncer.schedule("b", Duration::from_millis(100), counting_task(&second, 1));
        assert_eq!(debouncer.pending_count(), 2);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
