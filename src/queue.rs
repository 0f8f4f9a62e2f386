use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::task::Task;

/// The single piece of mutable state shared by every worker during the
/// traversal of one root target, combined into one record guarded by one
/// lock. Conflating the permission/shutdown flags with the accumulator under
/// one lock is fine here because contention is dominated by filesystem I/O,
/// not counter updates.
struct Inner {
    queue: VecDeque<Task>,
    /// Sum of the block counts of every entry visited so far for the current root.
    accumulated_blocks: u64,
    /// Workers currently between dequeue and completion of a non-sentinel task.
    active_workers: usize,
    /// Cleared the first time any directory cannot be opened. Never set back to true.
    permission_ok: bool,
    /// Set once the termination coordinator has decided to wind the pool down.
    shutdown: bool,
}

/// The task queue and shared traversal state for one root-target run.
///
/// Every operation that touches the queue or the counters goes through the
/// same [`Mutex`]; `dequeue` additionally waits on a [`Condvar`] signalled by
/// `enqueue`. The mutex is never held across a filesystem call -- callers are
/// expected to drop the guard (implicitly, by letting these methods return)
/// before doing any I/O.
pub struct TaskQueue {
    inner: Mutex<Inner>,
    condvar: Condvar,
    worker_count: usize,
}

impl TaskQueue {
    /// Creates a fresh queue for a root-target run with `worker_count` workers.
    ///
    /// `permission_ok` carries the permission flag across roots: the flag is
    /// the one field the driver does *not* reset between targets.
    #[must_use]
    pub fn new(worker_count: usize, permission_ok: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                accumulated_blocks: 0,
                active_workers: 0,
                permission_ok,
                shutdown: false,
            }),
            condvar: Condvar::new(),
            worker_count,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means some thread panicked while holding it, which
        // can only happen if an invariant above was already broken. That is
        // a fatal condition (see error taxonomy), so we propagate the panic
        // rather than limp along with possibly-corrupted counters.
        self.inner.lock().expect("traversal state mutex poisoned")
    }

    /// Pushes a new unit of work and wakes exactly one waiting worker.
    pub fn enqueue(&self, path: std::path::PathBuf) {
        let mut inner = self.lock();
        inner.queue.push_back(Task::Work(path));
        drop(inner);
        self.condvar.notify_one();
    }

    /// Blocks until a task is available, then removes and returns it.
    ///
    /// If the returned task is [`Task::Work`], `active_workers` has already
    /// been incremented by the time this call returns; the caller must pair
    /// every such dequeue with a later call to [`Self::complete`].
    pub fn dequeue(&self) -> Task {
        let mut inner = self
            .condvar
            .wait_while(self.lock(), |inner| inner.queue.is_empty())
            .expect("traversal state mutex poisoned");
        // re-tests emptiness on every wakeup inside wait_while, so spurious
        // wakeups are harmless.
        let task = inner.queue.pop_front().expect("queue non-empty by wait_while");
        if !task.is_sentinel() {
            inner.active_workers += 1;
        }
        task
    }

    /// Marks a non-sentinel task as finished and runs the termination check:
    /// if the queue is empty and no worker is active, this is the single
    /// point where the pool winds down, injecting exactly one sentinel per
    /// worker and broadcasting the wakeup.
    pub fn complete(&self) {
        let mut inner = self.lock();
        inner.active_workers -= 1;
        if inner.queue.is_empty() && inner.active_workers == 0 && !inner.shutdown {
            inner.shutdown = true;
            for _ in 0..self.worker_count {
                inner.queue.push_back(Task::Sentinel);
            }
            drop(inner);
            self.condvar.notify_all();
        }
    }

    /// Adds `blocks` to the running total for this root.
    pub fn contribute(&self, blocks: u64) {
        if blocks == 0 {
            return;
        }
        self.lock().accumulated_blocks += blocks;
    }

    /// Records a permission failure: clears the flag and contributes `blocks`
    /// (the unreadable directory's own size) in a single critical section.
    pub fn record_permission_failure(&self, blocks: u64) {
        let mut inner = self.lock();
        inner.permission_ok = false;
        inner.accumulated_blocks += blocks;
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.lock().accumulated_blocks
    }

    #[must_use]
    pub fn permission_ok(&self) -> bool {
        self.lock().permission_ok
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    #[must_use]
    pub fn active_workers(&self) -> usize {
        self.lock().active_workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_dequeue_is_fifo_for_single_producer() {
        let q = TaskQueue::new(1, true);
        q.enqueue("/a".into());
        q.enqueue("/b".into());
        match q.dequeue() {
            Task::Work(p) => assert_eq!(p, std::path::Path::new("/a")),
            Task::Sentinel => panic!("expected work"),
        }
        q.complete();
        match q.dequeue() {
            Task::Work(p) => assert_eq!(p, std::path::Path::new("/b")),
            Task::Sentinel => panic!("expected work"),
        }
    }

    #[test]
    fn completing_the_last_task_injects_one_sentinel_per_worker() {
        let q = TaskQueue::new(3, true);
        q.enqueue("/a".into());
        let _ = q.dequeue();
        q.complete();
        for _ in 0..3 {
            assert!(q.dequeue().is_sentinel());
        }
    }

    #[test]
    fn contribute_accumulates_and_permission_failure_clears_flag() {
        let q = TaskQueue::new(1, true);
        q.contribute(8);
        q.contribute(16);
        assert_eq!(q.total(), 24);
        assert!(q.permission_ok());
        q.record_permission_failure(4);
        assert_eq!(q.total(), 28);
        assert!(!q.permission_ok());
    }
}
