//! The worker pool: N long-lived threads draining the shared [`TaskQueue`]
//! until each has observed a shutdown sentinel.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{MduError, Result};
use crate::queue::TaskQueue;
use crate::task::Task;
use crate::visit::visit;

/// Runs `worker_count` threads against a fresh queue seeded with `root`,
/// blocking until every worker has exited after observing its sentinel.
///
/// Returns the accumulated block total and whether any directory in this
/// root's subtree was unreadable. A fatal condition (see error taxonomy --
/// worker panic, spawn failure, or a directory-close failure) is surfaced
/// as `Err` and should cause the whole process to exit with failure.
pub fn run(root: PathBuf, worker_count: usize, permission_ok: bool) -> Result<(u64, bool)> {
    debug_assert!(worker_count >= 1, "pool requires at least one worker");

    let queue = Arc::new(TaskQueue::new(worker_count, permission_ok));
    queue.enqueue(root);

    let mut handles = Vec::with_capacity(worker_count);
    for id in 0..worker_count {
        let queue = Arc::clone(&queue);
        let handle = std::thread::Builder::new()
            .name(format!("mdu-worker-{id}"))
            .spawn(move || worker_loop(&queue))
            .map_err(MduError::ThreadSpawn)?;
        handles.push(handle);
    }

    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(_) => return Err(MduError::WorkerPanicked),
        }
    }

    debug_assert!(queue.is_empty(), "driver must observe an empty queue after join");
    debug_assert_eq!(queue.active_workers(), 0, "no worker may remain active after join");

    Ok((queue.total(), queue.permission_ok()))
}

/// One worker's loop: dequeue, process unless it's a sentinel, repeat.
fn worker_loop(queue: &TaskQueue) -> Result<()> {
    loop {
        let task = queue.dequeue();
        let path = match task {
            Task::Sentinel => {
                trace!("worker observed sentinel, exiting");
                return Ok(());
            }
            Task::Work(path) => path,
        };

        trace!(path = %path.display(), "visiting");
        let visited = visit(&path, |child| queue.enqueue(child))?;

        if visited.permission_denied {
            queue.record_permission_failure(visited.blocks);
        } else {
            queue.contribute(visited.blocks);
        }

        queue.complete();
    }
}
