//! The single-threaded recursive fallback used when `-j 1`. Shares the visit
//! algorithm with the pooled mode; the only difference is that a discovered
//! subdirectory is recursed into immediately instead of being enqueued for
//! another thread to pick up.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::queue::TaskQueue;
use crate::visit::visit;

/// Recursively sums `root`'s subtree on the calling thread.
///
/// Bookkeeping is funneled through a one-worker [`TaskQueue`] purely to
/// reuse its accumulator and permission-flag logic under the same lock the
/// pooled mode uses, rather than duplicating that bookkeeping here. The
/// lock is uncontended in this mode, so this costs nothing observable.
pub fn run(root: PathBuf, permission_ok: bool) -> Result<(u64, bool)> {
    let queue = TaskQueue::new(1, permission_ok);
    visit_recursive(&root, &queue)?;
    Ok((queue.total(), queue.permission_ok()))
}

fn visit_recursive(path: &Path, queue: &TaskQueue) -> Result<()> {
    let mut subdirectories = Vec::new();
    let visited = visit(path, |child| subdirectories.push(child))?;

    if visited.permission_denied {
        queue.record_permission_failure(visited.blocks);
    } else {
        queue.contribute(visited.blocks);
    }

    for child in subdirectories {
        visit_recursive(&child, queue)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn unique_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn recursive_and_pooled_modes_agree_on_a_shared_tree() {
        let dir = unique_dir("mdu_test_single_vs_pool");
        for i in 0..6 {
            let sub = dir.join(format!("d{i}"));
            fs::create_dir(&sub).unwrap();
            fs::write(sub.join("f"), vec![0u8; 2048 * (i + 1) as usize]).unwrap();
        }

        let (recursive_total, recursive_ok) = run(dir.clone(), true).unwrap();
        let (pooled_total, pooled_ok) = crate::pool::run(dir.clone(), 4, true).unwrap();

        assert_eq!(recursive_total, pooled_total);
        assert_eq!(recursive_ok, pooled_ok);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn recursive_mode_handles_a_plain_file_root() {
        let dir = unique_dir("mdu_test_single_file_root");
        let file = dir.join("only.txt");
        fs::write(&file, vec![0u8; 4096]).unwrap();

        let (total, ok) = run(file, true).unwrap();
        assert!(total > 0);
        assert!(ok);

        fs::remove_dir_all(&dir).unwrap();
    }
}
