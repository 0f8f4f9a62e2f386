//! The multi-root driver: iterates the root targets supplied on the command
//! line, running each through the pool or the recursive fallback and
//! printing its summary line as it completes.

use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::{pool, single};

/// Runs the tool over every root target in order, printing one summary line
/// per root to stdout as it completes.
///
/// The permission flag is the one piece of state carried across roots;
/// everything else -- the accumulator, active-worker count, shutdown flag --
/// is implicitly reset because each root gets a fresh
/// [`crate::queue::TaskQueue`].
///
/// # Errors
/// Propagates the first fatal error encountered (see error taxonomy); the
/// caller should treat that as cause to abort rather than continue with
/// remaining roots.
///
/// Returns `true` iff no permission error occurred across any root, which
/// the caller maps to the process exit status.
pub fn run_all(roots: &[PathBuf], jobs: usize) -> Result<bool> {
    let mut permission_ok = true;

    for root in roots {
        info!(root = %root.display(), jobs, "starting root traversal");
        let (total, ok) = if jobs <= 1 {
            single::run(root.clone(), permission_ok)?
        } else {
            pool::run(root.clone(), jobs, permission_ok)?
        };
        permission_ok = ok;
        println!("{total}\t{}", root.display());
    }

    Ok(permission_ok)
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
    fn permission_flag_carries_across_roots_but_counters_reset() {
        use std::os::unix::fs::PermissionsExt;

        if unsafe { libc::geteuid() } == 0 {
            return;
        }

        let base = unique_dir("mdu_test_driver_two_roots");
        let clean = base.join("clean");
        fs::create_dir(&clean).unwrap();
        fs::write(clean.join("f"), vec![0u8; 4096]).unwrap();

        let dirty = base.join("dirty");
        fs::create_dir(&dirty).unwrap();
        let locked = dirty.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let ok = run_all(&[clean.clone(), dirty.clone()], 1).unwrap();
        assert!(!ok, "permission failure on the second root should fail the whole invocation");

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn clean_tree_reports_success() {
        let dir = unique_dir("mdu_test_driver_clean");
        fs::write(dir.join("f"), vec![0u8; 4096]).unwrap();

        let ok = run_all(&[dir.clone()], 4).unwrap();
        assert!(ok);

        fs::remove_dir_all(&dir).unwrap();
    }
}
