//! The directory visit algorithm, shared verbatim by both the pooled and
//! the single-threaded recursive traversal modes. The two modes differ only
//! in what they do with a discovered subdirectory -- push it onto the
//! shared queue, or recurse into it inline -- so that policy is left to the
//! caller via the `on_subdirectory` callback.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{MduError, Result};
use crate::stat::{self, Dir};

/// Outcome of visiting a single path, before the caller has acted on any
/// discovered subdirectories.
pub struct Visited {
    /// Blocks to add to the running total for this path alone (the path's
    /// own size if it wasn't a directory, or the sum of everything counted
    /// while iterating it -- its own `.` entry plus every regular file).
    pub blocks: u64,
    /// `true` if opening this path as a directory failed with a permission
    /// error; the caller clears the shared permission flag in that case.
    pub permission_denied: bool,
}

/// Visits the directory (or file) at `path`.
///
/// `on_subdirectory` is invoked once per subdirectory discovered while
/// iterating `path`'s entries (never for `path` itself, and never for `.`
/// or `..`). It is the caller's choice whether that means "enqueue" or
/// "recurse now".
///
/// # Errors
/// Returns [`MduError::CloseFailed`] if closing the directory handle fails;
/// per the error taxonomy this is fatal and the caller should abort the
/// process after a best-effort diagnostic.
pub fn visit(path: &Path, mut on_subdirectory: impl FnMut(PathBuf)) -> Result<Visited> {
    let Some(status) = stat::lstat(path).unwrap_or(None) else {
        // The root (or a path enqueued a moment ago) vanished between
        // enumeration and visit. Silent skip matches the emulated tool.
        return Ok(Visited {
            blocks: 0,
            permission_denied: false,
        });
    };

    if !status.is_dir {
        return Ok(Visited {
            blocks: status.blocks,
            permission_denied: false,
        });
    }

    let mut dir = match Dir::open(path) {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("mdu: cannot read directory '{}': Permission denied", path.display());
            warn!(path = %path.display(), error = %err, "directory open failed");
            return Ok(Visited {
                blocks: status.blocks,
                permission_denied: true,
            });
        }
    };

    let mut blocks = 0u64;
    loop {
        let name = match dir.read_name() {
            Ok(Some(name)) => name,
            Ok(None) => break,
            Err(err) => {
                // A transient read error mid-directory: contribute the
                // parent's own block count and stop iterating. Preserved for
                // compatibility with the emulated tool even though the
                // original intent here is ambiguous.
                warn!(path = %path.display(), error = %err, "readdir failed mid-iteration");
                blocks += status.blocks;
                break;
            }
        };

        if name.as_slice() == b"." {
            // The self-entry is how the directory's own blocks are attributed.
            blocks += status.blocks;
            continue;
        }
        if name.as_slice() == b".." {
            continue;
        }

        let child = stat::join(path, &name);
        match stat::lstat(&child) {
            Ok(Some(child_status)) => {
                if child_status.is_dir {
                    on_subdirectory(child);
                } else {
                    blocks += child_status.blocks;
                }
            }
            Ok(None) | Err(_) => {
                // Per-entry status failure mid-directory: contribute the
                // parent's block count and abort iteration of this directory.
                blocks += status.blocks;
                break;
            }
        }
    }

    dir.close()
        .map_err(|err| MduError::CloseFailed(path.to_path_buf(), err))?;

    Ok(Visited {
        blocks,
        permission_denied: false,
    })
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
    fn visiting_a_regular_file_contributes_its_own_blocks_only() {
        let dir = unique_dir("mdu_test_visit_file");
        let file = dir.join("a");
        fs::write(&file, vec![0u8; 8192]).unwrap();

        let visited = visit(&file, |_| panic!("a file has no subdirectories")).unwrap();
        assert!(visited.blocks > 0);
        assert!(!visited.permission_denied);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn visiting_empty_directory_counts_only_its_own_entry() {
        let dir = unique_dir("mdu_test_visit_empty_dir");

        let mut subdirs = Vec::new();
        let visited = visit(&dir, |p| subdirs.push(p)).unwrap();
        assert!(subdirs.is_empty());
        assert!(visited.blocks > 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn visiting_directory_with_file_and_subdir_reports_both() {
        let dir = unique_dir("mdu_test_visit_mixed_dir");
        fs::write(dir.join("file.txt"), b"hello").unwrap();
        fs::create_dir(dir.join("sub")).unwrap();

        let mut subdirs = Vec::new();
        let visited = visit(&dir, |p| subdirs.push(p)).unwrap();

        assert_eq!(subdirs.len(), 1);
        assert_eq!(subdirs[0], dir.join("sub"));
        assert!(visited.blocks > 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn visiting_missing_path_contributes_zero() {
        let missing = std::env::temp_dir().join("mdu_test_visit_missing_xyz");
        let _ = fs::remove_file(&missing);
        let visited = visit(&missing, |_| panic!("no subdirectories")).unwrap();
        assert_eq!(visited.blocks, 0);
        assert!(!visited.permission_denied);
    }

    #[test]
    #[cfg_attr(not(unix), ignore)]
    fn unreadable_directory_sets_permission_denied_and_contributes_its_own_blocks() {
        use std::os::unix::fs::PermissionsExt;

        if unsafe { libc::geteuid() } == 0 {
            // root ignores directory permission bits; skip under a root test runner.
            return;
        }

        let dir = unique_dir("mdu_test_visit_unreadable");
        let locked = dir.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let visited = visit(&locked, |_| panic!("no subdirectories")).unwrap();
        assert!(visited.permission_denied);
        assert!(visited.blocks > 0);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }
}
