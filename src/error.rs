use std::fmt;
use std::path::PathBuf;

/// Errors that can surface from the traversal engine.
///
/// Per the error-handling design, only the spawn/worker/close-invariant
/// variants here are ever surfaced as `Err`. Permission failures on a single
/// directory are recoverable and are folded into the shared permission flag
/// instead (see [`crate::queue::TaskQueue`]), never represented as an
/// `MduError`. A poisoned traversal-state mutex is likewise not a variant
/// here: it can only follow an earlier worker panic, so it surfaces as a
/// panic itself rather than a second, redundant `Err` path.
#[derive(Debug)]
pub enum MduError {
    /// A worker thread could not be spawned.
    ThreadSpawn(std::io::Error),
    /// A worker thread panicked instead of returning normally.
    WorkerPanicked,
    /// Closing a directory handle failed; treated as a corrupted invariant.
    CloseFailed(PathBuf, std::io::Error),
}

impl fmt::Display for MduError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreadSpawn(err) => write!(f, "failed to spawn worker thread: {err}"),
            Self::WorkerPanicked => write!(f, "a worker thread panicked"),
            Self::CloseFailed(path, err) => {
                write!(f, "couldn't close directory '{}': {err}", path.display())
            }
        }
    }
}

impl std::error::Error for MduError {}

pub type Result<T> = std::result::Result<T, MduError>;
