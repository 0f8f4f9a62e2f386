use std::path::PathBuf;

/// One unit of pending work for the worker pool.
///
/// The source program stored a function pointer inside each task so that
/// shutdown tasks could share the same struct as ordinary work. A tagged
/// variant does the same job without an indirect call: workers branch on the
/// tag and never need to dereference a pointer to know what to do.
#[derive(Debug)]
pub enum Task {
    /// Visit the directory at this path and fold its contents into the total.
    Work(PathBuf),
    /// Causes the receiving worker to exit its loop. Carries no path.
    Sentinel,
}

impl Task {
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel)
    }
}
