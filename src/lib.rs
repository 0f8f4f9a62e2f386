//! A parallel disk-usage summary engine.
//!
//! The core is the mutex/condvar task queue (`queue`), worker pool (`pool`),
//! and single-threaded recursive fallback (`single`), all sharing the
//! directory visit algorithm in `visit`. The `driver` module wires those
//! together into the multi-root behavior the binary target exposes.

pub mod driver;
pub mod error;
pub mod logging;
pub mod pool;
pub mod queue;
pub mod single;
pub mod stat;
pub mod task;
pub mod visit;

#[cfg(all(
    feature = "mimalloc",
    any(target_os = "linux", target_os = "macos", target_os = "android")
))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub use error::{MduError, Result};
pub use task::Task;
