//! Ambient logging setup. Stdout is reserved exclusively for the
//! `<blocks>\t<root>` summary lines; all operational diagnostics go through
//! `tracing` to stderr, with verbosity driven by `-v`/`-vv`/`-vvv` or
//! overridden by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `verbosity` is the number of times `-v` was supplied on the command
/// line: 0 → warn, 1 → info, 2 → debug, 3+ → trace. `RUST_LOG`, when set,
/// takes precedence over `verbosity` entirely.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
