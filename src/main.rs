use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueHint};

/// Computes the total disk usage (in 512-byte blocks) of one or more paths.
#[derive(Parser)]
#[command(name = "mdu", version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Number of worker threads to use (single-threaded recursive fallback when 1)"
    )]
    jobs: u32,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase diagnostic verbosity (repeatable); overridden by RUST_LOG"
    )]
    verbose: u8,

    #[arg(
        value_name = "PATH",
        value_hint = ValueHint::AnyPath,
        required = true,
        num_args = 1..,
        help = "One or more root paths to sum"
    )]
    paths: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    mdu::logging::init(args.verbose);

    match mdu::driver::run_all(&args.paths, args.jobs as usize) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(%err, "mdu aborted");
            eprintln!("mdu: {err}");
            ExitCode::FAILURE
        }
    }
}
