//! m,n,k game solver CLI
//!
//! Reads solve requests from a file or stdin and prints one verdict per
//! request.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use nmk::protocol::run_session;
use nmk::Solver;

#[derive(Parser)]
#[command(name = "nmk")]
#[command(version, about = "Exact solver for m,n,k connection games", long_about = None)]
struct Cli {
    /// Request file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_micros()
        .init();

    let solver = Solver::new();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    let stats = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open request file {}", path.display()))?;
            run_session(BufReader::new(file), &mut output, &solver)
        }
        None => run_session(io::stdin().lock(), &mut output, &solver),
    }
    .context("Request session failed")?;

    info!(
        "session done: {} solved, {} invalid commands, {} rejected",
        stats.solved, stats.invalid_commands, stats.rejected
    );
    Ok(())
}
