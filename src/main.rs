//! Story Harness CLI
//!
//! Runs the story spoiler API conformance scenario and exits non-zero when
//! any step fails.

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use story_harness::{cli, commands, common::logging};

#[derive(Parser)]
#[command(name = "story-harness", about = "Conformance harness for the story spoiler API")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output and debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let guard = logging::init_cli(cli.verbose, cli.log_file.as_deref());

    let code = match cli::dispatch(cli.command, cli.verbose).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };

    // Flush buffered file logs; process::exit skips destructors
    drop(guard);
    std::process::exit(code);
}
