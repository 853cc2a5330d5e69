//! shim-e2e - end-to-end checks for the WebRTC media-stream shim
//!
//! Drives a real browser through WebDriver and verifies srcObject handling,
//! impossible-constraint rejection and console logging with the shim loaded.

use std::path::PathBuf;

use clap::Parser;
use shim_e2e::common::{config::Config, logging};
use shim_e2e::{cli, commands::Commands, Result};

#[derive(Parser)]
#[command(name = "shim-e2e", about = "End-to-end WebDriver suite for the media-stream shim")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let result = match load_config(cli.config.as_ref()) {
        Ok(config) => cli::dispatch(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
