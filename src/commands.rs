//! CLI command definitions
//!
//! Defines the clap commands for the suite CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::harness::Format;
use crate::webdriver::BrowserKind;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the suite against a browser
    Run(RunArgs),

    /// List the cases in execution order
    List,

    /// Check that the WebDriver endpoint accepts sessions
    Status {
        /// WebDriver endpoint (default: configured url, or a spawned driver)
        #[arg(long)]
        webdriver: Option<String>,

        /// Browser whose driver to spawn when no endpoint is given
        #[arg(long)]
        browser: Option<BrowserKind>,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Target browser (overrides BROWSER and the config file)
    #[arg(long)]
    pub browser: Option<BrowserKind>,

    /// WebDriver endpoint, e.g. http://localhost:4444
    #[arg(long)]
    pub webdriver: Option<String>,

    /// Path to the driver binary to spawn
    #[arg(long)]
    pub driver_path: Option<PathBuf>,

    /// Test page file loading the shim
    #[arg(long)]
    pub page: Option<PathBuf>,

    /// Test page URL (takes precedence over --page)
    #[arg(long)]
    pub page_url: Option<String>,

    /// Only run cases whose name contains this text (repeatable)
    #[arg(long = "only", short = 'o')]
    pub only: Vec<String>,

    /// Cases allowed to run at the same time
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Output format: pretty, tap or json
    #[arg(long, default_value = "pretty")]
    pub format: Format,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}
