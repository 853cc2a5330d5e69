//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::Result;
use crate::webdriver::BrowserKind;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// WebDriver endpoint settings
    #[serde(default)]
    pub webdriver: WebDriverConfig,

    /// Test page settings
    #[serde(default)]
    pub page: PageConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Suite settings
    #[serde(default)]
    pub suite: SuiteConfig,
}

/// WebDriver endpoint configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WebDriverConfig {
    /// Remote endpoint; when absent a local driver binary is launched
    pub url: Option<String>,

    /// Explicit path to the driver binary (chromedriver, geckodriver, ...)
    pub driver_path: Option<PathBuf>,

    /// Seconds to wait for a spawned driver to report ready
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_secs: u64,

    /// Seconds before any single HTTP request to the driver is abandoned
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Browser executable to use instead of the driver's default
    pub browser_binary: Option<PathBuf>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: None,
            driver_path: None,
            startup_timeout_secs: default_startup_timeout(),
            request_timeout_secs: default_request_timeout(),
            headless: default_headless(),
            browser_binary: None,
        }
    }
}

fn default_startup_timeout() -> u64 {
    10
}
fn default_request_timeout() -> u64 {
    30
}
fn default_headless() -> bool {
    true
}

/// Test page configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    /// Page file, relative to the working directory
    #[serde(default = "default_page_path")]
    pub path: PathBuf,

    /// Explicit page URL, takes precedence over `path`
    pub url: Option<String>,

    /// Milliseconds to wait for the page and the shim to be ready
    #[serde(default = "default_page_load")]
    pub load_timeout_ms: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            path: default_page_path(),
            url: None,
            load_timeout_ms: default_page_load(),
        }
    }
}

fn default_page_path() -> PathBuf {
    PathBuf::from("test/testpage.html")
}
fn default_page_load() -> u64 {
    10_000
}

impl PageConfig {
    /// Resolve the URL the browser should load
    ///
    /// Relative paths are resolved against `base`. The file does not need to
    /// exist locally when the driver runs on another host.
    pub fn resolve_url(&self, base: &Path) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let path = if self.path.is_relative() {
            base.join(&self.path)
        } else {
            self.path.clone()
        };
        format!("file://{}", path.display())
    }
}

/// Timeout settings in milliseconds
#[derive(Debug, Deserialize, Clone)]
pub struct Timeouts {
    /// Bound on every asynchronous payload
    #[serde(default = "default_script")]
    pub script_ms: u64,

    /// Deadline for every poll condition
    #[serde(default = "default_wait")]
    pub wait_ms: u64,

    /// Sleep between two predicate checks
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Bound on a whole case body. When unset it is derived from the step
    /// timeouts: the longest case chains one payload and four waits
    #[serde(default)]
    pub case_ms: Option<u64>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            script_ms: default_script(),
            wait_ms: default_wait(),
            poll_interval_ms: default_poll_interval(),
            case_ms: None,
        }
    }
}

fn default_script() -> u64 {
    3000
}
fn default_wait() -> u64 {
    3000
}
fn default_poll_interval() -> u64 {
    50
}
/// Floor for a derived case deadline
const MIN_CASE_MS: u64 = 30_000;

impl Timeouts {
    pub fn script(&self) -> Duration {
        Duration::from_millis(self.script_ms)
    }

    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    /// Never below 10ms so a predicate cannot flood the driver
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }

    /// Explicit `case_ms`, else twice the worst step chain with a 30s floor
    pub fn case(&self) -> Duration {
        let ms = self.case_ms.unwrap_or_else(|| {
            let chain = self.script_ms.saturating_add(self.wait_ms.saturating_mul(4));
            chain.saturating_mul(2).max(MIN_CASE_MS)
        });
        Duration::from_millis(ms)
    }
}

/// Suite configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SuiteConfig {
    /// Target browser family when neither `BROWSER` nor `--browser` is set
    #[serde(default)]
    pub browser: BrowserKind,

    /// Number of cases allowed to run at the same time
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::default(),
            jobs: default_jobs(),
        }
    }
}

fn default_jobs() -> usize {
    1
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
