//! Error types for the shim end-to-end suite
//!
//! Messages are written so that a failed case report can show them verbatim:
//! the harness reports `fail(err)` with the `Display` text of these values.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the suite
#[derive(Error, Debug)]
pub enum Error {
    // === Driver Errors ===
    #[error("WebDriver binary '{name}' not found. Searched: {searched}")]
    DriverNotFound { name: String, searched: String },

    #[error("WebDriver failed to start: {0}")]
    DriverStartFailed(String),

    #[error("WebDriver did not become ready within {0} seconds")]
    DriverSpawnTimeout(u64),

    // === Session Errors ===
    #[error("Failed to create browser session: {0}")]
    SessionCreateFailed(String),

    #[error("WebDriver error '{error}': {message}")]
    WebDriver { error: String, message: String },

    #[error("HTTP error talking to WebDriver: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver protocol error: {0}")]
    Protocol(String),

    // === Remote Execution Errors ===
    #[error("Remote script error: {0}")]
    RemoteScript(String),

    #[error("Script '{what}' did not complete within {ms}ms")]
    ScriptTimeout { what: String, ms: u64 },

    #[error("Waiting for {what} timed out after {ms}ms")]
    WaitTimeout { what: String, ms: u64 },

    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Failed to load test page '{url}': {reason}")]
    PageLoad { url: String, reason: String },

    #[error("Case '{case}' did not finish within {ms}ms")]
    CaseTimeout { case: String, ms: u64 },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Suite Errors ===
    #[error("{failed} of {total} assertions failed")]
    SuiteFailed { failed: usize, total: usize },
}

impl Error {
    /// Create a driver not found error with search paths
    pub fn driver_not_found<S: AsRef<str>>(name: &str, paths: &[S]) -> Self {
        Self::DriverNotFound {
            name: name.to_string(),
            searched: paths.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Create a script timeout error
    pub fn script_timeout(what: &str, ms: u64) -> Self {
        Self::ScriptTimeout {
            what: what.to_string(),
            ms,
        }
    }

    /// Create a wait timeout error
    pub fn wait_timeout(what: &str, ms: u64) -> Self {
        Self::WaitTimeout {
            what: what.to_string(),
            ms,
        }
    }

    /// Map a W3C error code and message onto our taxonomy
    pub fn from_wire(error: &str, message: &str) -> Self {
        match error {
            "javascript error" => Self::RemoteScript(message.to_string()),
            "script timeout" => Self::ScriptTimeout {
                what: "async script".to_string(),
                ms: 0,
            },
            "no such element" => Self::NoSuchElement(message.to_string()),
            "session not created" => Self::SessionCreateFailed(message.to_string()),
            _ => Self::WebDriver {
                error: error.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Whether this error is a deadline expiry of any kind
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::ScriptTimeout { .. }
                | Error::WaitTimeout { .. }
                | Error::CaseTimeout { .. }
                | Error::DriverSpawnTimeout(_)
        )
    }
}
