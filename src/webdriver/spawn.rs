//! Local driver launching
//!
//! When no remote endpoint is configured the suite starts the driver binary
//! for the target browser itself, on a free loopback port, and owns the
//! process until the run ends.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use crate::bridge::wait_until;
use crate::common::{Error, Result};

use super::client::WebDriverClient;
use super::types::BrowserKind;

/// Interval between two readiness probes
const READY_POLL_MS: u64 = 100;

/// A driver process started by this run
pub struct DriverProcess {
    child: Child,
}

impl DriverProcess {
    /// Launch the driver for `browser` and wait until it accepts sessions
    pub async fn launch(
        browser: BrowserKind,
        explicit: Option<&Path>,
        startup_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<(Self, WebDriverClient)> {
        let binary = locate_driver(browser, explicit)?;
        let port = free_port()?;
        let url = format!("http://127.0.0.1:{}", port);

        tracing::info!(driver = %binary.display(), port, "Starting WebDriver");
        let child = Command::new(&binary)
            .args(browser.driver_args(port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::DriverStartFailed(format!("Failed to start {}: {}", binary.display(), e))
            })?;

        let mut process = Self { child };
        let client = WebDriverClient::new(&url, request_timeout)?;

        let probe = &client;
        let ready = wait_until(
            "WebDriver readiness",
            startup_timeout,
            Duration::from_millis(READY_POLL_MS),
            move || async move { Ok(probe.is_ready().await) },
        )
        .await;

        if let Err(e) = ready {
            if let Ok(Some(status)) = process.child.try_wait() {
                return Err(Error::DriverStartFailed(format!(
                    "{} exited during startup with {}",
                    binary.display(),
                    status
                )));
            }
            process.shutdown().await;
            return Err(match e {
                Error::WaitTimeout { .. } => Error::DriverSpawnTimeout(startup_timeout.as_secs()),
                other => other,
            });
        }

        tracing::info!(%url, "WebDriver ready");
        Ok((process, client))
    }

    /// Stop the driver process
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!(error = %e, "Failed to stop WebDriver process");
        }
    }
}

/// Find the driver binary: explicit path first, then `PATH`
pub fn locate_driver(browser: BrowserKind, explicit: Option<&Path>) -> Result<PathBuf> {
    let name = browser.driver_binary();

    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::driver_not_found(name, &[path.display().to_string()]));
    }

    which::which(name).map_err(|_| Error::driver_not_found(name, &["PATH"]))
}

/// Ask the OS for an unused loopback port
fn free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_driver_is_reported() {
        let err = locate_driver(BrowserKind::Firefox, Some(Path::new("/nonexistent/geckodriver")))
            .unwrap_err();
        match err {
            Error::DriverNotFound { name, searched } => {
                assert_eq!(name, "geckodriver");
                assert!(searched.contains("/nonexistent/geckodriver"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_free_port_is_nonzero() {
        assert_ne!(free_port().unwrap(), 0);
    }
}
