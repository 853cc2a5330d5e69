//! Condition poller
//!
//! One bounded retry loop serves every wait in the suite: a predicate is
//! checked, the loop sleeps for the poll interval, and gives up with
//! `WaitTimeout` once the deadline has passed. A predicate that errors
//! (element not there yet, page still navigating) counts as "not yet".

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use super::Bridge;
use crate::common::{Error, Result};
use crate::webdriver::Locator;

/// Deadline and interval for one wait
///
/// Built right before a wait and dropped right after it.
#[derive(Debug, Clone, Copy)]
pub struct PollCondition {
    pub deadline: Duration,
    pub interval: Duration,
}

impl PollCondition {
    pub fn new(deadline: Duration, interval: Duration) -> Self {
        Self { deadline, interval }
    }

    /// Wait until `script` returns a truthy value
    pub async fn until_truthy(&self, bridge: &dyn Bridge, script: &str) -> Result<()> {
        let what = format!("`{}`", crate::common::truncate(script.trim(), 80));
        wait_until(&what, self.deadline, self.interval, move || async move {
            bridge
                .execute_sync(script, Vec::new())
                .await
                .map(|v| is_truthy(&v))
        })
        .await
    }

    /// Wait until an element matching `locator` is in the DOM
    pub async fn until_located(&self, bridge: &dyn Bridge, locator: &Locator) -> Result<()> {
        wait_until(&locator.to_string(), self.deadline, self.interval, move || async move {
            bridge.find_element(locator).await.map(|_| true)
        })
        .await
    }
}

/// Check `check` until it yields `true` or `deadline` has elapsed
///
/// Each check is itself bounded by the remaining time, so a predicate that
/// never answers cannot stretch the wait past the deadline. The first check
/// always runs, with at least one `interval` to answer, so a zero deadline
/// still accepts a condition that already holds.
pub async fn wait_until<F, Fut>(what: &str, deadline: Duration, interval: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline_ms = deadline.as_millis() as u64;
    let expires = Instant::now() + deadline;
    let mut attempts: u32 = 0;

    loop {
        let remaining = expires.saturating_duration_since(Instant::now());
        let budget = if attempts == 0 {
            remaining.max(interval)
        } else if remaining.is_zero() {
            break;
        } else {
            remaining
        };

        attempts += 1;
        match tokio::time::timeout(budget, check()).await {
            Ok(Ok(true)) => {
                tracing::debug!(what, attempts, "Condition met");
                return Ok(());
            }
            Ok(Ok(false)) => {}
            Ok(Err(e)) => {
                tracing::trace!(what, attempts, error = %e, "Condition check failed, retrying");
            }
            Err(_) => break,
        }

        let remaining = expires.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(interval.min(remaining)).await;
    }

    tracing::debug!(what, attempts, deadline_ms, "Condition timed out");
    Err(Error::wait_timeout(what, deadline_ms))
}

/// JavaScript truthiness of a returned value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
