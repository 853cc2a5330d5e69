//! Remote execution bridge
//!
//! Everything the harness does inside the browser goes through the [`Bridge`]
//! trait: navigating, running synchronous and asynchronous script payloads,
//! and locating elements. The WebDriver session implements it; tests
//! implement it with scripted fakes.

pub mod poll;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::webdriver::{BrowserInfo, ElementRef, Locator};

pub use poll::{is_truthy, wait_until, PollCondition};

/// One remote browser context under automated control
///
/// A bridge is owned by exactly one case. Calls are issued strictly one
/// after another; implementations need no internal ordering.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Browser name and version reported when the session was created
    fn browser(&self) -> &BrowserInfo;

    /// Load `url` in the current top-level context
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Run a script body and return its `return` value
    async fn execute_sync(&self, script: &str, args: Vec<Value>) -> Result<Value>;

    /// Run a script body that receives a completion callback as its last
    /// argument; resolves with the value handed to that callback
    async fn execute_async(&self, script: &str, args: Vec<Value>) -> Result<Value>;

    /// Locate a single element, failing with `NoSuchElement` if absent
    async fn find_element(&self, locator: &Locator) -> Result<ElementRef>;

    /// Release the remote browser
    async fn close(&self) -> Result<()>;
}

/// Creates one fresh session per case
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn build_session(&self) -> Result<Box<dyn Bridge>>;
}

// === Payloads ===

/// Whether a payload returns directly or through a completion callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Sync,
    Async,
}

/// A self-contained unit of behavior run inside the browser
///
/// Async payload bodies call `done(error, value)` exactly once. A non-empty
/// `error` is reported as a [`CapabilityError`]; `value` is the payload's
/// declared output and replaces any state a page would otherwise keep in
/// globals between steps.
#[derive(Debug, Clone, Copy)]
pub struct Payload {
    pub name: &'static str,
    pub kind: PayloadKind,
    pub body: &'static str,
}

const ASYNC_PRELUDE: &str = r#"var __complete = arguments[arguments.length - 1];
var done = function (error, value) {
  __complete({
    error: (error === undefined || error === null) ? null : String(error),
    value: value === undefined ? null : value
  });
};
"#;

impl Payload {
    pub const fn sync(name: &'static str, body: &'static str) -> Self {
        Self {
            name,
            kind: PayloadKind::Sync,
            body,
        }
    }

    pub const fn asynchronous(name: &'static str, body: &'static str) -> Self {
        Self {
            name,
            kind: PayloadKind::Async,
            body,
        }
    }

    /// Script text as sent over the wire
    pub fn script(&self) -> String {
        match self.kind {
            PayloadKind::Sync => self.body.to_string(),
            PayloadKind::Async => format!("{}{}", ASYNC_PRELUDE, self.body),
        }
    }
}

/// The tested API took its error path (e.g. a rejected getUserMedia call)
///
/// This is an expected value, not a harness fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityError {
    pub name: String,
}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Result of one asynchronous payload, resolved exactly once
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Succeeded(Value),
    Reported(CapabilityError),
}

impl Completion {
    /// Interpret the value the browser handed to the completion callback
    pub fn from_callback(raw: Value) -> Self {
        match raw {
            Value::Object(ref map) if map.contains_key("error") => {
                match map.get("error") {
                    Some(Value::String(name)) if !name.is_empty() => {
                        Completion::Reported(CapabilityError { name: name.clone() })
                    }
                    _ => Completion::Succeeded(map.get("value").cloned().unwrap_or(Value::Null)),
                }
            }
            // Plain callback(err) style
            Value::String(name) if !name.is_empty() => {
                Completion::Reported(CapabilityError { name })
            }
            Value::String(_) | Value::Bool(false) => Completion::Succeeded(Value::Null),
            other => Completion::Succeeded(other),
        }
    }

    pub fn error(&self) -> Option<&CapabilityError> {
        match self {
            Completion::Reported(e) => Some(e),
            Completion::Succeeded(_) => None,
        }
    }

    /// Declared output of a successful payload
    pub fn value(&self) -> Option<&Value> {
        match self {
            Completion::Succeeded(v) => Some(v),
            Completion::Reported(_) => None,
        }
    }
}

// === Bridge operations ===

/// Run a synchronous payload
pub async fn run_sync(bridge: &dyn Bridge, payload: &Payload) -> Result<Value> {
    tracing::debug!(payload = payload.name, "run_sync");
    bridge.execute_sync(&payload.script(), Vec::new()).await
}

/// Run an asynchronous payload, racing its completion against `timeout`
///
/// The in-flight request is abandoned on expiry; the browser may still be
/// running the payload.
pub async fn run_async(bridge: &dyn Bridge, payload: &Payload, timeout: Duration) -> Result<Completion> {
    tracing::debug!(payload = payload.name, timeout_ms = timeout.as_millis() as u64, "run_async");
    let ms = timeout.as_millis() as u64;

    match tokio::time::timeout(timeout, bridge.execute_async(&payload.script(), Vec::new())).await {
        Ok(Ok(raw)) => {
            let completion = Completion::from_callback(raw);
            if let Some(err) = completion.error() {
                tracing::debug!(payload = payload.name, error = %err, "payload reported an error");
            }
            Ok(completion)
        }
        Ok(Err(Error::ScriptTimeout { .. })) | Err(_) => Err(Error::script_timeout(payload.name, ms)),
        Ok(Err(e)) => Err(e),
    }
}

/// Script that holds until the page and the shim under test are usable
pub const PAGE_READY_SCRIPT: &str =
    "return document.readyState === 'complete' && typeof window.adapter !== 'undefined';";

/// Load the target page and wait until script injection is safe
pub async fn load_target_page(bridge: &dyn Bridge, url: &str, readiness: &PollCondition) -> Result<()> {
    tracing::debug!(url, "Loading test page");
    bridge.navigate(url).await.map_err(|e| Error::PageLoad {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    readiness
        .until_truthy(bridge, PAGE_READY_SCRIPT)
        .await
        .map_err(|e| Error::PageLoad {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_async_payload_gets_prelude() {
        let payload = Payload::asynchronous("probe", "done(null, 1);");
        let script = payload.script();
        assert!(script.starts_with("var __complete = arguments[arguments.length - 1];"));
        assert!(script.ends_with("done(null, 1);"));

        let sync = Payload::sync("probe", "return 1;");
        assert_eq!(sync.script(), "return 1;");
    }

    #[test]
    fn test_completion_from_wrapped_callback() {
        let ok = Completion::from_callback(json!({"error": null, "value": {"streamClass": "MediaStream"}}));
        assert_eq!(ok.value().unwrap()["streamClass"], "MediaStream");
        assert!(ok.error().is_none());

        let failed = Completion::from_callback(json!({"error": "OverconstrainedError", "value": null}));
        assert_eq!(failed.error().unwrap().name, "OverconstrainedError");
    }

    #[test]
    fn test_empty_error_indicator_is_success() {
        let c = Completion::from_callback(json!({"error": "", "value": 3}));
        assert_eq!(c, Completion::Succeeded(json!(3)));
    }

    #[test]
    fn test_completion_from_plain_callback() {
        assert_eq!(
            Completion::from_callback(json!("NotFoundError")).error().unwrap().name,
            "NotFoundError"
        );
        assert_eq!(Completion::from_callback(Value::Null), Completion::Succeeded(Value::Null));
        assert_eq!(Completion::from_callback(json!("")), Completion::Succeeded(Value::Null));
    }
}
