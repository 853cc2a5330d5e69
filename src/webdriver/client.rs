//! WebDriver HTTP client
//!
//! Speaks the W3C WebDriver protocol to chromedriver, geckodriver,
//! msedgedriver or a Selenium grid. Every command is one JSON request; every
//! reply carries its payload (or an error object) under `value`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::bridge::{Bridge, SessionFactory};
use crate::common::{truncate, Error, Result};

use super::types::*;

/// HTTP client bound to one WebDriver endpoint
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    /// Endpoint without trailing slash (e.g. "http://localhost:9515")
    base_url: String,
    /// HTTP client
    http: reqwest::Client,
}

impl WebDriverClient {
    /// Create a client for `base_url`; `request_timeout` bounds every command
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one command and unwrap its `value`
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "WebDriver request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%status, body = %truncate(&text, 200), "WebDriver response");

        let parsed: WireResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Protocol(format!(
                "Invalid response (HTTP {}): {}: {}",
                status,
                e,
                truncate(&text, 200)
            ))
        })?;

        // A 2xx value may itself carry an `error` key (payload completions do)
        if !status.is_success() {
            return Err(match WireError::from_value(&parsed.value) {
                Some(err) => Error::from_wire(&err.error, &err.message),
                None => Error::Protocol(format!("HTTP {} without error payload", status)),
            });
        }
        Ok(parsed.value)
    }

    /// Query `GET /status`
    pub async fn status(&self) -> Result<StatusValue> {
        let value = self.send(Method::GET, "/status", None).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::Protocol(format!("Failed to parse status: {}", e)))
    }

    /// Whether the endpoint accepts new sessions
    pub async fn is_ready(&self) -> bool {
        self.status().await.map(|s| s.ready).unwrap_or(false)
    }

    /// Start a browser with the given `alwaysMatch` capabilities
    pub async fn new_session(&self, capabilities: Value) -> Result<Session> {
        let request = NewSessionRequest {
            capabilities: NewSessionCapabilities {
                always_match: capabilities,
            },
        };

        let value = self
            .send(Method::POST, "/session", Some(serde_json::to_value(&request)?))
            .await
            .map_err(|e| match e {
                Error::SessionCreateFailed(_) => e,
                other => Error::SessionCreateFailed(other.to_string()),
            })?;

        let created: NewSessionValue = serde_json::from_value(value)
            .map_err(|e| Error::SessionCreateFailed(format!("Unexpected reply: {}", e)))?;

        let caps = &created.capabilities;
        let browser = BrowserInfo::new(
            caps.get("browserName").and_then(Value::as_str).unwrap_or("unknown"),
            caps.get("browserVersion").and_then(Value::as_str).unwrap_or(""),
        );
        tracing::info!(session = %created.session_id, browser = %browser, "Session created");

        Ok(Session {
            client: self.clone(),
            id: created.session_id,
            browser,
            closed: AtomicBool::new(false),
        })
    }
}

/// One live browser session
#[derive(Debug)]
pub struct Session {
    client: WebDriverClient,
    id: String,
    browser: BrowserInfo,
    closed: AtomicBool,
}

impl Session {
    fn path(&self, suffix: &str) -> String {
        format!("/session/{}{}", self.id, suffix)
    }

    /// Configure the browser-side script and page-load timeouts
    pub async fn set_timeouts(&self, timeouts: TimeoutsRequest) -> Result<()> {
        self.client
            .send(
                Method::POST,
                &self.path("/timeouts"),
                Some(serde_json::to_value(&timeouts)?),
            )
            .await?;
        Ok(())
    }

    async fn execute(&self, endpoint: &str, script: &str, args: Vec<Value>) -> Result<Value> {
        let request = ExecuteRequest {
            script: script.to_string(),
            args,
        };
        self.client
            .send(
                Method::POST,
                &self.path(endpoint),
                Some(serde_json::to_value(&request)?),
            )
            .await
    }
}

#[async_trait]
impl Bridge for Session {
    fn browser(&self) -> &BrowserInfo {
        &self.browser
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let request = NavigateRequest {
            url: url.to_string(),
        };
        self.client
            .send(Method::POST, &self.path("/url"), Some(serde_json::to_value(&request)?))
            .await?;
        Ok(())
    }

    async fn execute_sync(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.execute("/execute/sync", script, args).await
    }

    async fn execute_async(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.execute("/execute/async", script, args).await
    }

    async fn find_element(&self, locator: &Locator) -> Result<ElementRef> {
        let value = self
            .client
            .send(
                Method::POST,
                &self.path("/element"),
                Some(serde_json::to_value(locator.to_request())?),
            )
            .await
            .map_err(|e| match e {
                Error::NoSuchElement(_) => Error::NoSuchElement(locator.to_string()),
                other => other,
            })?;
        ElementRef::from_value(&value)
            .ok_or_else(|| Error::Protocol(format!("Not an element reference: {}", value)))
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!(session = %self.id, "Deleting session");
        self.client.send(Method::DELETE, &self.path(""), None).await?;
        Ok(())
    }
}

/// Builds one WebDriver session per case
pub struct WebDriverFactory {
    client: WebDriverClient,
    browser: BrowserKind,
    options: CapabilityOptions,
    script_timeout: Duration,
    page_load_timeout: Duration,
}

impl WebDriverFactory {
    pub fn new(
        client: WebDriverClient,
        browser: BrowserKind,
        options: CapabilityOptions,
        script_timeout: Duration,
        page_load_timeout: Duration,
    ) -> Self {
        Self {
            client,
            browser,
            options,
            script_timeout,
            page_load_timeout,
        }
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    async fn build_session(&self) -> Result<Box<dyn Bridge>> {
        let session = self
            .client
            .new_session(self.browser.capabilities(&self.options))
            .await?;

        let timeouts = TimeoutsRequest {
            script: Some(self.script_timeout.as_millis() as u64),
            page_load: Some(self.page_load_timeout.as_millis() as u64),
            implicit: Some(0),
        };
        if let Err(e) = session.set_timeouts(timeouts).await {
            let _ = session.close().await;
            return Err(e);
        }

        Ok(Box::new(session))
    }
}
