//! WebDriver message types
//!
//! These types represent the W3C WebDriver wire protocol messages that the
//! suite needs. See: https://www.w3.org/TR/webdriver2/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Key under which W3C drivers return element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

// === Browser Families ===

/// Browser family targeted by a suite run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
    Edge,
}

impl BrowserKind {
    /// Name as used by the `BROWSER` environment variable and capabilities
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "MicrosoftEdge",
        }
    }

    /// Driver executable serving this family
    pub fn driver_binary(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chromedriver",
            BrowserKind::Firefox => "geckodriver",
            BrowserKind::Edge => "msedgedriver",
        }
    }

    /// Command line arguments that make the driver listen on `port`
    pub fn driver_args(&self, port: u16) -> Vec<String> {
        match self {
            BrowserKind::Firefox => vec!["--port".to_string(), port.to_string()],
            BrowserKind::Chrome | BrowserKind::Edge => vec![format!("--port={}", port)],
        }
    }

    /// Capabilities that give the browser fake capture devices and no
    /// permission prompts
    pub fn capabilities(&self, options: &CapabilityOptions) -> Value {
        match self {
            BrowserKind::Chrome | BrowserKind::Edge => {
                let mut args = vec![
                    "--use-fake-device-for-media-stream".to_string(),
                    "--use-fake-ui-for-media-stream".to_string(),
                    "--allow-file-access-from-files".to_string(),
                ];
                if options.headless {
                    args.push("--headless=new".to_string());
                }
                let mut browser_options = json!({ "args": args });
                if let Some(binary) = &options.browser_binary {
                    browser_options["binary"] = json!(binary);
                }
                let key = if *self == BrowserKind::Edge {
                    "ms:edgeOptions"
                } else {
                    "goog:chromeOptions"
                };
                let mut caps = json!({ "browserName": self.as_str() });
                caps[key] = browser_options;
                caps
            }
            BrowserKind::Firefox => {
                let mut args: Vec<String> = Vec::new();
                if options.headless {
                    args.push("-headless".to_string());
                }
                let mut firefox_options = json!({
                    "args": args,
                    "prefs": {
                        "media.navigator.streams.fake": true,
                        "media.navigator.permission.disabled": true,
                    },
                });
                if let Some(binary) = &options.browser_binary {
                    firefox_options["binary"] = json!(binary);
                }
                json!({
                    "browserName": self.as_str(),
                    "moz:firefoxOptions": firefox_options,
                })
            }
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserKind::Chrome => write!(f, "chrome"),
            BrowserKind::Firefox => write!(f, "firefox"),
            BrowserKind::Edge => write!(f, "edge"),
        }
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            "edge" | "microsoftedge" => Ok(BrowserKind::Edge),
            other => Err(format!(
                "unknown browser '{}'; expected one of chrome, firefox, edge",
                other
            )),
        }
    }
}

/// Options that shape the capabilities sent on session creation
#[derive(Debug, Clone, Default)]
pub struct CapabilityOptions {
    pub headless: bool,
    pub browser_binary: Option<String>,
}

/// What the driver reported about the browser it started
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrowserInfo {
    pub name: String,
    pub version: String,
    #[serde(skip)]
    pub semver: Option<semver::Version>,
}

impl BrowserInfo {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            semver: parse_browser_version(version),
        }
    }

    /// Major version, if the driver reported a parseable one
    pub fn major(&self) -> Option<u64> {
        self.semver.as_ref().map(|v| v.major)
    }
}

impl fmt::Display for BrowserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.version)
        }
    }
}

/// Parse browser versions leniently
///
/// Browsers report versions like `120.0.6099.109` or `115.0`, neither of
/// which is strict semver; only the first three numeric components are kept.
pub fn parse_browser_version(raw: &str) -> Option<semver::Version> {
    let mut parts = raw
        .split(|c: char| c == '.' || c == '-' || c == ' ')
        .map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().and_then(|p| p.ok()).unwrap_or(0);
    let patch = parts.next().and_then(|p| p.ok()).unwrap_or(0);
    Some(semver::Version::new(major, minor, patch))
}

// === Locators ===

/// An element of the remote DOM, located by its id attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    id: String,
}

impl Locator {
    pub fn id(id: &str) -> Self {
        Self { id: id.to_string() }
    }

    pub fn element_id(&self) -> &str {
        &self.id
    }

    /// W3C has no id strategy, so ids are sent as attribute selectors
    pub fn to_request(&self) -> FindElementRequest {
        FindElementRequest {
            using: "css selector".to_string(),
            value: format!("[id=\"{}\"]", self.id.replace('"', "\\\"")),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element #{}", self.id)
    }
}

/// Reference to an element in the remote DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(pub String);

impl ElementRef {
    /// Extract the reference from a find-element response value
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(|v| v.as_str())
            .map(|s| ElementRef(s.to_string()))
    }
}

// === Requests ===

/// Body of `POST /session`
#[derive(Debug, Clone, Serialize)]
pub struct NewSessionRequest {
    pub capabilities: NewSessionCapabilities,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionCapabilities {
    pub always_match: Value,
}

/// Body of `POST /session/{id}/timeouts`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_load: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<u64>,
}

/// Body of `POST /session/{id}/url`
#[derive(Debug, Clone, Serialize)]
pub struct NavigateRequest {
    pub url: String,
}

/// Body of `POST /session/{id}/execute/{sync,async}`
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteRequest {
    pub script: String,
    pub args: Vec<Value>,
}

/// Body of `POST /session/{id}/element`
#[derive(Debug, Clone, Serialize)]
pub struct FindElementRequest {
    pub using: String,
    pub value: String,
}

// === Responses ===

/// Every W3C response wraps its payload in `value`
#[derive(Debug, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    pub value: Value,
}

/// Error payload of a failed command
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

impl WireError {
    /// Recognise an error payload inside a response value
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.get("error").map(Value::is_string).unwrap_or(false) {
            serde_json::from_value(value.clone()).ok()
        } else {
            None
        }
    }
}

/// Value of a successful `POST /session`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionValue {
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// Value of `GET /status`
#[derive(Debug, Deserialize)]
pub struct StatusValue {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub message: String,
}
