//! Skip-decision gate
//!
//! Two independent mechanisms decide that a case does not apply: a static
//! rule on the target browser, checked before any session exists, and a
//! runtime probe evaluated in the loaded page before the plan is declared.

use crate::bridge::{is_truthy, Bridge};
use crate::common::{Error, Result};
use crate::webdriver::BrowserKind;

/// Environment variable naming the target browser family
pub const BROWSER_ENV: &str = "BROWSER";

/// The environment a suite run targets, read once at suite start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub browser: BrowserKind,
}

impl Target {
    pub fn new(browser: BrowserKind) -> Self {
        Self { browser }
    }

    /// Precedence: `flag`, then `BROWSER`, then the configured `fallback`
    pub fn resolve(flag: Option<BrowserKind>, fallback: BrowserKind) -> Result<Self> {
        match flag {
            Some(browser) => Ok(Self::new(browser)),
            None => Self::from_env(fallback),
        }
    }

    /// `BROWSER` if set, otherwise `fallback`
    pub fn from_env(fallback: BrowserKind) -> Result<Self> {
        Self::from_value(std::env::var(BROWSER_ENV).ok().as_deref(), fallback)
    }

    /// Interpret a `BROWSER` value; unset or blank means `fallback`
    pub fn from_value(value: Option<&str>, fallback: BrowserKind) -> Result<Self> {
        match value {
            Some(value) if !value.trim().is_empty() => value
                .parse()
                .map(Self::new)
                .map_err(|e: String| Error::Config(format!("{}: {}", BROWSER_ENV, e))),
            _ => Ok(Self::new(fallback)),
        }
    }
}

/// Static rule: the case never applies to these browsers
#[derive(Debug, Clone, Copy)]
pub struct StaticSkip {
    pub browsers: &'static [BrowserKind],
    pub reason: &'static str,
}

impl StaticSkip {
    pub fn applies(&self, target: &Target) -> bool {
        self.browsers.contains(&target.browser)
    }
}

/// Runtime probe: a read-only script whose truthy result skips the case
///
/// The script must not change page state, so evaluating it twice gives the
/// same answer.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeSkip {
    pub script: &'static str,
    pub reason: &'static str,
}

impl RuntimeSkip {
    pub async fn evaluate(&self, bridge: &dyn Bridge) -> Result<bool> {
        let value = bridge.execute_sync(self.script, Vec::new()).await?;
        let skip = is_truthy(&value);
        tracing::debug!(skip, reason = self.reason, "Runtime skip probe");
        Ok(skip)
    }
}

/// Either mechanism is enough to skip
pub fn should_skip(static_flag: bool, runtime: bool) -> bool {
    static_flag || runtime
}
