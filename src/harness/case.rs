//! Test case definition and the context a case body runs in

use async_trait::async_trait;
use serde_json::Value;

use crate::bridge::{self, Bridge, Completion, Payload, PollCondition};
use crate::common::config::Timeouts;
use crate::common::{Error, Result};
use crate::webdriver::Locator;

use super::assertions::Assertions;
use super::gate::{RuntimeSkip, StaticSkip};

/// Why a case body stopped early
///
/// `Skip` aborts the remaining steps on purpose and ends the case as
/// skipped; `Fail` is recorded as a failed assertion.
#[derive(Debug)]
pub enum Flow {
    Skip(String),
    Fail(Error),
}

impl Flow {
    pub fn skip(reason: &str) -> Self {
        Flow::Skip(reason.to_string())
    }
}

impl From<Error> for Flow {
    fn from(e: Error) -> Self {
        Flow::Fail(e)
    }
}

pub type StepResult<T = ()> = std::result::Result<T, Flow>;

/// One named check of the suite
#[async_trait]
pub trait TestCase: Send + Sync {
    /// Name reported for the case
    fn name(&self) -> &'static str;

    /// Assertions the case makes on its non-skipped path, "Page loaded"
    /// included; `None` leaves the count unchecked
    fn plan(&self) -> Option<usize>;

    /// Rule checked before a session is created
    fn static_skip(&self) -> Option<StaticSkip> {
        None
    }

    /// Probe evaluated once the page has loaded
    fn runtime_skip(&self) -> Option<RuntimeSkip> {
        None
    }

    /// Must run after every other case of the suite
    fn runs_last(&self) -> bool {
        false
    }

    /// The case body; the page is loaded and "Page loaded" recorded
    async fn run(&self, ctx: &mut CaseContext<'_>) -> StepResult;
}

/// What a case body can use: its session, its assertions and the timeouts
pub struct CaseContext<'a> {
    bridge: &'a dyn Bridge,
    asserts: &'a mut Assertions,
    page_url: &'a str,
    timeouts: &'a Timeouts,
}

impl<'a> CaseContext<'a> {
    pub fn new(
        bridge: &'a dyn Bridge,
        asserts: &'a mut Assertions,
        page_url: &'a str,
        timeouts: &'a Timeouts,
    ) -> Self {
        Self {
            bridge,
            asserts,
            page_url,
            timeouts,
        }
    }

    /// URL the page was loaded from
    pub fn page_url(&self) -> &str {
        self.page_url
    }

    fn poll(&self) -> PollCondition {
        PollCondition::new(self.timeouts.wait(), self.timeouts.poll_interval())
    }

    // === Remote steps ===

    pub async fn run_sync(&self, payload: &Payload) -> Result<Value> {
        bridge::run_sync(self.bridge, payload).await
    }

    /// Run an async payload bounded by the script timeout
    pub async fn run_async(&self, payload: &Payload) -> Result<Completion> {
        bridge::run_async(self.bridge, payload, self.timeouts.script()).await
    }

    /// Evaluate a one-line script
    pub async fn eval(&self, script: &str) -> Result<Value> {
        self.bridge.execute_sync(script, Vec::new()).await
    }

    /// Wait until an element with `id` is in the DOM
    pub async fn wait_for_element(&self, id: &str) -> Result<()> {
        self.poll().until_located(self.bridge, &Locator::id(id)).await
    }

    /// Wait until `script` returns a truthy value
    pub async fn wait_until(&self, script: &str) -> Result<()> {
        self.poll().until_truthy(self.bridge, script).await
    }

    // === Assertions ===

    pub fn pass(&mut self, message: &str) {
        self.asserts.pass(message);
    }

    pub fn ok(&mut self, condition: bool, message: &str) -> bool {
        self.asserts.ok(condition, message)
    }

    pub fn equal(&mut self, actual: &Value, expected: &Value, message: &str) -> bool {
        self.asserts.equal(actual, expected, message)
    }
}
