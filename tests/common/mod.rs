//! Scripted fake browser for harness tests
//!
//! Scripts are answered by the first rule whose needle occurs in the script
//! text. A rule holds a sequence of replies; the last one repeats.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use shim_e2e::bridge::{Bridge, SessionFactory, PAGE_READY_SCRIPT};
use shim_e2e::common::config::Timeouts;
use shim_e2e::harness::{CaseSettings, Target};
use shim_e2e::webdriver::{BrowserInfo, BrowserKind, ElementRef, Locator};
use shim_e2e::{Error, Result};

pub const PAGE_URL: &str = "file:///work/test/testpage.html";

#[derive(Debug, Clone)]
pub enum Reply {
    Value(Value),
    ScriptError(&'static str),
    Hang,
}

impl Reply {
    pub fn value(v: Value) -> Self {
        Reply::Value(v)
    }
}

struct Rule {
    needle: &'static str,
    replies: Vec<Reply>,
    hits: AtomicUsize,
}

impl Rule {
    fn next(&self) -> Reply {
        let hit = self.hits.fetch_add(1, Ordering::SeqCst);
        self.replies[hit.min(self.replies.len() - 1)].clone()
    }
}

#[derive(Default)]
pub struct FakeState {
    sync_rules: Vec<Rule>,
    async_rules: Vec<Rule>,
    /// element id -> number of failed lookups before it appears
    elements: HashMap<String, usize>,
    lookups: Mutex<HashMap<String, usize>>,
    navigate_error: Option<&'static str>,
    pub scripts: Mutex<Vec<String>>,
    pub sessions: AtomicUsize,
    pub closes: AtomicUsize,
}

impl FakeState {
    pub fn scripts_containing(&self, needle: &str) -> usize {
        self.scripts
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.contains(needle))
            .count()
    }
}

pub struct FakeBuilder {
    state: FakeState,
    browser: BrowserInfo,
}

impl FakeBuilder {
    pub fn new() -> Self {
        Self {
            state: FakeState::default(),
            browser: BrowserInfo::new("firefox", "115.0"),
        }
    }

    pub fn browser(mut self, name: &str, version: &str) -> Self {
        self.browser = BrowserInfo::new(name, version);
        self
    }

    /// Page and shim are ready on the first check
    pub fn page_ready(self) -> Self {
        self.on_sync(PAGE_READY_SCRIPT, vec![Reply::value(json!(true))])
    }

    pub fn on_sync(mut self, needle: &'static str, replies: Vec<Reply>) -> Self {
        self.state.sync_rules.push(Rule {
            needle,
            replies,
            hits: AtomicUsize::new(0),
        });
        self
    }

    pub fn on_async(mut self, needle: &'static str, replies: Vec<Reply>) -> Self {
        self.state.async_rules.push(Rule {
            needle,
            replies,
            hits: AtomicUsize::new(0),
        });
        self
    }

    /// Element `id` is found after `misses` failed lookups
    pub fn element(mut self, id: &str, misses: usize) -> Self {
        self.state.elements.insert(id.to_string(), misses);
        self
    }

    pub fn navigate_fails(mut self, message: &'static str) -> Self {
        self.state.navigate_error = Some(message);
        self
    }

    pub fn build(self) -> FakeFactory {
        FakeFactory {
            state: Arc::new(self.state),
            browser: self.browser,
            fail_build: false,
        }
    }
}

pub struct FakeFactory {
    pub state: Arc<FakeState>,
    browser: BrowserInfo,
    pub fail_build: bool,
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn build_session(&self) -> Result<Box<dyn Bridge>> {
        if self.fail_build {
            return Err(Error::SessionCreateFailed("no browser available".into()));
        }
        self.state.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeBrowser {
            state: self.state.clone(),
            browser: self.browser.clone(),
        }))
    }
}

pub struct FakeBrowser {
    pub state: Arc<FakeState>,
    browser: BrowserInfo,
}

impl FakeBrowser {
    pub fn from_factory(factory: &FakeFactory) -> Self {
        Self {
            state: factory.state.clone(),
            browser: factory.browser.clone(),
        }
    }

    async fn answer(rules: &[Rule], script: &str) -> Result<Value> {
        let reply = rules
            .iter()
            .find(|r| script.contains(r.needle))
            .map(|r| r.next())
            .unwrap_or(Reply::ScriptError("unexpected script"));
        match reply {
            Reply::Value(v) => Ok(v),
            Reply::ScriptError(m) => Err(Error::RemoteScript(m.to_string())),
            Reply::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

#[async_trait]
impl Bridge for FakeBrowser {
    fn browser(&self) -> &BrowserInfo {
        &self.browser
    }

    async fn navigate(&self, _url: &str) -> Result<()> {
        match self.state.navigate_error {
            Some(message) => Err(Error::WebDriver {
                error: "unknown error".into(),
                message: message.into(),
            }),
            None => Ok(()),
        }
    }

    async fn execute_sync(&self, script: &str, _args: Vec<Value>) -> Result<Value> {
        self.state.scripts.lock().unwrap().push(script.to_string());
        Self::answer(&self.state.sync_rules, script).await
    }

    async fn execute_async(&self, script: &str, _args: Vec<Value>) -> Result<Value> {
        self.state.scripts.lock().unwrap().push(script.to_string());
        Self::answer(&self.state.async_rules, script).await
    }

    async fn find_element(&self, locator: &Locator) -> Result<ElementRef> {
        let id = locator.element_id();
        if let Some(misses) = self.state.elements.get(id) {
            let mut lookups = self.state.lookups.lock().unwrap();
            let seen = lookups.entry(id.to_string()).or_insert(0);
            *seen += 1;
            if *seen > *misses {
                return Ok(ElementRef(format!("el-{}", id)));
            }
        }
        Err(Error::NoSuchElement(locator.to_string()))
    }

    async fn close(&self) -> Result<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Short deadlines so timeout paths finish quickly
pub fn fast_timeouts() -> Timeouts {
    Timeouts {
        script_ms: 200,
        wait_ms: 200,
        poll_interval_ms: 10,
        case_ms: Some(5_000),
    }
}

pub fn settings(browser: BrowserKind) -> CaseSettings {
    CaseSettings {
        target: Target::new(browser),
        page_url: PAGE_URL.to_string(),
        page_load: Duration::from_millis(200),
        timeouts: fast_timeouts(),
    }
}

/// The async completion a successful getUserMedia payload hands back
pub fn captured_stream() -> Reply {
    Reply::value(json!({"error": null, "value": {"streamClass": "MediaStream"}}))
}

pub fn rejected(name: &'static str) -> Reply {
    Reply::value(json!({"error": name, "value": null}))
}
