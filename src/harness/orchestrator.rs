//! Per-case orchestration
//!
//! A case moves through
//! `Init -> PageLoaded -> (SkipCheck) -> Running -> Finalizing -> Terminal`
//! and always reaches exactly one terminal state: every error is caught here
//! and recorded, and [`Assertions::end`] is called once on every path.

use std::fmt;
use std::time::Duration;

use crate::bridge::{load_target_page, Bridge, PollCondition, SessionFactory};
use crate::common::config::Timeouts;
use crate::common::Error;

use super::assertions::Assertions;
use super::case::{CaseContext, Flow, StepResult, TestCase};
use super::gate::{should_skip, Target};
use super::outcome::CaseReport;

/// Suite-wide inputs every case needs
#[derive(Debug, Clone)]
pub struct CaseSettings {
    pub target: Target,
    pub page_url: String,
    pub page_load: Duration,
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseState {
    Init,
    PageLoaded,
    SkipCheck,
    Running,
    Finalizing,
    Terminal,
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaseState::Init => "init",
            CaseState::PageLoaded => "page-loaded",
            CaseState::SkipCheck => "skip-check",
            CaseState::Running => "running",
            CaseState::Finalizing => "finalizing",
            CaseState::Terminal => "terminal",
        };
        write!(f, "{}", name)
    }
}

fn enter(case: &str, state: CaseState) {
    tracing::debug!(case, state = %state, "case transition");
}

/// Run one case in a fresh session and produce its report
pub async fn run_case(case: &dyn TestCase, factory: &dyn SessionFactory, settings: &CaseSettings) -> CaseReport {
    let name = case.name();
    let mut asserts = Assertions::new(name);
    enter(name, CaseState::Init);

    if let Some(rule) = case.static_skip() {
        if should_skip(rule.applies(&settings.target), false) {
            tracing::info!(case = name, reason = rule.reason, "Skipping before session start");
            asserts.skip(rule.reason);
            return finish(name, asserts);
        }
    }

    let bridge = match factory.build_session().await {
        Ok(bridge) => bridge,
        Err(e) => {
            tracing::warn!(case = name, error = %e, "Could not start a session");
            asserts.fail(&e);
            return finish(name, asserts);
        }
    };
    asserts.set_browser(bridge.browser().to_string());

    let flow = drive(case, bridge.as_ref(), &mut asserts, settings).await;

    enter(name, CaseState::Finalizing);
    match flow {
        Ok(()) => {}
        Err(Flow::Skip(reason)) => asserts.skip(&reason),
        Err(Flow::Fail(e)) => asserts.fail(&e),
    }

    if let Err(e) = bridge.close().await {
        tracing::warn!(case = name, error = %e, "Failed to close session");
    }

    finish(name, asserts)
}

/// Everything between session start and finalization
async fn drive(
    case: &dyn TestCase,
    bridge: &dyn Bridge,
    asserts: &mut Assertions,
    settings: &CaseSettings,
) -> StepResult {
    let name = case.name();

    let readiness = PollCondition::new(settings.page_load, settings.timeouts.poll_interval());
    load_target_page(bridge, &settings.page_url, &readiness).await?;
    enter(name, CaseState::PageLoaded);

    // The static rule already let this case through
    if let Some(probe) = case.runtime_skip() {
        enter(name, CaseState::SkipCheck);
        if should_skip(false, probe.evaluate(bridge).await?) {
            tracing::info!(case = name, reason = probe.reason, "Skipping after runtime probe");
            return Err(Flow::skip(probe.reason));
        }
    }

    enter(name, CaseState::Running);
    if let Some(plan) = case.plan() {
        asserts.declare_plan(plan);
    }
    asserts.pass("Page loaded");

    let deadline = settings.timeouts.case();
    let mut ctx = CaseContext::new(bridge, asserts, &settings.page_url, &settings.timeouts);
    match tokio::time::timeout(deadline, case.run(&mut ctx)).await {
        Ok(result) => result,
        Err(_) => Err(Flow::Fail(Error::CaseTimeout {
            case: name.to_string(),
            ms: deadline.as_millis() as u64,
        })),
    }
}

fn finish(name: &str, asserts: Assertions) -> CaseReport {
    let report = asserts.end();
    enter(name, CaseState::Terminal);
    tracing::info!(
        case = name,
        outcome = report.outcome.label(),
        assertions = report.assertion_count(),
        "Case finished"
    );
    report
}
