//! Suite runner
//!
//! Selects cases, applies the ordering constraint (cases that must run last
//! start only after every other case has finished), runs the rest with
//! bounded concurrency and folds the case reports into one verdict.

use futures_util::stream::{self, StreamExt};
use serde::Serialize;

use crate::bridge::SessionFactory;

use super::case::TestCase;
use super::orchestrator::{run_case, CaseSettings};
use super::outcome::CaseReport;

/// Keep cases whose name contains one of `only` (case-insensitive); an
/// empty filter keeps everything
pub fn select(cases: Vec<Box<dyn TestCase>>, only: &[String]) -> Vec<Box<dyn TestCase>> {
    if only.is_empty() {
        return cases;
    }
    let needles: Vec<String> = only.iter().map(|s| s.to_lowercase()).collect();
    cases
        .into_iter()
        .filter(|case| {
            let name = case.name().to_lowercase();
            needles.iter().any(|n| name.contains(n.as_str()))
        })
        .collect()
}

/// Execution order: declaration order, with `runs_last` cases moved to the end
pub fn execution_order(cases: &[Box<dyn TestCase>]) -> Vec<&dyn TestCase> {
    let (last, first): (Vec<&dyn TestCase>, Vec<&dyn TestCase>) =
        cases.iter().map(|c| c.as_ref()).partition(|c| c.runs_last());
    first.into_iter().chain(last).collect()
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub target: String,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Assertions made across all cases; skip records are not assertions
    pub fn total_assertions(&self) -> usize {
        self.cases.iter().map(|c| c.assertion_count()).sum()
    }

    pub fn failed_assertions(&self) -> usize {
        self.cases.iter().map(|c| c.failed_count()).sum()
    }

    pub fn count(&self, label: &str) -> usize {
        self.cases.iter().filter(|c| c.outcome.label() == label).count()
    }

    /// The suite passes iff no assertion failed
    pub fn passed(&self) -> bool {
        self.failed_assertions() == 0
    }
}

/// Run `cases` against sessions from `factory`
///
/// `on_case` sees each report as soon as it is final, in execution order.
pub async fn run_suite(
    factory: &dyn SessionFactory,
    cases: &[Box<dyn TestCase>],
    settings: &CaseSettings,
    jobs: usize,
    on_case: &mut (dyn FnMut(&CaseReport) + Send),
) -> SuiteReport {
    let ordered = execution_order(cases);
    let (first, last): (Vec<&dyn TestCase>, Vec<&dyn TestCase>) =
        ordered.into_iter().partition(|c| !c.runs_last());

    tracing::info!(
        browser = %settings.target.browser,
        cases = first.len() + last.len(),
        jobs,
        "Starting suite"
    );

    let mut reports = Vec::with_capacity(cases.len());

    let mut running = stream::iter(first)
        .map(|case| run_case(case, factory, settings))
        .buffered(jobs.max(1));
    while let Some(report) = running.next().await {
        on_case(&report);
        reports.push(report);
    }

    for case in last {
        let report = run_case(case, factory, settings).await;
        on_case(&report);
        reports.push(report);
    }

    SuiteReport {
        target: settings.target.browser.to_string(),
        cases: reports,
    }
}
