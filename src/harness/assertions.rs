//! Assertion collaborator
//!
//! Collects the assertions of one case in tape style: an optional plan,
//! `pass`/`ok`/`equal`/`skip`/`fail`, then a single `end`. `end` consumes the
//! collector, so a case cannot be ended twice or keep asserting afterwards.

use std::fmt::Display;
use std::time::Instant;

use serde_json::Value;

use super::outcome::{AssertionRecord, CaseReport, Outcome};

/// Per-case assertion collector
#[derive(Debug)]
pub struct Assertions {
    case: String,
    plan: Option<usize>,
    records: Vec<AssertionRecord>,
    skip_reason: Option<String>,
    browser: Option<String>,
    started: Instant,
}

impl Assertions {
    pub fn new(case: &str) -> Self {
        Self {
            case: case.to_string(),
            plan: None,
            records: Vec::new(),
            skip_reason: None,
            browser: None,
            started: Instant::now(),
        }
    }

    /// Declare how many assertions the case will make
    pub fn declare_plan(&mut self, count: usize) {
        if let Some(existing) = self.plan {
            self.push(false, "plan declared twice", Some(format!("already planned {}", existing)));
            return;
        }
        self.plan = Some(count);
    }

    /// Browser the case ran against, for the report
    pub fn set_browser(&mut self, browser: String) {
        self.browser = Some(browser);
    }

    pub fn pass(&mut self, message: &str) {
        self.push(true, message, None);
    }

    pub fn ok(&mut self, condition: bool, message: &str) -> bool {
        let detail = if condition {
            None
        } else {
            Some("expected a truthy value".to_string())
        };
        self.push(condition, message, detail);
        condition
    }

    pub fn equal(&mut self, actual: &Value, expected: &Value, message: &str) -> bool {
        let equal = actual == expected;
        let detail = if equal {
            None
        } else {
            Some(format!("expected {}, got {}", expected, actual))
        };
        self.push(equal, message, detail);
        equal
    }

    /// Record a skip; the case ends as skipped unless something failed
    pub fn skip(&mut self, reason: &str) {
        self.records.push(AssertionRecord {
            ok: true,
            skip: true,
            message: reason.to_string(),
            detail: None,
        });
        self.skip_reason.get_or_insert_with(|| reason.to_string());
    }

    /// Record a failure carrying the error's message
    pub fn fail(&mut self, error: &dyn Display) {
        self.push(false, &error.to_string(), None);
    }

    /// Assertions recorded so far, skips excluded
    pub fn count(&self) -> usize {
        self.records.iter().filter(|r| !r.skip).count()
    }

    fn push(&mut self, ok: bool, message: &str, detail: Option<String>) {
        tracing::debug!(case = %self.case, ok, message, "assertion");
        self.records.push(AssertionRecord {
            ok,
            skip: false,
            message: message.to_string(),
            detail,
        });
    }

    /// Finish the case and compute its outcome
    ///
    /// On a non-skipped path a declared plan must match the number of
    /// assertions made; a mismatch is recorded as one more failure.
    pub fn end(mut self) -> CaseReport {
        if self.skip_reason.is_none() {
            if let Some(plan) = self.plan {
                let count = self.count();
                if count != plan {
                    self.push(
                        false,
                        "plan != count",
                        Some(format!("expected {} assertions, got {}", plan, count)),
                    );
                }
            }
        }

        let outcome = match self.records.iter().find(|r| !r.ok) {
            Some(failed) => Outcome::Failed(match &failed.detail {
                Some(detail) => format!("{}: {}", failed.message, detail),
                None => failed.message.clone(),
            }),
            None => match self.skip_reason.take() {
                Some(reason) => Outcome::Skipped(reason),
                None => Outcome::Passed,
            },
        };

        CaseReport {
            name: self.case,
            outcome,
            planned: self.plan,
            assertions: self.records,
            browser: self.browser,
            duration_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_met_passes() {
        let mut t = Assertions::new("case");
        t.declare_plan(3);
        t.pass("Page loaded");
        assert!(t.ok(true, "ok"));
        assert!(t.equal(&json!("function"), &json!("function"), "typeof"));
        let report = t.end();
        assert_eq!(report.outcome, Outcome::Passed);
        assert_eq!(report.assertion_count(), 3);
    }

    #[test]
    fn test_plan_mismatch_fails() {
        let mut t = Assertions::new("case");
        t.declare_plan(4);
        t.pass("Page loaded");
        let report = t.end();
        assert_eq!(
            report.outcome,
            Outcome::Failed("plan != count: expected 4 assertions, got 1".into())
        );
    }

    #[test]
    fn test_first_failure_is_the_reason() {
        let mut t = Assertions::new("case");
        t.pass("Page loaded");
        t.equal(&json!("undefined"), &json!("function"), "RTCPeerConnection is a function");
        t.fail(&"later");
        let report = t.end();
        assert_eq!(
            report.outcome,
            Outcome::Failed(
                "RTCPeerConnection is a function: expected \"function\", got \"undefined\"".into()
            )
        );
        assert_eq!(report.failed_count(), 2);
    }

    #[test]
    fn test_skip_bypasses_plan_check() {
        let mut t = Assertions::new("case");
        t.declare_plan(2);
        t.skip("not supported");
        let report = t.end();
        assert_eq!(report.outcome, Outcome::Skipped("not supported".into()));
        assert_eq!(report.assertion_count(), 0);
    }

    #[test]
    fn test_failure_wins_over_skip() {
        let mut t = Assertions::new("case");
        t.ok(false, "getUserMedia result: error: NotAllowedError");
        t.skip("bail");
        assert!(t.end().outcome.is_failed());
    }

    #[test]
    fn test_double_plan_is_recorded() {
        let mut t = Assertions::new("case");
        t.declare_plan(1);
        t.declare_plan(1);
        // The failure record itself is the one planned assertion
        let report = t.end();
        assert_eq!(report.planned, Some(1));
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.outcome, Outcome::Failed("plan declared twice: already planned 1".into()));
    }
}
