//! Terminal states and per-case reports

use serde::Serialize;

/// Terminal state of one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed(String),
    Skipped(String),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed(_) => "failed",
            Outcome::Skipped(_) => "skipped",
        }
    }
}

/// One recorded assertion
#[derive(Debug, Clone, Serialize)]
pub struct AssertionRecord {
    pub ok: bool,
    pub skip: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Everything one case produced
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub outcome: Outcome,
    pub planned: Option<usize>,
    pub assertions: Vec<AssertionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    pub duration_ms: u64,
}

impl CaseReport {
    /// Assertions that count towards the plan
    pub fn assertion_count(&self) -> usize {
        self.assertions.iter().filter(|a| !a.skip).count()
    }

    pub fn failed_count(&self) -> usize {
        self.assertions.iter().filter(|a| !a.ok).count()
    }
}
