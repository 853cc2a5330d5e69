//! Test harness
//!
//! Runs named cases against fresh browser sessions: the skip gate decides
//! whether a case applies, the orchestrator drives it to exactly one
//! terminal outcome, and the suite runner orders cases and collects the
//! verdict.

pub mod assertions;
pub mod case;
pub mod gate;
pub mod orchestrator;
pub mod outcome;
pub mod report;
pub mod suite;

pub use assertions::Assertions;
pub use case::{CaseContext, Flow, StepResult, TestCase};
pub use gate::{should_skip, RuntimeSkip, StaticSkip, Target};
pub use orchestrator::{run_case, CaseSettings};
pub use outcome::{AssertionRecord, CaseReport, Outcome};
pub use report::{Format, Reporter};
pub use suite::{execution_order, run_suite, select, SuiteReport};
