//! Suite runner tests: selection, ordering, concurrency and the verdict

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use common::{settings, FakeBuilder};
use shim_e2e::cases;
use shim_e2e::harness::{execution_order, run_suite, select, CaseContext, CaseReport, StepResult, TestCase};
use shim_e2e::webdriver::BrowserKind;

#[derive(Default)]
struct Journal {
    events: Mutex<Vec<String>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl Journal {
    fn log(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn position(&self, event: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .position(|e| e == event)
            .unwrap_or_else(|| panic!("no event {}", event))
    }
}

struct Recorded {
    name: &'static str,
    last: bool,
    pause_ms: u64,
    succeed: bool,
    journal: Arc<Journal>,
}

impl Recorded {
    fn new(name: &'static str, journal: &Arc<Journal>) -> Self {
        Self {
            name,
            last: false,
            pause_ms: 20,
            succeed: true,
            journal: journal.clone(),
        }
    }
}

#[async_trait]
impl TestCase for Recorded {
    fn name(&self) -> &'static str {
        self.name
    }

    fn plan(&self) -> Option<usize> {
        Some(2)
    }

    fn runs_last(&self) -> bool {
        self.last
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> StepResult {
        self.journal.log(format!("start {}", self.name));
        let now = self.journal.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.journal.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(self.pause_ms)).await;

        self.journal.running.fetch_sub(1, Ordering::SeqCst);
        self.journal.log(format!("end {}", self.name));
        ctx.ok(self.succeed, "step");
        Ok(())
    }
}

fn names(reports: &[CaseReport]) -> Vec<&str> {
    reports.iter().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn test_last_case_starts_after_all_others_finish() {
    let journal = Arc::new(Journal::default());
    let mut logging = Recorded::new("logging", &journal);
    logging.last = true;
    let mut slow = Recorded::new("slow", &journal);
    slow.pause_ms = 80;

    let cases: Vec<Box<dyn TestCase>> = vec![
        Box::new(logging),
        Box::new(Recorded::new("a", &journal)),
        Box::new(slow),
        Box::new(Recorded::new("b", &journal)),
    ];
    let fake = FakeBuilder::new().page_ready().build();

    let mut seen = Vec::new();
    let report = run_suite(&fake, &cases, &settings(BrowserKind::Chrome), 3, &mut |case: &CaseReport| {
        seen.push(case.name.clone())
    })
    .await;

    assert_eq!(names(&report.cases), vec!["a", "slow", "b", "logging"]);
    assert_eq!(seen, vec!["a", "slow", "b", "logging"]);

    let started = journal.position("start logging");
    for other in ["a", "slow", "b"] {
        assert!(journal.position(&format!("end {}", other)) < started);
    }
    assert_eq!(fake.state.sessions.load(Ordering::SeqCst), 4);
    assert_eq!(fake.state.closes.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_jobs_bound_concurrency() {
    for (jobs, expected_peak) in [(1, 1), (3, 3)] {
        let journal = Arc::new(Journal::default());
        let cases: Vec<Box<dyn TestCase>> = vec![
            Box::new(Recorded::new("a", &journal)),
            Box::new(Recorded::new("b", &journal)),
            Box::new(Recorded::new("c", &journal)),
        ];
        let fake = FakeBuilder::new().page_ready().build();

        let report = run_suite(&fake, &cases, &settings(BrowserKind::Chrome), jobs, &mut |_: &CaseReport| {}).await;

        assert!(report.passed());
        assert_eq!(journal.peak.load(Ordering::SeqCst), expected_peak, "jobs = {}", jobs);
    }
}

#[tokio::test]
async fn test_one_failed_assertion_fails_the_suite() {
    let journal = Arc::new(Journal::default());
    let mut broken = Recorded::new("broken", &journal);
    broken.succeed = false;
    let cases: Vec<Box<dyn TestCase>> = vec![Box::new(Recorded::new("fine", &journal)), Box::new(broken)];
    let fake = FakeBuilder::new().page_ready().build();

    let report = run_suite(&fake, &cases, &settings(BrowserKind::Firefox), 1, &mut |_: &CaseReport| {}).await;

    assert!(!report.passed());
    assert_eq!(report.total_assertions(), 4);
    assert_eq!(report.failed_assertions(), 1);
    assert_eq!(report.count("passed"), 1);
    assert_eq!(report.count("failed"), 1);
    assert_eq!(report.target, "firefox");
}

#[tokio::test]
async fn test_skipped_cases_do_not_fail_the_suite() {
    // Only the impossible-constraints case applies a static rule on chrome
    let cases = select(cases::all(), &["impossible".to_string()]);
    let fake = FakeBuilder::new().page_ready().build();

    let report = run_suite(&fake, &cases, &settings(BrowserKind::Chrome), 1, &mut |_: &CaseReport| {}).await;

    assert!(report.passed());
    assert_eq!(report.count("skipped"), 1);
    // The skip record is not an assertion
    assert_eq!(report.cases[0].assertions.len(), 1);
    assert_eq!(report.total_assertions(), 0);
}

#[test]
fn test_select_matches_substrings_ignoring_case() {
    let picked = select(cases::all(), &["ATTACH".to_string()]);
    let picked: Vec<&str> = picked.iter().map(|c| c.name()).collect();
    assert_eq!(
        picked,
        vec!["Attach mediaStream directly", "Re-attaching mediaStream directly"]
    );

    assert_eq!(select(cases::all(), &[]).len(), 5);
    assert!(select(cases::all(), &["nothing like this".to_string()]).is_empty());
}

#[test]
fn test_execution_order_keeps_declaration_order() {
    let cases = cases::all();
    let order: Vec<&str> = execution_order(&cases).iter().map(|c| c.name()).collect();
    assert_eq!(order[0], "srcObject null setter");
    assert_eq!(order[3], "Call getUserMedia with impossible constraints");
    assert_eq!(order[4], "Non-module logging to console still works");
}
