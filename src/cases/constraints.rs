//! getUserMedia must reject constraints no device can satisfy

use async_trait::async_trait;

use crate::harness::{CaseContext, RuntimeSkip, StaticSkip, StepResult, TestCase};
use crate::webdriver::BrowserKind;

use super::payloads::{FIREFOX_BEFORE_42, IMPOSSIBLE_CONSTRAINTS};

pub struct ImpossibleConstraints;

#[async_trait]
impl TestCase for ImpossibleConstraints {
    fn name(&self) -> &'static str {
        "Call getUserMedia with impossible constraints"
    }

    fn plan(&self) -> Option<usize> {
        Some(2)
    }

    // Chrome's fake capture device satisfies any constraint
    fn static_skip(&self) -> Option<StaticSkip> {
        Some(StaticSkip {
            browsers: &[BrowserKind::Chrome],
            reason: "getUserMedia(impossibleConstraints) is not rejected by chrome fake devices",
        })
    }

    fn runtime_skip(&self) -> Option<RuntimeSkip> {
        Some(RuntimeSkip {
            script: FIREFOX_BEFORE_42,
            reason: "getUserMedia(impossibleConstraints) not supported on < 42",
        })
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> StepResult {
        let completion = ctx.run_async(&IMPOSSIBLE_CONSTRAINTS).await?;
        if let Some(err) = completion.error() {
            tracing::debug!(error = %err, "getUserMedia rejected as expected");
        }
        ctx.ok(
            completion.error().is_some(),
            "getUserMedia(impossibleConstraints) must fail",
        );
        Ok(())
    }
}
