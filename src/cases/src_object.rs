//! srcObject checks: detaching, attaching and re-attaching a MediaStream

use async_trait::async_trait;

use crate::bridge::Completion;
use crate::harness::{CaseContext, StepResult, TestCase};

use super::payloads::{ATTACH_STREAM, REATTACH_STREAM, SRC_OBJECT_NULL};

/// `readyState === 4` is HAVE_ENOUGH_DATA: frames are flowing
const VIDEO_READY: &str = "return document.getElementById('video').readyState === 4;";
const VIDEO2_READY: &str = "return document.getElementById('video2').readyState === 4;";

/// Record whether getUserMedia succeeded
fn report_capture(ctx: &mut CaseContext<'_>, completion: &Completion) {
    let message = match completion.error() {
        Some(err) => format!("getUserMedia result: error: {}", err),
        None => "getUserMedia result: no errors".to_string(),
    };
    ctx.ok(completion.error().is_none(), &message);
}

/// Chrome and Firefox name the constructor differently; both contain MediaStream
fn is_media_stream(completion: &Completion) -> bool {
    completion
        .value()
        .and_then(|v| v.get("streamClass"))
        .and_then(|v| v.as_str())
        .map(|name| name.contains("MediaStream"))
        .unwrap_or(false)
}

pub struct SrcObjectNullSetter;

#[async_trait]
impl TestCase for SrcObjectNullSetter {
    fn name(&self) -> &'static str {
        "srcObject null setter"
    }

    fn plan(&self) -> Option<usize> {
        Some(3)
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> StepResult {
        let completion = ctx.run_async(&SRC_OBJECT_NULL).await?;
        report_capture(ctx, &completion);

        ctx.wait_for_element("video").await?;

        let src = ctx.eval("return document.getElementById('video').src;").await?;
        let src = src.as_str().unwrap_or_default();
        // Some browsers report the document URL instead of ''
        let cleared = src.is_empty() || src == ctx.page_url();
        ctx.ok(cleared, "src is the empty string");
        Ok(())
    }
}

pub struct AttachDirectly;

#[async_trait]
impl TestCase for AttachDirectly {
    fn name(&self) -> &'static str {
        "Attach mediaStream directly"
    }

    fn plan(&self) -> Option<usize> {
        Some(4)
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> StepResult {
        let completion = ctx.run_async(&ATTACH_STREAM).await?;
        report_capture(ctx, &completion);
        ctx.ok(is_media_stream(&completion), "Stream is a MediaStream");

        ctx.wait_for_element("video").await?;
        ctx.wait_until(VIDEO_READY).await?;
        ctx.pass("Stream attached directly successfully to a video element");
        Ok(())
    }
}

pub struct ReattachDirectly;

#[async_trait]
impl TestCase for ReattachDirectly {
    fn name(&self) -> &'static str {
        "Re-attaching mediaStream directly"
    }

    fn plan(&self) -> Option<usize> {
        Some(5)
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> StepResult {
        let completion = ctx.run_async(&REATTACH_STREAM).await?;
        report_capture(ctx, &completion);
        ctx.ok(is_media_stream(&completion), "Stream is a MediaStream");

        ctx.wait_for_element("video").await?;
        ctx.wait_until(VIDEO_READY).await?;
        ctx.pass("Stream attached directly successfully to a video element");

        ctx.wait_for_element("video2").await?;
        ctx.wait_until(VIDEO2_READY).await?;
        ctx.pass("Stream re-attached directly successfully to a video element");
        Ok(())
    }
}
