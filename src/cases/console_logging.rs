//! Loading the shim as a plain script must leave console logging working

use async_trait::async_trait;
use serde_json::Value;

use crate::common::Error;
use crate::harness::{CaseContext, StepResult, TestCase};

use super::payloads::CONSOLE_LOGGING;

pub struct ConsoleLogging;

#[async_trait]
impl TestCase for ConsoleLogging {
    fn name(&self) -> &'static str {
        "Non-module logging to console still works"
    }

    /// Page loaded, four public API checks, one log check
    fn plan(&self) -> Option<usize> {
        Some(6)
    }

    // Loading the shim again interferes with every case that follows
    fn runs_last(&self) -> bool {
        true
    }

    async fn run(&self, ctx: &mut CaseContext<'_>) -> StepResult {
        let output = ctx.run_sync(&CONSOLE_LOGGING).await?;

        let checks = output
            .get("checks")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Protocol(format!("Missing API checks in {}", output)))?;

        // Each check is [actual typeof, expected typeof, message]
        for check in checks {
            let actual = check.get(0).unwrap_or(&Value::Null);
            let expected = check.get(1).unwrap_or(&Value::Null);
            let message = check.get(2).and_then(Value::as_str).unwrap_or("public API check");
            ctx.equal(actual, expected, message);
        }

        let log_count = output.get("logCount").and_then(Value::as_u64).unwrap_or(0);
        ctx.ok(log_count > 0, "A log message appeared on the console.");
        Ok(())
    }
}
