//! Suite output
//!
//! `pretty` is for people at a terminal, `tap` matches what tape-based
//! browser suites print, `json` is the serialized [`SuiteReport`].

use std::io::Write;
use std::str::FromStr;

use colored::Colorize;

use super::outcome::{CaseReport, Outcome};
use super::suite::SuiteReport;

/// Output format of `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Pretty,
    Tap,
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "tap" => Ok(Format::Tap),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format '{}'; expected pretty, tap or json", other)),
        }
    }
}

/// Receives the suite's progress
pub trait Reporter: Send {
    fn suite_started(&mut self, target: &str, cases: usize);
    fn case_finished(&mut self, report: &CaseReport);
    fn suite_finished(&mut self, report: &SuiteReport);
}

/// Build the reporter for `format` writing to `out`
pub fn reporter(format: Format, out: Box<dyn Write + Send>) -> Box<dyn Reporter> {
    match format {
        Format::Pretty => Box::new(PrettyReporter { out }),
        Format::Tap => Box::new(TapReporter { out, next_id: 1 }),
        Format::Json => Box::new(JsonReporter { out }),
    }
}

// Write errors on the report stream are not recoverable and not worth
// aborting a browser run for; they are ignored below.

/// Colored, human oriented output
pub struct PrettyReporter {
    out: Box<dyn Write + Send>,
}

impl Reporter for PrettyReporter {
    fn suite_started(&mut self, target: &str, cases: usize) {
        let _ = writeln!(
            self.out,
            "\n{} {} ({} cases)",
            "Running suite against".blue().bold(),
            target.white().bold(),
            cases
        );
    }

    fn case_finished(&mut self, report: &CaseReport) {
        let header = match &report.outcome {
            Outcome::Passed => format!("{} {}", "✓".green(), report.name.white().bold()),
            Outcome::Failed(_) => format!("{} {}", "✗".red(), report.name.white().bold()),
            Outcome::Skipped(_) => format!("{} {}", "-".yellow(), report.name.white().bold()),
        };
        let browser = report
            .browser
            .as_deref()
            .map(|b| format!(" [{}]", b))
            .unwrap_or_default();
        let _ = writeln!(
            self.out,
            "\n{}{} {}",
            header,
            browser.dimmed(),
            format!("({}ms)", report.duration_ms).dimmed()
        );

        for assertion in &report.assertions {
            let line = if assertion.skip {
                format!("  {} {} {}", "-".yellow(), assertion.message, "(skipped)".dimmed())
            } else if assertion.ok {
                format!("  {} {}", "✓".green(), assertion.message.dimmed())
            } else {
                format!("  {} {}", "✗".red(), assertion.message)
            };
            let _ = writeln!(self.out, "{}", line);
            if let Some(detail) = &assertion.detail {
                let _ = writeln!(self.out, "      {}", detail.dimmed());
            }
        }
    }

    fn suite_finished(&mut self, report: &SuiteReport) {
        let summary = format!(
            "{} passed, {} failed, {} skipped; {} of {} assertions failed",
            report.count("passed"),
            report.count("failed"),
            report.count("skipped"),
            report.failed_assertions(),
            report.total_assertions()
        );
        if report.passed() {
            let _ = writeln!(self.out, "\n{} {}\n", "✓".green().bold(), summary.green().bold());
        } else {
            let _ = writeln!(self.out, "\n{} {}\n", "✗".red().bold(), summary.red().bold());
        }
    }
}

/// Test Anything Protocol, version 13
pub struct TapReporter {
    out: Box<dyn Write + Send>,
    next_id: usize,
}

impl Reporter for TapReporter {
    fn suite_started(&mut self, _target: &str, _cases: usize) {
        let _ = writeln!(self.out, "TAP version 13");
    }

    fn case_finished(&mut self, report: &CaseReport) {
        let _ = writeln!(self.out, "# {}", report.name);
        for assertion in &report.assertions {
            let id = self.next_id;
            self.next_id += 1;
            if assertion.skip {
                let _ = writeln!(self.out, "ok {} {} # SKIP", id, assertion.message);
                continue;
            }
            let status = if assertion.ok { "ok" } else { "not ok" };
            let _ = writeln!(self.out, "{} {} {}", status, id, assertion.message);
            if !assertion.ok {
                let _ = writeln!(self.out, "  ---");
                if let Some(detail) = &assertion.detail {
                    let _ = writeln!(self.out, "    detail: {}", detail);
                }
                let _ = writeln!(self.out, "  ...");
            }
        }
    }

    fn suite_finished(&mut self, report: &SuiteReport) {
        let total = self.next_id - 1;
        let failed = report.failed_assertions();
        let _ = writeln!(self.out, "\n1..{}", total);
        let _ = writeln!(self.out, "# tests {}", total);
        let _ = writeln!(self.out, "# pass  {}", total - failed);
        if failed > 0 {
            let _ = writeln!(self.out, "# fail  {}", failed);
        } else {
            let _ = writeln!(self.out, "\n# ok");
        }
    }
}

/// Whole report as one JSON document at the end
pub struct JsonReporter {
    out: Box<dyn Write + Send>,
}

impl Reporter for JsonReporter {
    fn suite_started(&mut self, _target: &str, _cases: usize) {}

    fn case_finished(&mut self, _report: &CaseReport) {}

    fn suite_finished(&mut self, report: &SuiteReport) {
        match serde_json::to_string_pretty(report) {
            Ok(json) => {
                let _ = writeln!(self.out, "{}", json);
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize report"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::outcome::AssertionRecord;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn record(ok: bool, skip: bool, message: &str) -> AssertionRecord {
        AssertionRecord {
            ok,
            skip,
            message: message.to_string(),
            detail: if ok { None } else { Some("expected a truthy value".into()) },
        }
    }

    fn sample() -> SuiteReport {
        SuiteReport {
            target: "firefox".into(),
            cases: vec![
                CaseReport {
                    name: "Attach mediaStream directly".into(),
                    outcome: Outcome::Failed("Stream is a MediaStream".into()),
                    planned: Some(4),
                    assertions: vec![
                        record(true, false, "Page loaded"),
                        record(false, false, "Stream is a MediaStream"),
                    ],
                    browser: None,
                    duration_ms: 12,
                },
                CaseReport {
                    name: "Call getUserMedia with impossible constraints".into(),
                    outcome: Outcome::Skipped("not supported".into()),
                    planned: None,
                    assertions: vec![record(true, true, "not supported")],
                    browser: None,
                    duration_ms: 1,
                },
            ],
        }
    }

    #[test]
    fn test_tap_output() {
        let buffer = Buffer::default();
        let mut tap = reporter(Format::Tap, Box::new(buffer.clone()));
        let report = sample();
        tap.suite_started("firefox", 2);
        for case in &report.cases {
            tap.case_finished(case);
        }
        tap.suite_finished(&report);

        let text = buffer.text();
        assert!(text.starts_with("TAP version 13\n# Attach mediaStream directly\n"));
        assert!(text.contains("ok 1 Page loaded\n"));
        assert!(text.contains("not ok 2 Stream is a MediaStream\n  ---\n    detail: expected a truthy value\n  ...\n"));
        assert!(text.contains("ok 3 not supported # SKIP\n"));
        assert!(text.contains("1..3\n# tests 3\n# pass  2\n# fail  1\n"));
    }

    #[test]
    fn test_json_output() {
        let buffer = Buffer::default();
        let mut json = reporter(Format::Json, Box::new(buffer.clone()));
        json.suite_finished(&sample());

        let value: serde_json::Value = serde_json::from_str(&buffer.text()).unwrap();
        assert_eq!(value["target"], "firefox");
        assert_eq!(value["cases"][0]["outcome"]["status"], "failed");
        assert_eq!(value["cases"][1]["outcome"]["reason"], "not supported");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("TAP".parse::<Format>().unwrap(), Format::Tap);
        assert!("xml".parse::<Format>().is_err());
    }
}
