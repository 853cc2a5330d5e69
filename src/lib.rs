//! shim-e2e - end-to-end WebDriver suite for the media-stream shim
//!
//! This library drives a remote browser through WebDriver, runs script
//! payloads inside it, polls DOM state with bounded deadlines and records
//! tape-style assertions for each named case.

pub mod bridge;
pub mod cases;
pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;
pub mod webdriver;

// Re-export commonly used types for tests
pub use bridge::{Bridge, Completion, Payload, SessionFactory};
pub use common::{Error, Result};
pub use harness::{CaseReport, Outcome, TestCase};
