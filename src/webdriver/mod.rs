//! W3C WebDriver implementation
//!
//! This module implements the client side of WebDriver: the wire types,
//! an HTTP client whose sessions implement the remote execution bridge, and
//! launching a local driver binary.

pub mod client;
pub mod spawn;
pub mod types;

pub use client::{Session, WebDriverClient, WebDriverFactory};
pub use spawn::DriverProcess;
pub use types::*;
