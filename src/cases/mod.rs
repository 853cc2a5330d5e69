//! The named checks of the suite
//!
//! Each case maps 1:1 to an orchestrated run. The order of [`all`] is the
//! declaration order; ordering constraints are applied by the suite runner.

mod console_logging;
mod constraints;
pub mod payloads;
mod src_object;

use crate::harness::TestCase;

pub use console_logging::ConsoleLogging;
pub use constraints::ImpossibleConstraints;
pub use src_object::{AttachDirectly, ReattachDirectly, SrcObjectNullSetter};

/// Every case, in declaration order
pub fn all() -> Vec<Box<dyn TestCase>> {
    vec![
        Box::new(SrcObjectNullSetter),
        Box::new(AttachDirectly),
        Box::new(ReattachDirectly),
        Box::new(ImpossibleConstraints),
        Box::new(ConsoleLogging),
    ]
}
