//! Output generation module
//!
//! - Console (human-readable, always)
//! - JSON verdict report (`--output`, summary or full)

mod console;
mod report;

pub use console::{print_details, print_verdict};
pub use report::{build_report, RunMetadata};
