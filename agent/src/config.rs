//! Configuration types for the gate CLI
//!
//! Gate paths live in `guard_kit::settings`; this only covers how the
//! binary presents its result.

use std::path::PathBuf;

use clap::ValueEnum;

/// Shape of the JSON verdict report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Verdict and counts only
    Summary,
    /// Verdict plus failures, autofixes, check results and evidence
    Full,
}

impl ReportFormat {
    /// File name used when `--output` names a directory
    pub fn default_filename(&self) -> &'static str {
        match self {
            ReportFormat::Summary => "prod-guard-summary.json",
            ReportFormat::Full => "prod-guard-verdict.json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Summary => write!(f, "summary"),
            ReportFormat::Full => write!(f, "full"),
        }
    }
}

/// Configuration for a gate run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Gate root override (None means `PROD_GUARD_ROOT` or the working directory)
    pub root: Option<PathBuf>,

    /// Report file path (None means console-only output)
    pub output_file: Option<PathBuf>,

    /// Report format
    pub report_format: ReportFormat,

    /// Suppress banner and per-check table
    pub quiet: bool,
}
