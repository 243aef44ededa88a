//! # Checks Module
//!
//! A check inspects one piece of deployable configuration and reports a
//! [`CheckResult`]. Checks that can safely repair what they find also
//! implement [`Check::fix`].
//!
//! - CorsCheck: wildcard origins in the server's CORS configuration

pub mod cors;

pub use cors::CorsCheck;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};

/// Impact of a violation left unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single check inspection
///
/// When `ok` is true the remaining fields carry no meaning for the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub ok: bool,
    pub name: String,
    pub severity: Severity,
    pub autofix_available: bool,
    pub message: String,
}

impl CheckResult {
    /// Compliant result
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            ok: true,
            name: name.into(),
            severity: Severity::Low,
            autofix_available: false,
            message: String::new(),
        }
    }

    /// Violation without a remediation
    pub fn violation(
        name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            ok: false,
            name: name.into(),
            severity,
            autofix_available: false,
            message: message.into(),
        }
    }

    /// Mark the violation as safely fixable by the check's `fix()`
    pub fn with_autofix(mut self) -> Self {
        self.autofix_available = true;
        self
    }

    /// Severity-prefixed single-line form used in the verdict
    pub fn failure_line(&self) -> String {
        format!("{}: {}", self.severity, self.message)
    }
}

/// What `fix()` actually did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// Artifact rewritten; carries the human-readable remediation note
    Applied { note: String },
    /// Nothing matched, artifact untouched
    AlreadyCompliant,
}

/// A pluggable policy unit
///
/// `run` must not mutate anything. `fix` must be idempotent and safe to
/// call when the violation is already gone.
pub trait Check {
    /// Stable identifier, unique within a registry
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Inspect the artifact
    fn run(&self) -> GuardResult<CheckResult>;

    /// Remediate the violation in place
    fn fix(&self) -> GuardResult<FixOutcome> {
        Err(GuardError::FixUnsupported(self.id().to_string()))
    }

    /// Paths `fix` may rewrite
    fn fix_targets(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}
