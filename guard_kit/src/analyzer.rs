//! # Gate Engine
//!
//! Single synchronous pass over the registered checks and the probe
//! artifacts:
//!
//! ```text
//! checks (registration order)          probes (unit → injection → load)
//!   run() ── ok ──────────────► ·        present? ── no ──► info log
//!     │                                    │
//!     ├─ fixable ─► fix() ─► autofix note  └─ parse ─► policy ─► failure?
//!     └─ not fixable ──────► failure
//!                         ╲            ╱
//!                          GateVerdict
//! ```
//!
//! An applied autofix always blocks the current run. The fixed check is not
//! re-run here: the other probe artifacts were produced against the old
//! artifact state, so the pipeline has to run the gate again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::checks::{CheckResult, FixOutcome, Severity};
use crate::error::{GuardError, GuardResult};
use crate::probes::{evaluate_probe, ProbeEvidence, ProbeFailure, ProbeKind, ProbePaths};
use crate::registry::{create_default_registry, CheckRegistry};
use crate::settings::GuardSettings;

/// A single blocking finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateFailure {
    pub severity: Severity,
    /// Check id or probe kind that raised it
    pub source: String,
    pub message: String,
}

impl GateFailure {
    fn from_check(check_id: &str, result: &CheckResult) -> Self {
        Self {
            severity: result.severity,
            source: check_id.to_string(),
            message: result.message.clone(),
        }
    }
}

impl From<ProbeFailure> for GateFailure {
    fn from(failure: ProbeFailure) -> Self {
        Self {
            severity: failure.severity,
            source: failure.kind.to_string(),
            message: failure.message,
        }
    }
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Terminal output of one gate evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub authorized: bool,
    pub failures: Vec<GateFailure>,
    pub autofixes_applied: Vec<String>,
    /// Every check result, registration order
    pub checks: Vec<CheckResult>,
    /// Probe artifacts that were present, evaluation order
    pub evidence: Vec<ProbeEvidence>,
}

impl GateVerdict {
    /// An autofix changed an artifact; the gate must run again
    pub fn rerun_required(&self) -> bool {
        !self.autofixes_applied.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.authorized {
            0
        } else {
            1
        }
    }

    /// Severity-prefixed failure lines
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.to_string()).collect()
    }
}

/// Orchestrates checks and probes into a [`GateVerdict`]
pub struct Analyzer {
    registry: CheckRegistry,
    probes: ProbePaths,
}

impl Analyzer {
    pub fn new(registry: CheckRegistry, probes: ProbePaths) -> Self {
        Self { registry, probes }
    }

    /// Default registry and probe locations from `settings`
    pub fn from_settings(settings: &GuardSettings) -> GuardResult<Self> {
        Ok(Self::new(
            create_default_registry(settings)?,
            settings.probe_paths(),
        ))
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn probe_paths(&self) -> &ProbePaths {
        &self.probes
    }

    /// Run the gate
    ///
    /// Errors only when the evaluation cannot complete: unreadable or
    /// malformed artifacts, or a remediation that did not happen.
    pub fn evaluate(&self) -> GuardResult<GateVerdict> {
        log::info!(
            "PROD-GUARD: commencing final analysis ({} check(s), {} probe(s))",
            self.registry.len(),
            ProbeKind::ALL.len()
        );

        let mut failures = Vec::new();
        let mut autofixes_applied = Vec::new();
        let mut checks = Vec::with_capacity(self.registry.len());

        for check in self.registry.iter() {
            let result = check.run()?;

            if !result.ok {
                if result.autofix_available {
                    match check.fix()? {
                        FixOutcome::Applied { note } => {
                            log::info!("Autofix applied by '{}': {}", check.id(), note);
                            autofixes_applied.push(note);
                        }
                        FixOutcome::AlreadyCompliant => {
                            return Err(GuardError::RemediationIneffective(
                                check.id().to_string(),
                            ));
                        }
                    }
                } else {
                    log::warn!("Check '{}' failed: {}", check.id(), result.message);
                    failures.push(GateFailure::from_check(check.id(), &result));
                }
            }

            checks.push(result);
        }

        let mut evidence = Vec::new();
        for kind in ProbeKind::ALL {
            let outcome = evaluate_probe(kind, self.probes.path_for(kind))?;
            evidence.extend(outcome.evidence);
            failures.extend(outcome.failure.map(GateFailure::from));
        }

        let authorized = autofixes_applied.is_empty() && failures.is_empty();
        log::info!(
            "PROD-GUARD: verdict authorized={} failures={} autofixes={}",
            authorized,
            failures.len(),
            autofixes_applied.len()
        );

        Ok(GateVerdict {
            authorized,
            failures,
            autofixes_applied,
            checks,
            evidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Check;
    use std::path::Path;

    /// Check with a canned result and fix outcome
    struct Scripted {
        id: &'static str,
        result: CheckResult,
        fix_outcome: Option<FixOutcome>,
    }

    impl Scripted {
        fn new(id: &'static str, result: CheckResult) -> Self {
            Self {
                id,
                result,
                fix_outcome: None,
            }
        }
    }

    impl Check for Scripted {
        fn id(&self) -> &str {
            self.id
        }

        fn name(&self) -> &str {
            self.id
        }

        fn run(&self) -> GuardResult<CheckResult> {
            Ok(self.result.clone())
        }

        fn fix(&self) -> GuardResult<FixOutcome> {
            match &self.fix_outcome {
                Some(outcome) => Ok(outcome.clone()),
                None => Err(GuardError::FixUnsupported(self.id.to_string())),
            }
        }
    }

    fn analyzer(dir: &Path, checks: Vec<Scripted>) -> Analyzer {
        let mut registry = CheckRegistry::new();
        for check in checks {
            registry.register(Box::new(check)).unwrap();
        }
        Analyzer::new(registry, ProbePaths::in_dir(dir))
    }

    #[test]
    fn test_empty_gate_is_authorized() {
        let dir = tempfile::tempdir().unwrap();
        let verdict = analyzer(dir.path(), vec![]).evaluate().unwrap();

        assert!(verdict.authorized);
        assert!(verdict.failures.is_empty());
        assert!(verdict.evidence.is_empty());
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn test_unfixable_violations_in_registration_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("unit-test-result.json"),
            r#"{"success": false}"#,
        )
        .unwrap();

        let verdict = analyzer(
            dir.path(),
            vec![
                Scripted::new(
                    "secrets",
                    CheckResult::violation("Secrets", Severity::High, "API key committed."),
                ),
                Scripted::new("tls", CheckResult::pass("TLS")),
                Scripted::new(
                    "deps",
                    CheckResult::violation("Deps", Severity::Medium, "Vulnerable dependency."),
                ),
            ],
        )
        .evaluate()
        .unwrap();

        assert!(!verdict.authorized);
        assert!(!verdict.rerun_required());
        assert_eq!(
            verdict.failure_lines(),
            vec![
                "HIGH: API key committed.".to_string(),
                "MEDIUM: Vulnerable dependency.".to_string(),
                "CRITICAL: Unit tests failed (runner reported failure).".to_string(),
            ]
        );
        assert_eq!(verdict.failures[0].source, "secrets");
        assert_eq!(verdict.failures[2].source, "unit_tests");
        assert_eq!(verdict.checks.len(), 3);
    }

    #[test]
    fn test_probe_status_ignores_check_with_same_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("unit-test-result.json"),
            r#"{"numFailedTests": 0, "success": true}"#,
        )
        .unwrap();

        let verdict = analyzer(
            dir.path(),
            vec![Scripted::new(
                "unit_tests",
                CheckResult::violation("Unit Config", Severity::Medium, "Coverage disabled."),
            )],
        )
        .evaluate()
        .unwrap();

        assert_eq!(verdict.failures.len(), 1);
        assert_eq!(verdict.failures[0].source, "unit_tests");
        assert_eq!(verdict.evidence.len(), 1);
        assert!(verdict.evidence[0].passed);
    }

    #[test]
    fn test_autofix_blocks_and_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut check = Scripted::new(
            "fixable",
            CheckResult::violation("Fixable", Severity::Low, "Bad value.").with_autofix(),
        );
        check.fix_outcome = Some(FixOutcome::Applied {
            note: "Fixed bad value.".to_string(),
        });

        let verdict = analyzer(dir.path(), vec![check]).evaluate().unwrap();

        assert!(!verdict.authorized);
        assert!(verdict.rerun_required());
        assert!(verdict.failures.is_empty());
        assert_eq!(verdict.autofixes_applied, vec!["Fixed bad value.".to_string()]);
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn test_ineffective_fix_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut check = Scripted::new(
            "liar",
            CheckResult::violation("Liar", Severity::Low, "Bad value.").with_autofix(),
        );
        check.fix_outcome = Some(FixOutcome::AlreadyCompliant);

        let err = analyzer(dir.path(), vec![check]).evaluate().unwrap_err();
        assert!(matches!(err, GuardError::RemediationIneffective(id) if id == "liar"));
    }

    #[test]
    fn test_autofix_claim_without_fix_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let check = Scripted::new(
            "no_fix",
            CheckResult::violation("NoFix", Severity::Low, "Bad value.").with_autofix(),
        );

        let err = analyzer(dir.path(), vec![check]).evaluate().unwrap_err();
        assert!(matches!(err, GuardError::FixUnsupported(_)));
    }

    #[test]
    fn test_passing_check_is_never_fixed() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = CheckRegistry::new();
        let check = Scripted::new("clean", CheckResult::pass("Clean"));
        registry.register(Box::new(check)).unwrap();

        let gate = Analyzer::new(registry, ProbePaths::in_dir(dir.path()));
        let first = gate.evaluate().unwrap();
        let second = gate.evaluate().unwrap();
        assert_eq!(first, second);
        assert!(first.authorized);
    }
}
