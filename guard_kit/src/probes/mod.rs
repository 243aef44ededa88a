//! # Probes Module
//!
//! Reads the artifacts left behind by the external probe runners and applies
//! the per-category release policy:
//!
//! | Probe | Blocks when | Severity |
//! |---|---|---|
//! | unit tests | any failing test, or `success: false` | CRITICAL |
//! | injection scan | `vulnerable: true` | CRITICAL |
//! | load test | any threshold with `ok: false` | HIGH |
//!
//! A missing artifact is logged and skipped. A present artifact that does
//! not parse is fatal.

pub mod schema;

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::checks::Severity;
use crate::error::{GuardError, GuardResult};
use schema::{InjectionScanReport, LoadTestReport, UnitTestReport};

pub const UNIT_TEST_REPORT: &str = "unit-test-result.json";
pub const INJECTION_SCAN_REPORT: &str = "sql-injection-result.json";
pub const LOAD_TEST_REPORT: &str = "load-test-result.json";

/// Probe category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    UnitTests,
    InjectionScan,
    LoadTest,
}

impl ProbeKind {
    /// Evaluation order
    pub const ALL: [ProbeKind; 3] = [
        ProbeKind::UnitTests,
        ProbeKind::InjectionScan,
        ProbeKind::LoadTest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeKind::UnitTests => "unit_tests",
            ProbeKind::InjectionScan => "injection_scan",
            ProbeKind::LoadTest => "load_test",
        }
    }

    /// Conventional artifact file name
    pub fn default_file_name(self) -> &'static str {
        match self {
            ProbeKind::UnitTests => UNIT_TEST_REPORT,
            ProbeKind::InjectionScan => INJECTION_SCAN_REPORT,
            ProbeKind::LoadTest => LOAD_TEST_REPORT,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ProbeKind::UnitTests => "Unit test",
            ProbeKind::InjectionScan => "SQL injection",
            ProbeKind::LoadTest => "Load test",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where each probe artifact is expected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePaths {
    pub unit_tests: PathBuf,
    pub injection_scan: PathBuf,
    pub load_test: PathBuf,
}

impl ProbePaths {
    /// Conventional file names under `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            unit_tests: dir.join(UNIT_TEST_REPORT),
            injection_scan: dir.join(INJECTION_SCAN_REPORT),
            load_test: dir.join(LOAD_TEST_REPORT),
        }
    }

    pub fn path_for(&self, kind: ProbeKind) -> &Path {
        match kind {
            ProbeKind::UnitTests => &self.unit_tests,
            ProbeKind::InjectionScan => &self.injection_scan,
            ProbeKind::LoadTest => &self.load_test,
        }
    }
}

/// Fingerprint of an artifact the verdict was computed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeEvidence {
    pub kind: ProbeKind,
    pub path: PathBuf,
    pub sha256: String,
    /// Artifact satisfied its release policy
    pub passed: bool,
}

/// Policy violation raised by a probe artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub kind: ProbeKind,
    pub severity: Severity,
    pub message: String,
}

/// Result of evaluating one probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// `None` when the artifact was absent
    pub evidence: Option<ProbeEvidence>,
    pub failure: Option<ProbeFailure>,
}

/// Read and apply policy for one probe category
pub fn evaluate_probe(kind: ProbeKind, path: &Path) -> GuardResult<ProbeOutcome> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!(
                "{} results not found at {}, assuming baseline pass",
                kind.label(),
                path.display()
            );
            return Ok(ProbeOutcome::default());
        }
        Err(e) => return Err(GuardError::io(path, e)),
    };

    let sha256 = hex::encode(Sha256::digest(&bytes));

    let failure = match kind {
        ProbeKind::UnitTests => unit_test_policy(&parse(kind, path, &bytes)?),
        ProbeKind::InjectionScan => injection_scan_policy(&parse(kind, path, &bytes)?),
        ProbeKind::LoadTest => load_test_policy(&parse(kind, path, &bytes)?),
    };

    match &failure {
        Some(f) => log::warn!("{} probe failed: {}", kind.label(), f.message),
        None => log::info!("{} probe passed", kind.label()),
    }

    Ok(ProbeOutcome {
        evidence: Some(ProbeEvidence {
            kind,
            path: path.to_path_buf(),
            sha256,
            passed: failure.is_none(),
        }),
        failure,
    })
}

fn parse<T: DeserializeOwned>(kind: ProbeKind, path: &Path, bytes: &[u8]) -> GuardResult<T> {
    serde_json::from_slice(bytes).map_err(|source| GuardError::MalformedArtifact {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Failing test count; `success: false` without a count counts as one
pub fn failed_test_count(report: &UnitTestReport) -> u64 {
    match report.num_failed_tests {
        Some(n) if n > 0 => n,
        _ if report.success == Some(false) => 1,
        _ => 0,
    }
}

fn unit_test_policy(report: &UnitTestReport) -> Option<ProbeFailure> {
    let message = match (report.num_failed_tests, report.num_total_tests) {
        (Some(failed), Some(total)) if failed > 0 => {
            format!("Unit tests failed ({} of {} failing).", failed, total)
        }
        (Some(failed), _) if failed > 0 => format!("Unit tests failed ({} failing).", failed),
        _ if failed_test_count(report) > 0 => {
            "Unit tests failed (runner reported failure).".to_string()
        }
        _ => return None,
    };

    Some(ProbeFailure {
        kind: ProbeKind::UnitTests,
        severity: Severity::Critical,
        message,
    })
}

fn injection_scan_policy(report: &InjectionScanReport) -> Option<ProbeFailure> {
    if !report.vulnerable {
        return None;
    }

    let mut message = "SQL injection vulnerability detected.".to_string();
    if let Some(first) = report.findings.first() {
        message.push_str(&format!(
            " {} finding(s), first at {}.",
            report.findings.len(),
            first.endpoint
        ));
    }

    Some(ProbeFailure {
        kind: ProbeKind::InjectionScan,
        severity: Severity::Critical,
        message,
    })
}

fn load_test_policy(report: &LoadTestReport) -> Option<ProbeFailure> {
    let breached: Vec<String> = report
        .metrics
        .iter()
        .flatten()
        .flat_map(|(metric, data)| {
            data.thresholds
                .iter()
                .flatten()
                .filter(|(_, outcome)| !outcome.ok)
                .map(move |(threshold, _)| format!("{}[{}]", metric, threshold))
        })
        .collect();

    if breached.is_empty() {
        return None;
    }

    Some(ProbeFailure {
        kind: ProbeKind::LoadTest,
        severity: Severity::High,
        message: format!("Load test thresholds not met: {}.", breached.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, json: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_missing_artifact_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        for kind in ProbeKind::ALL {
            let outcome =
                evaluate_probe(kind, &dir.path().join(kind.default_file_name())).unwrap();
            assert_eq!(outcome, ProbeOutcome::default());
        }
    }

    #[test]
    fn test_failed_test_count_variants() {
        let parse_unit = |json: &str| serde_json::from_str::<UnitTestReport>(json).unwrap();

        assert_eq!(failed_test_count(&parse_unit(r#"{"numFailedTests": 3}"#)), 3);
        assert_eq!(failed_test_count(&parse_unit(r#"{"success": false}"#)), 1);
        assert_eq!(
            failed_test_count(&parse_unit(r#"{"numFailedTests": 0, "success": false}"#)),
            1
        );
        assert_eq!(
            failed_test_count(&parse_unit(r#"{"numFailedTests": 0, "success": true}"#)),
            0
        );
        assert_eq!(failed_test_count(&parse_unit("{}")), 0);
    }

    #[test]
    fn test_unit_failure_is_critical() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            UNIT_TEST_REPORT,
            r#"{"numFailedTests": 2, "numTotalTests": 40, "success": false}"#,
        );

        let outcome = evaluate_probe(ProbeKind::UnitTests, &path).unwrap();
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.severity, Severity::Critical);
        assert_eq!(failure.message, "Unit tests failed (2 of 40 failing).");

        let evidence = outcome.evidence.unwrap();
        assert_eq!(evidence.sha256.len(), 64);
        assert!(!evidence.passed);
    }

    #[test]
    fn test_injection_scan_policy() {
        let dir = tempfile::tempdir().unwrap();
        let clean = write(
            dir.path(),
            "clean.json",
            r#"{"vulnerable": false, "timestamp": "2026-01-01T00:00:00Z", "engine": "Prod-Guard SQLi Scanner"}"#,
        );
        let outcome = evaluate_probe(ProbeKind::InjectionScan, &clean).unwrap();
        assert!(outcome.failure.is_none());
        assert!(outcome.evidence.unwrap().passed);

        let dirty = write(
            dir.path(),
            "dirty.json",
            r#"{"vulnerable": true, "findings": [{"endpoint": "/api/support", "payload": "' OR 1=1 --"}]}"#,
        );
        let failure = evaluate_probe(ProbeKind::InjectionScan, &dirty)
            .unwrap()
            .failure
            .unwrap();
        assert_eq!(failure.severity, Severity::Critical);
        assert!(failure.message.contains("/api/support"));
    }

    #[test]
    fn test_load_test_lists_breached_thresholds_in_order() {
        let report: LoadTestReport = serde_json::from_str(
            r#"{"metrics": {
                "http_req_failed": {"type": "rate", "thresholds": {"rate<0.02": {"ok": false}}},
                "http_req_duration": {"thresholds": {"p(95)<2000": {"ok": false}, "p(99)<5000": {"ok": true}}},
                "iterations": {"values": {"count": 100}}
            }}"#,
        )
        .unwrap();

        let failure = load_test_policy(&report).unwrap();
        assert_eq!(failure.severity, Severity::High);
        assert_eq!(
            failure.message,
            "Load test thresholds not met: http_req_duration[p(95)<2000], http_req_failed[rate<0.02]."
        );
    }

    #[test]
    fn test_load_test_without_metrics_passes() {
        let report: LoadTestReport = serde_json::from_str(r#"{"metrics": null}"#).unwrap();
        assert!(load_test_policy(&report).is_none());
        assert!(load_test_policy(&LoadTestReport::default()).is_none());
    }

    #[test]
    fn test_malformed_artifact_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), INJECTION_SCAN_REPORT, r#"{"engine": "x"}"#);

        match evaluate_probe(ProbeKind::InjectionScan, &path) {
            Err(GuardError::MalformedArtifact { kind, .. }) => {
                assert_eq!(kind, ProbeKind::InjectionScan)
            }
            other => panic!("expected malformed artifact error, got {:?}", other),
        }
    }
}
