//! Probe artifact schema
//!
//! Wire shapes written by the external probe runners. Field names follow
//! the JSON the runners emit (camelCase for the jest summary, k6 names for
//! the load test). Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `unit-test-result.json`, the jest summary or a bare `{success}` flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTestReport {
    #[serde(default)]
    pub num_failed_tests: Option<u64>,
    #[serde(default)]
    pub num_total_tests: Option<u64>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// `sql-injection-result.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionScanReport {
    pub vulnerable: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub findings: Vec<InjectionFinding>,
}

/// Endpoint/payload pair the scanner considered exploitable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionFinding {
    pub endpoint: String,
    pub payload: String,
}

/// `load-test-result.json`, the k6 summary export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadTestReport {
    #[serde(default)]
    pub metrics: Option<BTreeMap<String, LoadMetric>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadMetric {
    #[serde(default)]
    pub thresholds: Option<BTreeMap<String, ThresholdOutcome>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdOutcome {
    pub ok: bool,
}
