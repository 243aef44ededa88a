//! JSON verdict report
//!
//! Builds the machine-readable form of a verdict for `--output`.

use chrono::{DateTime, Utc};
use guard_kit::checks::CheckResult;
use guard_kit::probes::ProbeEvidence;
use guard_kit::{GateFailure, GateVerdict};
use serde::Serialize;
use uuid::Uuid;

use crate::config::ReportFormat;

/// Identity of the run a report belongs to
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
}

impl RunMetadata {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            evaluated_at: Utc::now(),
        }
    }
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct AgentInfo {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct SummaryReport {
    agent: AgentInfo,
    run_id: Uuid,
    evaluated_at: DateTime<Utc>,
    authorized: bool,
    rerun_required: bool,
    failure_count: usize,
    autofix_count: usize,
}

#[derive(Debug, Serialize)]
struct FullReport<'a> {
    #[serde(flatten)]
    summary: SummaryReport,
    failures: &'a [GateFailure],
    autofixes_applied: &'a [String],
    checks: &'a [CheckResult],
    evidence: &'a [ProbeEvidence],
}

fn build_summary(verdict: &GateVerdict, run: &RunMetadata) -> SummaryReport {
    SummaryReport {
        agent: AgentInfo {
            name: "prod-guard",
            version: env!("CARGO_PKG_VERSION"),
        },
        run_id: run.run_id,
        evaluated_at: run.evaluated_at,
        authorized: verdict.authorized,
        rerun_required: verdict.rerun_required(),
        failure_count: verdict.failures.len(),
        autofix_count: verdict.autofixes_applied.len(),
    }
}

/// Render the report as pretty JSON
pub fn build_report(
    verdict: &GateVerdict,
    format: ReportFormat,
    run: &RunMetadata,
) -> Result<String, serde_json::Error> {
    let summary = build_summary(verdict, run);
    match format {
        ReportFormat::Summary => serde_json::to_string_pretty(&summary),
        ReportFormat::Full => serde_json::to_string_pretty(&FullReport {
            summary,
            failures: &verdict.failures,
            autofixes_applied: &verdict.autofixes_applied,
            checks: &verdict.checks,
            evidence: &verdict.evidence,
        }),
    }
}
