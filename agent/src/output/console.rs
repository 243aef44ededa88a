//! Console output formatting
//!
//! Failures go to stderr, autofix notes and the authorization line to
//! stdout. The check table is only shown when not quiet.

use guard_kit::probes::ProbeEvidence;
use guard_kit::GateVerdict;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Print the per-check and per-probe table
pub fn print_details(verdict: &GateVerdict) {
    println!();
    println!("╔═══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                              GATE RESULTS                                     ║");
    println!("╚═══════════════════════════════════════════════════════════════════════════════╝");
    println!();

    for result in &verdict.checks {
        if result.ok {
            println!("  {}✓{} {}", GREEN, RESET, result.name);
        } else if result.autofix_available {
            println!(
                "  {}⚙{} {} [{}] {}",
                YELLOW, RESET, result.name, result.severity, result.message
            );
        } else {
            println!(
                "  {}✗{} {} [{}] {}",
                RED, RESET, result.name, result.severity, result.message
            );
        }
    }

    for evidence in &verdict.evidence {
        let (icon, color) = probe_status(evidence);
        println!(
            "  {}{}{} probe {} ({}, sha256 {})",
            color,
            icon,
            RESET,
            evidence.kind,
            evidence.path.display(),
            short_hash(&evidence.sha256)
        );
    }
    println!();
}

/// Print autofix notes, failures, and the final verdict line
pub fn print_verdict(verdict: &GateVerdict) {
    if verdict.rerun_required() {
        println!("{}PROD-GUARD: AUTO-FIXED ISSUES:{}", YELLOW, RESET);
        for note in &verdict.autofixes_applied {
            println!("  - {}", note);
        }
        println!("Please re-run Prod-Guard to authorize deployment.");
    }

    if !verdict.failures.is_empty() {
        eprintln!("{}PROD-GUARD: DEPLOYMENT BLOCKED.{}", RED, RESET);
        for line in verdict.failure_lines() {
            eprintln!("  - {}", line);
        }
    }

    if verdict.authorized {
        println!(
            "{}PROD-GUARD: ALL SYSTEMS GO. DEPLOYMENT AUTHORIZED.{}",
            GREEN, RESET
        );
    }
}

fn probe_status(evidence: &ProbeEvidence) -> (&'static str, &'static str) {
    if evidence.passed {
        ("✓", GREEN)
    } else {
        ("✗", RED)
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guard_kit::probes::ProbeKind;
    use std::path::PathBuf;

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash(&"a".repeat(64)), "aaaaaaaaaaaa");
        assert_eq!(short_hash("abc"), "abc");
    }

    #[test]
    fn test_probe_status_follows_evidence() {
        let mut evidence = ProbeEvidence {
            kind: ProbeKind::UnitTests,
            path: PathBuf::from("unit-test-result.json"),
            sha256: "0".repeat(64),
            passed: true,
        };
        assert_eq!(probe_status(&evidence), ("✓", GREEN));

        evidence.passed = false;
        assert_eq!(probe_status(&evidence), ("✗", RED));
    }
}
