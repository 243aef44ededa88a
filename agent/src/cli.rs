//! Command-line interface parsing
//!
//! Invoked without arguments the gate evaluates the working directory and
//! prints its verdict. Every option is additive.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ReportFormat, RunConfig};

const EXIT_CODES: &str = "\
EXIT CODES:
    0    Deployment authorized
    1    Deployment blocked, or an autofix was applied (re-run required)
    2    Execution error (malformed artifact, I/O, invalid settings)

ENVIRONMENT:
    PROD_GUARD_ROOT              Gate root (default: working directory)
    PROD_GUARD_CONFIG            Settings file (default: <root>/prod-guard.toml)
    PROD_GUARD_CORS_TARGET       Server entry point inspected by the CORS check
    PROD_GUARD_UNIT_REPORT       Unit test report path
    PROD_GUARD_INJECTION_REPORT  Injection scan report path
    PROD_GUARD_LOAD_REPORT       Load test report path
    RUST_LOG                     Log filter (default: info)";

/// Prod-Guard deployment gate
#[derive(Debug, Parser)]
#[command(
    name = "prod_guard",
    version,
    about = "Evaluates release checks and probe artifacts into a deploy/no-deploy verdict",
    after_help = EXIT_CODES
)]
pub struct Cli {
    /// Suppress banner and per-check table
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write the verdict as JSON to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// JSON report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Full)]
    pub format: ReportFormat,

    /// Gate root directory
    #[arg(short = 'C', long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            root: self.root,
            output_file: self.output,
            report_format: self.format,
            quiet: self.quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_is_minimal_run() {
        let config = Cli::try_parse_from(["prod_guard"]).unwrap().into_config();

        assert!(config.root.is_none());
        assert!(config.output_file.is_none());
        assert_eq!(config.report_format, ReportFormat::Full);
        assert!(!config.quiet);
    }

    #[test]
    fn test_all_options() {
        let config = Cli::try_parse_from([
            "prod_guard",
            "-q",
            "--output",
            "verdict.json",
            "--format",
            "summary",
            "-C",
            "/srv/app",
        ])
        .unwrap()
        .into_config();

        assert!(config.quiet);
        assert_eq!(config.output_file, Some(PathBuf::from("verdict.json")));
        assert_eq!(config.report_format, ReportFormat::Summary);
        assert_eq!(config.root, Some(PathBuf::from("/srv/app")));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["prod_guard", "--format", "attestation"]).is_err());
    }

    #[test]
    fn test_positional_arguments_rejected() {
        assert!(Cli::try_parse_from(["prod_guard", "staging"]).is_err());
    }
}
