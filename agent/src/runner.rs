//! Gate execution
//!
//! Loads settings, evaluates the gate once, prints and optionally saves
//! the verdict.

use std::path::{Path, PathBuf};
use std::time::Instant;

use guard_kit::analyzer::Analyzer;
use guard_kit::settings::GuardSettings;
use guard_kit::{GateVerdict, GuardError};

use crate::config::RunConfig;
use crate::output::{self, RunMetadata};

/// Run the gate with the given configuration, returning the exit code
pub fn run_gate(config: &RunConfig) -> Result<i32, RunError> {
    let start = Instant::now();

    let settings = GuardSettings::from_env(config.root.clone()).map_err(RunError::Settings)?;
    let analyzer = Analyzer::from_settings(&settings).map_err(RunError::Registry)?;

    if !config.quiet {
        println!();
        println!("Prod-Guard v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "Evaluating {} check(s) and probe artifacts in {}...",
            analyzer.registry().len(),
            settings.root.display()
        );
    }

    let run = RunMetadata::new();
    let verdict = analyzer.evaluate().map_err(RunError::Evaluation)?;

    if !config.quiet {
        output::print_details(&verdict);
    }
    output::print_verdict(&verdict);

    if let Some(output_path) = &config.output_file {
        let written = save_report(&verdict, config, output_path, &run)?;
        if !config.quiet {
            println!("Verdict saved to: {}", written.display());
        }
    }

    if !config.quiet {
        print_execution_info(start.elapsed(), &run);
    }

    Ok(verdict.exit_code())
}

/// Write the JSON report; a directory gets the format's default file name
fn save_report(
    verdict: &GateVerdict,
    config: &RunConfig,
    output_path: &Path,
    run: &RunMetadata,
) -> Result<PathBuf, RunError> {
    let path = if output_path.is_dir() {
        output_path.join(config.report_format.default_filename())
    } else {
        output_path.to_path_buf()
    };

    let json =
        output::build_report(verdict, config.report_format, run).map_err(RunError::Output)?;

    std::fs::write(&path, json).map_err(|e| RunError::WriteFile(path.display().to_string(), e))?;
    log::debug!("Wrote {} report to {}", config.report_format, path.display());

    Ok(path)
}

/// Print execution information
fn print_execution_info(duration: std::time::Duration, run: &RunMetadata) {
    println!("────────────────────────────────────────────────────────────────────────────────");
    println!("  Run:          {}", run.run_id);
    println!("  Duration:     {:.2}s", duration.as_secs_f64());
    println!("────────────────────────────────────────────────────────────────────────────────");
    println!();
}

/// Errors that stop the gate before a verdict is reported
#[derive(Debug)]
pub enum RunError {
    /// Settings could not be loaded
    Settings(GuardError),
    /// Check registry could not be built
    Registry(GuardError),
    /// Evaluation could not complete
    Evaluation(GuardError),
    /// Failed to serialize the report
    Output(serde_json::Error),
    /// Failed to write the report file
    WriteFile(String, std::io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Settings(e) => write!(f, "Settings failed: {}", e),
            RunError::Registry(e) => write!(f, "Registry creation failed: {}", e),
            RunError::Evaluation(e) => write!(f, "Evaluation failed: {}", e),
            RunError::Output(e) => write!(f, "Report generation failed: {}", e),
            RunError::WriteFile(path, e) => write!(f, "Failed to write {}: {}", path, e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Settings(e) | RunError::Registry(e) | RunError::Evaluation(e) => Some(e),
            RunError::Output(e) => Some(e),
            RunError::WriteFile(_, e) => Some(e),
        }
    }
}
