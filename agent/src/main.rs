//! # Prod-Guard
//!
//! Deployment gate for CI/CD pipelines. Runs the registered configuration
//! checks (auto-fixing what is safe to fix), evaluates the probe artifacts
//! left by the unit, injection and load test runners, and exits with the
//! verdict.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate the working directory
//! prod_guard
//!
//! # Evaluate another checkout and keep a JSON verdict
//! prod_guard -C /srv/app --output verdict.json
//! ```
//!
//! ## Exit Codes
//!
//! - **0**: deployment authorized
//! - **1**: deployment blocked, or an autofix was applied and the gate must
//!   be re-run
//! - **2**: execution error; no verdict was produced

mod cli;
mod config;
mod output;
mod runner;

use clap::Parser;
use cli::Cli;
use guard_kit::logging;

fn main() {
    // Initialize logging
    if let Err(e) = logging::init_global_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    // Usage errors exit 2, --help and --version exit 0
    let config = Cli::parse().into_config();

    let exit_code = match runner::run_gate(&config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}
