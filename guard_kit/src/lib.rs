//! # Prod-Guard Kit
//!
//! Release gating engine for CI/CD pipelines.
//! Provides pluggable configuration checks, probe artifact policy, and the
//! analyzer that turns both into a single deploy/no-deploy verdict.
//!
//! ## Modules
//!
//! - `checks` - Check trait, results, and shipped checks (CORS safety)
//! - `probes` - Probe artifact schema and category policy
//! - `registry` - Ordered check registry with write-ownership tracking
//! - `analyzer` - Gate engine producing a `GateVerdict`
//! - `settings` - Paths and CORS options (defaults, TOML, environment)
//! - `logging` - Logger bootstrap for binaries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use guard_kit::analyzer::Analyzer;
//! use guard_kit::settings::GuardSettings;
//!
//! let settings = GuardSettings::from_env(None)?;
//! let verdict = Analyzer::from_settings(&settings)?.evaluate()?;
//!
//! if !verdict.authorized {
//!     for failure in &verdict.failures {
//!         eprintln!("{}", failure);
//!     }
//! }
//! std::process::exit(verdict.exit_code());
//! ```

pub mod analyzer;
pub mod checks;
pub mod error;
pub mod logging;
pub mod probes;
pub mod registry;
pub mod settings;

pub use analyzer::{Analyzer, GateFailure, GateVerdict};
pub use checks::{Check, CheckResult, FixOutcome, Severity};
pub use error::{GuardError, GuardResult};
