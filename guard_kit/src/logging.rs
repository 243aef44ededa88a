//! Logger bootstrap
//!
//! The library only emits through the `log` facade. Binaries call
//! [`init_global_logging`] once before evaluating the gate.

use env_logger::{Builder, Env, Target};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install `env_logger` as the global logger, writing to stderr
///
/// Honors `RUST_LOG`; falls back to [`DEFAULT_FILTER`].
pub fn init_global_logging() -> Result<(), log::SetLoggerError> {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .target(Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .try_init()
}
