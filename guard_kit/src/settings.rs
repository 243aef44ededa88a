//! Gate settings
//!
//! Resolution order, later wins:
//! 1. built-in defaults (conventional file names under the gate root)
//! 2. `prod-guard.toml` in the root, or the file named by `PROD_GUARD_CONFIG`
//! 3. `PROD_GUARD_*` environment variables
//!
//! Relative paths resolve against the root.
//!
//! ```toml
//! [artifacts]
//! unit_tests = "reports/unit-test-result.json"
//!
//! [cors]
//! target = "server/index.js"
//! origins_env = "ALLOWED_ORIGINS"
//! default_origins = ["http://localhost:3000"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checks::cors::{default_origins, DEFAULT_ORIGINS_ENV};
use crate::error::{GuardError, GuardResult};
use crate::probes::{ProbePaths, INJECTION_SCAN_REPORT, LOAD_TEST_REPORT, UNIT_TEST_REPORT};

pub const SETTINGS_FILE_NAME: &str = "prod-guard.toml";

pub const ENV_ROOT: &str = "PROD_GUARD_ROOT";
pub const ENV_CONFIG: &str = "PROD_GUARD_CONFIG";
pub const ENV_CORS_TARGET: &str = "PROD_GUARD_CORS_TARGET";
pub const ENV_UNIT_REPORT: &str = "PROD_GUARD_UNIT_REPORT";
pub const ENV_INJECTION_REPORT: &str = "PROD_GUARD_INJECTION_REPORT";
pub const ENV_LOAD_REPORT: &str = "PROD_GUARD_LOAD_REPORT";

pub const DEFAULT_CORS_TARGET: &str = "backend-node/src/index.js";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardSettings {
    /// Base directory; never read from the settings file
    #[serde(skip)]
    pub root: PathBuf,
    pub artifacts: ArtifactSettings,
    pub cors: CorsSettings,
}

/// Probe artifact locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactSettings {
    pub unit_tests: PathBuf,
    pub injection_scan: PathBuf,
    pub load_test: PathBuf,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            unit_tests: PathBuf::from(UNIT_TEST_REPORT),
            injection_scan: PathBuf::from(INJECTION_SCAN_REPORT),
            load_test: PathBuf::from(LOAD_TEST_REPORT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsSettings {
    /// Server entry point inspected by the CORS check
    pub target: PathBuf,
    /// Variable the patched server reads its allow-list from
    pub origins_env: String,
    /// Fallback allow-list written into the patched server
    pub default_origins: Vec<String>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            target: PathBuf::from(DEFAULT_CORS_TARGET),
            origins_env: DEFAULT_ORIGINS_ENV.to_string(),
            default_origins: default_origins(),
        }
    }
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            artifacts: ArtifactSettings::default(),
            cors: CorsSettings::default(),
        }
    }
}

impl GuardSettings {
    /// Defaults rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load from the process environment
    pub fn from_env(root_override: Option<PathBuf>) -> GuardResult<Self> {
        Self::from_lookup(root_override, |key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment
    pub fn from_lookup<F>(root_override: Option<PathBuf>, lookup: F) -> GuardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = match root_override.or_else(|| lookup(ENV_ROOT).map(PathBuf::from)) {
            Some(root) => root,
            None => std::env::current_dir().map_err(|e| GuardError::io(".", e))?,
        };

        let mut settings = match lookup(ENV_CONFIG) {
            Some(explicit) => Self::load_file(&resolve(&root, Path::new(&explicit)))?,
            None => {
                let candidate = root.join(SETTINGS_FILE_NAME);
                if candidate.is_file() {
                    Self::load_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        settings.root = root;

        if let Some(v) = lookup(ENV_CORS_TARGET) {
            settings.cors.target = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_UNIT_REPORT) {
            settings.artifacts.unit_tests = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_INJECTION_REPORT) {
            settings.artifacts.injection_scan = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_LOAD_REPORT) {
            settings.artifacts.load_test = PathBuf::from(v);
        }

        Ok(settings)
    }

    fn load_file(path: &Path) -> GuardResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| GuardError::io(path, e))?;
        let settings: Self = toml::from_str(&text).map_err(|source| GuardError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn cors_target(&self) -> PathBuf {
        resolve(&self.root, &self.cors.target)
    }

    pub fn probe_paths(&self) -> ProbePaths {
        ProbePaths {
            unit_tests: resolve(&self.root, &self.artifacts.unit_tests),
            injection_scan: resolve(&self.root, &self.artifacts.injection_scan),
            load_test: resolve(&self.root, &self.artifacts.load_test),
        }
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
