//! Check Registry
//!
//! Ordered list of checks built at startup. Registration order is run
//! order, which keeps verdict output reproducible.
//!
//! Each remediated artifact has exactly one owner: a check may only be
//! registered if none of its `fix_targets()` is already claimed.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::checks::{Check, CorsCheck};
use crate::error::{GuardError, GuardResult};
use crate::settings::GuardSettings;

#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
    write_owners: HashMap<PathBuf, String>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a check
    ///
    /// Fails on a duplicate id or when another check already owns one of
    /// its fix targets. Nothing is registered on failure.
    pub fn register(&mut self, check: Box<dyn Check>) -> GuardResult<()> {
        let id = check.id().to_string();
        if self.checks.iter().any(|c| c.id() == id) {
            return Err(GuardError::DuplicateCheck(id));
        }

        let targets = check.fix_targets();
        for target in &targets {
            if let Some(owner) = self.write_owners.get(target) {
                return Err(GuardError::WriteOwnershipConflict {
                    path: target.clone(),
                    first: owner.clone(),
                    second: id,
                });
            }
        }

        for target in targets {
            self.write_owners.insert(target, id.clone());
        }
        log::debug!("Registered check '{}'", id);
        self.checks.push(check);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.iter().map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Id of the check allowed to rewrite `path`, if any
    pub fn write_owner(&self, path: &std::path::Path) -> Option<&str> {
        self.write_owners.get(path).map(|s| s.as_str())
    }
}

/// Create a registry with all shipped checks
///
/// Includes:
/// - CORS safety (wildcard origins in the server entry point)
pub fn create_default_registry(settings: &GuardSettings) -> GuardResult<CheckRegistry> {
    let mut registry = CheckRegistry::new();

    registry.register(Box::new(
        CorsCheck::new(settings.cors_target()).with_origins(
            settings.cors.origins_env.clone(),
            settings.cors.default_origins.clone(),
        ),
    ))?;

    Ok(registry)
}
