//! Error types for gate evaluation
//!
//! Policy violations are never errors; they end up in the verdict.
//! Everything here stops the evaluation before a verdict is produced.

use std::path::PathBuf;

use thiserror::Error;

use crate::probes::ProbeKind;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {kind} artifact {}: {source}", path.display())]
    MalformedArtifact {
        kind: ProbeKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("check '{0}' is already registered")]
    DuplicateCheck(String),

    #[error("checks '{first}' and '{second}' both remediate {}", path.display())]
    WriteOwnershipConflict {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("check '{0}' reported an autofix but does not implement fix()")]
    FixUnsupported(String),

    #[error("check '{0}' reported a fixable violation but fix() changed nothing")]
    RemediationIneffective(String),
}

impl GuardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GuardError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type GuardResult<T> = Result<T, GuardError>;
