//! Error taxonomy for hashing, signing, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the attestation pipeline.
///
/// Verification never produces one of these; see [`crate::Verdict`].
#[derive(Debug, Error)]
pub enum BlinkError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No private key found (set {var})")]
    MissingKey { var: String },

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("cannot read config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl BlinkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BlinkError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BlinkError>;
