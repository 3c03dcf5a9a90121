//! Producing signed, timestamped hashes of files.

use crate::attest::{attest_file, Timestamp};
use crate::config::PRIVATE_KEY_ENV;
use crate::error::{BlinkError, Result};
use crate::hasher::ContentDigest;
use crate::keys::{decode_signing_key, seal};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// The proof handed to a verifier.
///
/// `signed_hash` is base64 of `signature || bound digest hex`. The content
/// digest is carried alongside so a verifier without the file can still
/// recompute the bound digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedHash {
    pub signed_hash: String,
    pub time: Timestamp,
    pub content_hash: ContentDigest,
}

/// Signs files with a private key taken from configuration.
///
/// Construction never fails; a missing key is only reported when signing.
#[derive(Clone)]
pub struct Signer {
    private_key: Option<String>,
    source: String,
}

impl Signer {
    pub fn new(private_key: impl Into<String>) -> Self {
        Self {
            private_key: Some(private_key.into()),
            source: "explicit key".to_string(),
        }
    }

    /// Read the key from [`PRIVATE_KEY_ENV`].
    pub fn from_env() -> Self {
        Self::from_env_var(PRIVATE_KEY_ENV)
    }

    pub fn from_env_var(var: &str) -> Self {
        Self {
            private_key: std::env::var(var).ok().filter(|k| !k.trim().is_empty()),
            source: var.to_string(),
        }
    }

    pub fn has_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn sign(&self, path: &Path) -> Result<SignedHash> {
        let encoded = self
            .private_key
            .as_deref()
            .ok_or_else(|| BlinkError::MissingKey {
                var: self.source.clone(),
            })?;
        sign_with(path, encoded)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("has_key", &self.has_key())
            .field("source", &self.source)
            .finish()
    }
}

/// Sign `path` with an optional base58 private key.
///
/// `None` fails with [`BlinkError::MissingKey`] before the file is touched.
pub fn sign_file(path: &Path, private_key: Option<&str>) -> Result<SignedHash> {
    match private_key {
        Some(key) => sign_with(path, key),
        None => Err(BlinkError::MissingKey {
            var: PRIVATE_KEY_ENV.to_string(),
        }),
    }
}

fn sign_with(path: &Path, encoded_key: &str) -> Result<SignedHash> {
    let key = decode_signing_key(encoded_key)?;
    let attestation = attest_file(path)?;
    let sealed = seal(&key, attestation.bound.as_bytes());
    info!(file = %path.display(), time = attestation.time.as_millis(), "signed file hash");
    Ok(SignedHash {
        signed_hash: STANDARD.encode(sealed),
        time: attestation.time,
        content_hash: attestation.content,
    })
}
