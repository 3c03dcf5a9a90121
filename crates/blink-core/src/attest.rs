//! Binding a content digest to the time it was taken.

use crate::error::Result;
use crate::hasher::{hash_file, ContentDigest};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Milliseconds since the Unix epoch at which a file was attested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn now() -> Self {
        Timestamp(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Timestamp(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 over `"{content_hex}:{timestamp}"`, held as lowercase hex.
///
/// The hex text is what gets signed, so it is the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundDigest(String);

impl BoundDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for BoundDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the bound digest for a content digest given as hex.
///
/// The hex is hashed exactly as supplied; callers normalise case first.
pub fn bind(content_hex: &str, time: Timestamp) -> BoundDigest {
    let mut hasher = Sha256::new();
    hasher.update(content_hex.as_bytes());
    hasher.update(b":");
    hasher.update(time.0.to_string().as_bytes());
    BoundDigest(hex::encode(hasher.finalize()))
}

/// One hashing of a file at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub content: ContentDigest,
    pub time: Timestamp,
    pub bound: BoundDigest,
}

impl Attestation {
    pub fn new(content: ContentDigest, time: Timestamp) -> Self {
        let bound = bind(&content.to_hex(), time);
        Self {
            content,
            time,
            bound,
        }
    }
}

/// Hash `path`, then capture the current time and bind the two.
pub fn attest_file(path: &Path) -> Result<Attestation> {
    let content = hash_file(path)?;
    let attestation = Attestation::new(content, Timestamp::now());
    debug!(
        file = %path.display(),
        file_hash = %attestation.content,
        time = attestation.time.as_millis(),
        hash = %attestation.bound,
        "attested file"
    );
    Ok(attestation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_golden_value() {
        let bound = bind(
            "5d41402abc4b2a76b9719d911017c592",
            Timestamp::from_millis(1_700_000_000_000),
        );
        assert_eq!(
            bound.as_str(),
            "4b878aff983d35216eb9a8fea1856d34b92774422879186457db7e28579b909d"
        );
    }

    #[test]
    fn test_bind_differs_by_timestamp() {
        let hex = ContentDigest::of_bytes(b"hello").to_hex();
        let a = bind(&hex, Timestamp::from_millis(1));
        let b = bind(&hex, Timestamp::from_millis(2));
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_bind_is_case_sensitive() {
        let t = Timestamp::from_millis(1_700_000_000_000);
        assert_ne!(
            bind("5d41402abc4b2a76b9719d911017c592", t),
            bind("5D41402ABC4B2A76B9719D911017C592", t)
        );
    }

    #[test]
    fn test_attestation_new_binds_hex() {
        let content = ContentDigest::of_bytes(b"hello");
        let t = Timestamp::from_millis(1_700_000_000_000);
        let att = Attestation::new(content, t);
        assert_eq!(att.bound, bind(&content.to_hex(), t));
    }

    #[test]
    fn test_attest_file_uses_current_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let before = Timestamp::now();
        let att = attest_file(&path).unwrap();
        let after = Timestamp::now();

        assert_eq!(att.content, ContentDigest::of_bytes(b"hello"));
        assert!(before <= att.time && att.time <= after);
        assert_eq!(att.bound, bind(&att.content.to_hex(), att.time));
    }

    #[test]
    fn test_timestamp_serializes_as_integer() {
        let json = serde_json::to_string(&Timestamp::from_millis(42)).unwrap();
        assert_eq!(json, "42");
    }
}
