//! Checking a signed hash against a claimed content digest and time.
//!
//! Verification is a pure function of its inputs and never returns an
//! error: anything that cannot be decoded is simply not verified.

use crate::attest::{bind, Timestamp};
use crate::hasher::ContentDigest;
use crate::keys::{decode_public_key, open};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::SIGNATURE_LENGTH;
use serde::Serialize;
use std::fmt;

/// Outcome of [`verify_detailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    /// The signature is authentic but covers a different bound digest.
    TamperedContent,
    /// The signature does not open under the given public key.
    BadSignature,
    /// A digest, key, or blob could not be decoded.
    MalformedInput,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Valid => "valid",
            Verdict::TamperedContent => "tampered content",
            Verdict::BadSignature => "bad signature",
            Verdict::MalformedInput => "malformed input",
        };
        f.write_str(s)
    }
}

/// `true` iff `signed_hash` opens under `public_key` to exactly the bound
/// digest of `content_hex` at `time`.
pub fn verify(content_hex: &str, time: Timestamp, signed_hash: &str, public_key: &str) -> bool {
    verify_detailed(content_hex, time, signed_hash, public_key).is_valid()
}

/// Like [`verify`], but says why verification failed.
///
/// `content_hex` may be upper or lower case; it is canonicalised to
/// lowercase before binding.
pub fn verify_detailed(
    content_hex: &str,
    time: Timestamp,
    signed_hash: &str,
    public_key: &str,
) -> Verdict {
    let Some(content) = ContentDigest::from_hex(content_hex.trim()) else {
        return Verdict::MalformedInput;
    };
    let blob = match STANDARD.decode(signed_hash.trim()) {
        Ok(blob) if blob.len() >= SIGNATURE_LENGTH => blob,
        _ => return Verdict::MalformedInput,
    };
    let Some(key) = decode_public_key(public_key) else {
        return Verdict::MalformedInput;
    };

    let expected = bind(&content.to_hex(), time);
    match open(&blob, &key) {
        Some(message) if message == expected.as_bytes() => Verdict::Valid,
        Some(_) => Verdict::TamperedContent,
        None => Verdict::BadSignature,
    }
}
