//! MD5 content hashing for files and byte buffers.

use crate::error::{BlinkError, Result};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const STREAM_BUF_SIZE: usize = 65536;

/// Digest of a file's raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 16]);

impl ContentDigest {
    /// Hash an in-memory buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        ContentDigest(md5::compute(bytes).0)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex, the form that is fed into the bound digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 32-character hex digest, accepting either case.
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut out = [0u8; 16];
        hex::decode_to_slice(s, &mut out).ok()?;
        Some(ContentDigest(out))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentDigest::from_hex(&s)
            .ok_or_else(|| de::Error::custom("expected 32 hex characters"))
    }
}

/// Hash a file's contents, streaming it through a fixed buffer.
pub fn hash_file(path: &Path) -> Result<ContentDigest> {
    let mut file = File::open(path).map_err(|e| BlinkError::io(path, e))?;
    let mut ctx = md5::Context::new();
    let mut buf = vec![0u8; STREAM_BUF_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|e| BlinkError::io(path, e))?;
        if n == 0 {
            break;
        }
        ctx.consume(&buf[..n]);
    }
    Ok(ContentDigest(ctx.compute().0))
}
