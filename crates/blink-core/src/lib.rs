//! Tamper-evident file attestation.
//!
//! This crate hashes a file, binds the digest to the moment it was taken, and
//! signs the result with Ed25519 so that a third party holding only the public
//! key can later confirm the file was in that exact state at that exact time.
//! It also keeps an in-memory registry of tracked files and a periodic monitor
//! that re-hashes them and reports drift.
//!
//! # Example
//!
//! ```
//! use blink_core::{bind, ContentDigest, Timestamp};
//!
//! let digest = ContentDigest::of_bytes(b"hello");
//! assert_eq!(digest.to_hex(), "5d41402abc4b2a76b9719d911017c592");
//!
//! let bound = bind(&digest.to_hex(), Timestamp::from_millis(1_700_000_000_000));
//! assert_eq!(
//!     bound.as_str(),
//!     "4b878aff983d35216eb9a8fea1856d34b92774422879186457db7e28579b909d"
//! );
//! ```

mod attest;
mod config;
mod error;
mod hasher;
mod keys;
mod monitor;
mod registry;
mod signer;
mod verify;

pub use attest::{attest_file, bind, Attestation, BoundDigest, Timestamp};
pub use config::{BlinkConfig, DEFAULT_INTERVAL, DEFAULT_INTERVAL_MS, PRIVATE_KEY_ENV};
pub use error::{BlinkError, Result};
pub use hasher::{hash_file, ContentDigest};
pub use keys::{decode_public_key, decode_signing_key, open};
pub use monitor::{Monitor, MonitorHandle};
pub use registry::{DriftEvent, Registry, ScanReport, TrackedEntry};
pub use signer::{sign_file, SignedHash, Signer};
pub use verify::{verify, verify_detailed, Verdict};
