//! # Fingerprint Module
//!
//! Content digests for exact-duplicate detection.
//!
//! A fingerprint is the 128-bit XXH3 digest of the whole file. It only has to
//! tell byte-identical files apart from different ones, so a fast
//! non-cryptographic hash is enough.
//!
//! Files that cannot be read get [`ContentFingerprint::Unknown`], which never
//! matches anything. A read failure must never cause two photos to be treated
//! as duplicates.

mod registry;

pub use registry::FingerprintRegistry;

use crate::core::decode::read_file_bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_128;

/// Digest of a file's bytes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ContentFingerprint {
    Digest(u128),
    /// The file could not be read
    Unknown,
}

impl ContentFingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        ContentFingerprint::Digest(xxh3_128(bytes))
    }

    /// Fingerprint the file at `path`; unreadable files yield `Unknown`
    pub fn of_file(path: &Path) -> Self {
        match read_file_bytes(path) {
            Ok(bytes) => Self::of_bytes(&bytes),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "fingerprint unavailable");
                ContentFingerprint::Unknown
            }
        }
    }

    /// Key usable for deduplication, `None` for `Unknown`
    pub fn dedup_key(&self) -> Option<u128> {
        match self {
            ContentFingerprint::Digest(d) => Some(*d),
            ContentFingerprint::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.dedup_key().is_some()
    }
}

/// `Unknown` is unequal to everything, itself included, so this is
/// deliberately `PartialEq` without `Eq`.
impl PartialEq for ContentFingerprint {
    fn eq(&self, other: &Self) -> bool {
        match (self.dedup_key(), other.dedup_key()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentFingerprint::Digest(d) => write!(f, "{:032x}", d),
            ContentFingerprint::Unknown => f.write_str("unknown"),
        }
    }
}
