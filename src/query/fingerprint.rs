//! Content fingerprints over canonical query strings.

use serde::{Deserialize, Serialize};

/// A deterministic hash of a query's canonical textual form.
///
/// Used as the cache key and as the de-duplication key for generated
/// variants. Stable across processes, so persistent caches can share
/// fingerprints between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint of a canonical string.
    pub fn of(canonical: &str) -> Fingerprint {
        Fingerprint(*blake3::hash(canonical.as_bytes()).as_bytes())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Construct from raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Fingerprint {
        Fingerprint(bytes)
    }

    /// Lowercase hex rendering, usable as a file name.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in &self.0 {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
