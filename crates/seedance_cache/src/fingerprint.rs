//! Request fingerprints used as cache keys.

use seedance_core::GenerationRequest;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Hex-encoded SHA-256 digest identifying a deterministic request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("{_0}")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digest as lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Computes the cache key for a request.
///
/// The key covers prompt, model, `max_tokens` and temperature, encoded as JSON
/// with sorted keys. Returns `None` unless the request is deterministic.
pub fn fingerprint(request: &GenerationRequest) -> Option<Fingerprint> {
    if !request.is_deterministic() {
        return None;
    }

    let mut fields: BTreeMap<&str, Value> = BTreeMap::new();
    fields.insert("prompt", json!(request.prompt()));
    fields.insert("model", json!(request.model()));
    fields.insert("max_tokens", json!(request.max_tokens()));
    // -0.0 and 0.0 must hash alike
    fields.insert("temperature", json!(request.temperature().abs()));

    let canonical = serde_json::to_string(&fields).ok()?;
    let digest = Sha256::digest(canonical.as_bytes());
    let hex = digest.iter().map(|b| format!("{:02x}", b)).collect::<String>();
    Some(Fingerprint(hex))
}
