use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

/// Deterministic hash for schedule generation inputs.
///
/// Hashes a trimmed, lower-cased version of the input so whitespace or casing
/// variations of the same request land on the same cache entry.
pub fn semantic_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    let normalized = input.trim().to_lowercase();
    hasher.update(normalized.as_bytes());

    let digest = hasher.finalize();
    STANDARD_NO_PAD.encode(digest)
}
