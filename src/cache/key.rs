//! Cache keys and blob names

use sha2::{Digest, Sha256};

/// Request identity: method and absolute URL.
///
/// The URL is stored verbatim; callers pass the already-normalised form
/// produced by `Url::as_str`.
pub fn request_key(method: &str, url: &str) -> String {
    format!("{} {}", method.to_ascii_uppercase(), url)
}

/// Deterministic file name for an entry body stored outside SQLite.
///
/// SHA-256 over the store name and request key, so the same request cached
/// by two generations never shares a blob.
pub fn blob_name(cache_name: &str, request_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(cache_name.as_bytes());
    hasher.update(b"|");
    hasher.update(request_key.as_bytes());
    format!("{:x}", hasher.finalize())
}
