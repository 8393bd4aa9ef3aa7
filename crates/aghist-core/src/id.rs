use aghist_types::Vendor;
use sha2::{Digest, Sha256};

/// Derive the stable chat ID for a conversation.
///
/// The ID is the first 16 hex chars of SHA-256 over `"{vendor}:{unique_key}"`.
/// The vendor prefix keeps IDs from colliding across agents even when their
/// key material happens to match. Key material must itself be stable: the
/// same conversation on the same machine maps to the same ID run after run.
pub fn chat_id(vendor: Vendor, unique_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", vendor.as_str(), unique_key).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
