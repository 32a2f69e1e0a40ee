use sha2::{Digest, Sha256};

/// Unsalted SHA-256 of the PIN as lowercase hex.
///
/// Stored hashes depend on this exact format; adding a salt or a KDF needs a
/// migration of existing `player.pin_hash` values.
pub fn hash_pin(pin: &str) -> String {
    format!("{:x}", Sha256::digest(pin.as_bytes()))
}

pub fn pin_matches(pin: &str, stored_hash: &str) -> bool {
    hash_pin(pin) == stored_hash
}

/// Treats blank form input as "no PIN".
pub fn normalize_pin(pin: Option<&str>) -> Option<&str> {
    pin.filter(|p| !p.is_empty())
}
