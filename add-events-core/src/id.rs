use sha2::{Digest, Sha512};

/// Event id for a fully prefixed title: lowercase hex SHA-512 of its UTF-8 bytes.
///
/// Google accepts base32hex ids of 5 to 1024 characters, and hex digits are a
/// subset of that alphabet. Re-running against the same title reuses the id,
/// so the calendar rejects the duplicate instead of creating a second event.
pub fn event_id(title: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(title.as_bytes());
    hex::encode(hasher.finalize())
}
