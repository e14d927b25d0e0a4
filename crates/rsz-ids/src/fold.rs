//! Domain-separated BLAKE3 folding of arbitrary bytes into an `i64`.

use rsz_types::Uuid;

/// Domain tag for composite IDs.
pub(crate) const COMPOSITE_DOMAIN: &str = "rsz-id-v1";
const GUID_DOMAIN: &str = "rsz-guid-v1";
const STRING_DOMAIN: &str = "rsz-str-v1";

/// Finish a hasher into an ID: the first 8 digest bytes, little-endian.
pub(crate) fn finish(hasher: &blake3::Hasher) -> i64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    i64::from_le_bytes(bytes)
}

/// Start a hasher with a domain prefix.
pub(crate) fn domain_hasher(domain: &str) -> blake3::Hasher {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain.as_bytes());
    hasher.update(b":");
    hasher
}

fn fold(domain: &str, data: &[u8]) -> i64 {
    let mut hasher = domain_hasher(domain);
    hasher.update(data);
    finish(&hasher)
}

/// Stable ID for a GUID.
pub fn guid_to_id(guid: &Uuid) -> i64 {
    fold(GUID_DOMAIN, guid.as_bytes())
}

/// Stable ID for a string.
pub fn string_to_id(s: &str) -> i64 {
    fold(STRING_DOMAIN, s.as_bytes())
}
