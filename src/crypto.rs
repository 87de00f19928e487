use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generates `bytes` random bytes and returns them hex encoded.
///
/// The result has `2 * bytes` lowercase hex characters.
///
/// # Example
///
/// ```rust
/// use warden::crypto::random_hex;
///
/// let token = random_hex(16);
/// assert_eq!(token.len(), 32);
/// ```
pub fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Hashes a token using SHA-256 for storage comparison.
/// Tokens are high-entropy random strings, so a fast hash is appropriate.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time comparison to prevent timing attacks.
///
/// Slices of different length compare unequal; the length itself is not
/// treated as secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Returns true if `value` is non-empty lowercase hex of exactly `len` chars.
pub(crate) fn is_lower_hex(value: &str, len: usize) -> bool {
    value.len() == len
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
