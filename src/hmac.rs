//! HMAC-SHA256 over a [`Secret`].

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::crypto::is_lower_hex;
use crate::Secret;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_LEN: usize = 64;

/// Keyed hash used to sign and verify arbitrary strings.
///
/// Signatures are lowercase hex. Verification compares in constant time.
///
/// # Example
///
/// ```rust
/// use warden::{Secret, Sha256Hmac};
///
/// let hmac = Sha256Hmac::new(Secret::generate(32).unwrap());
/// let signature = hmac.sign("/orders/42");
///
/// assert!(hmac.verify("/orders/42", &signature));
/// assert!(!hmac.verify("/orders/43", &signature));
/// ```
#[derive(Debug, Clone)]
pub struct Sha256Hmac {
    secret: Secret,
}

impl Sha256Hmac {
    pub fn new(secret: Secret) -> Self {
        Self { secret }
    }

    pub fn sign(&self, input: &str) -> String {
        hex::encode(self.mac(input).finalize().into_bytes())
    }

    /// Returns `false` for anything but the exact lowercase hex form
    /// produced by [`Sha256Hmac::sign`].
    pub fn verify(&self, input: &str, signature: &str) -> bool {
        if !is_lower_hex(signature, SIGNATURE_LEN) {
            return false;
        }
        let Ok(provided) = hex::decode(signature) else {
            return false;
        };
        self.mac(input).verify_slice(&provided).is_ok()
    }

    fn mac(&self, input: &str) -> HmacSha256 {
        // HMAC accepts keys of any length, and a Secret is never shorter
        // than 16 bytes.
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any size"));
        mac.update(input.as_bytes());
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hmac() -> Sha256Hmac {
        Sha256Hmac::new(Secret::from_hex_encoded(&"ab".repeat(32)).unwrap())
    }

    #[test]
    fn test_sign_and_verify() {
        let hmac = hmac();
        let signature = hmac.sign("abc123");
        assert!(hmac.verify("abc123", &signature));
    }

    #[test]
    fn test_deterministic_signing() {
        let hmac = hmac();
        assert_eq!(hmac.sign("abc123"), hmac.sign("abc123"));
        assert_eq!(hmac.sign("abc123").len(), 64);
    }

    #[test]
    fn test_tampered_input() {
        let hmac = hmac();
        let signature = hmac.sign("abc123");
        assert!(!hmac.verify("abc124", &signature));
    }

    #[test]
    fn test_tampered_signature() {
        let hmac = hmac();
        assert!(!hmac.verify("abc123", &"0".repeat(64)));
    }

    #[test]
    fn test_wrong_secret() {
        let other = Sha256Hmac::new(Secret::from_hex_encoded(&"cd".repeat(32)).unwrap());
        let signature = hmac().sign("abc123");
        assert!(!other.verify("abc123", &signature));
    }

    #[test]
    fn test_malformed_signature() {
        let hmac = hmac();
        assert!(!hmac.verify("abc123", "notahexsignature"));
        assert!(!hmac.verify("abc123", ""));
    }

    #[test]
    fn test_uppercase_signature_rejected() {
        let hmac = hmac();
        let signature = hmac.sign("abc123");
        assert!(!hmac.verify("abc123", &signature.to_ascii_uppercase()));
        assert!(!hmac.verify("abc123", &format!("{signature}00")));
        assert!(!hmac.verify("abc123", &signature[..62]));
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(
            hmac().sign("warden"),
            "d994ebfa4b4f4c671e32d2be05b5604e689659cba53414449ada306a06460b2d"
        );
    }
}
