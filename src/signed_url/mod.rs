//! Signed urls: links with an expiry, a usage limit and an HMAC signature.
//!
//! [`UrlSigner`] issues links, [`SignedUrlValidator`] checks them and
//! counts their use, and [`GarbageCollector`] drops the records of expired
//! links. All three share a [`SignedUrlStorage`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use warden::clock::SystemClock;
//! use warden::signed_url::{InMemorySignedUrlStorage, SignedUrlValidator, UrlSigner};
//! use warden::{Secret, Sha256Hmac, SignedUrlError};
//!
//! let storage = Arc::new(InMemorySignedUrlStorage::new());
//! let hmac = Sha256Hmac::new(Secret::generate(32)?);
//! let clock = Arc::new(SystemClock);
//!
//! let signer = UrlSigner::new(storage.clone(), hmac.clone(), clock.clone());
//! let validator = SignedUrlValidator::new(storage, hmac, clock);
//!
//! let link = signer.sign("/downloads/report.pdf", 300, 1, "")?;
//! validator.validate(link.as_str(), "")?;
//!
//! assert!(matches!(
//!     validator.validate(link.as_str(), ""),
//!     Err(SignedUrlError::UsageExceeded { .. })
//! ));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod gc;
mod memory_store;
mod query;
mod signer;
mod storage;
mod validator;

use std::fmt;

use chrono::{DateTime, Utc};

pub use gc::GarbageCollector;
pub use memory_store::InMemorySignedUrlStorage;
pub use signer::UrlSigner;
pub use storage::{SignedUrlStorage, UsageRecord};
pub use validator::SignedUrlValidator;

/// Separates the fields of the signed input.
const SIGNATURE_SEPARATOR: char = '|';
/// Separates the identifier from the hash inside the `signature` parameter.
const ENCODED_SEPARATOR: &str = "%7C";

/// A signed link as returned by [`UrlSigner::sign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    protects: String,
    url: String,
    identifier: String,
    max_usage: u32,
    expires_at: i64,
}

impl SignedUrl {
    pub(crate) fn new(
        protects: String,
        url: String,
        identifier: String,
        max_usage: u32,
        expires_at: i64,
    ) -> Self {
        Self {
            protects,
            url,
            identifier,
            max_usage,
            expires_at,
        }
    }

    /// The target as it was passed to the signer.
    pub fn protects(&self) -> &str {
        &self.protects
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn max_usage(&self) -> u32 {
        self.max_usage
    }

    /// Unix timestamp after which the link is rejected.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn expires_at_datetime(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.expires_at, 0).unwrap_or_default()
    }

    /// The target with `expires` and `signature` appended.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn as_string(&self) -> String {
        self.url.clone()
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl AsRef<str> for SignedUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

/// The string the HMAC is computed over.
fn signature_input(identifier: &str, path_and_query: &str, expires: i64, context: &str) -> String {
    format!(
        "{identifier}{SIGNATURE_SEPARATOR}{path_and_query}{SIGNATURE_SEPARATOR}{expires}{SIGNATURE_SEPARATOR}{context}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed() -> SignedUrl {
        SignedUrl::new(
            "/foo".to_owned(),
            "/foo?expires=10&signature=abc%7Cdef".to_owned(),
            "abc".to_owned(),
            2,
            10,
        )
    }

    #[test]
    fn test_accessors() {
        let url = signed();
        assert_eq!(url.protects(), "/foo");
        assert_eq!(url.identifier(), "abc");
        assert_eq!(url.max_usage(), 2);
        assert_eq!(url.expires_at(), 10);
        assert_eq!(url.expires_at_datetime().timestamp(), 10);
    }

    #[test]
    fn test_display_matches_as_string() {
        let url = signed();
        assert_eq!(url.to_string(), url.as_string());
        assert_eq!(url.as_ref(), "/foo?expires=10&signature=abc%7Cdef");
    }

    #[test]
    fn test_signature_input() {
        assert_eq!(signature_input("id", "/p?a=1", 5, "ctx"), "id|/p?a=1|5|ctx");
    }
}
