//! Key material for signing.
//!
//! [`Secret`] holds the raw bytes used to key HMAC operations. The bytes are
//! wiped from memory when the secret is dropped and never show up in `Debug`
//! output.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::InvalidArgument;

/// Minimum number of random bytes a secret must have.
pub const MIN_SECRET_STRENGTH: usize = 16;

/// Binary keying material of configurable strength.
///
/// Create one with [`Secret::generate`] once, persist [`Secret::as_string`]
/// somewhere safe, and restore it with [`Secret::from_hex_encoded`] on every
/// request.
///
/// # Example
///
/// ```rust
/// use warden::Secret;
///
/// let secret = Secret::generate(32).unwrap();
/// let restored = Secret::from_hex_encoded(&secret.as_string()).unwrap();
///
/// assert_eq!(secret.as_bytes(), restored.as_bytes());
/// assert_eq!(format!("{:?}", secret), "Secret([REDACTED])");
/// ```
#[derive(Clone)]
pub struct Secret(Zeroizing<Vec<u8>>);

impl Secret {
    /// Generates `strength` random bytes from the operating system RNG.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `strength` is below [`MIN_SECRET_STRENGTH`].
    pub fn generate(strength: usize) -> Result<Self, InvalidArgument> {
        Self::check_strength(strength)?;
        let mut bytes = Zeroizing::new(vec![0u8; strength]);
        OsRng.fill_bytes(&mut bytes);
        Ok(Self(bytes))
    }

    /// Restores a secret previously exported with [`Secret::as_string`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the input is not valid hex or decodes to
    /// fewer than [`MIN_SECRET_STRENGTH`] bytes.
    pub fn from_hex_encoded(encoded: &str) -> Result<Self, InvalidArgument> {
        let bytes = Zeroizing::new(
            hex::decode(encoded.trim())
                .map_err(|e| InvalidArgument::new(format!("secret is not valid hex: {e}")))?,
        );
        Self::check_strength(bytes.len())?;
        Ok(Self(bytes))
    }

    /// Hex encoding of the key, suitable for storing in configuration.
    #[must_use]
    pub fn as_string(&self) -> String {
        hex::encode(self.as_bytes())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of key bytes.
    #[must_use]
    pub fn strength(&self) -> usize {
        self.0.len()
    }

    fn check_strength(strength: usize) -> Result<(), InvalidArgument> {
        if strength < MIN_SECRET_STRENGTH {
            return Err(InvalidArgument::new(format!(
                "secret strength must be at least {MIN_SECRET_STRENGTH} bytes, got {strength}"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        crate::crypto::constant_time_eq(self.as_bytes(), other.as_bytes())
    }
}

impl Eq for Secret {}
