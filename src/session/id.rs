use std::fmt;

use crate::crypto::{constant_time_eq, hash_token, is_lower_hex, random_hex};

/// Random bytes in each half of a session id.
pub const DEFAULT_ID_HALF_STRENGTH: usize = 16;

const SEPARATOR: char = '|';

/// Opaque session identifier made of a selector and a validator.
///
/// The selector is the storage key and is safe to log. The validator is the
/// secret half: only its hash ([`SessionId::as_hash`]) is ever persisted, so a
/// leaked session store cannot be replayed as cookies.
///
/// The cookie form is `selector|validator`, both halves lowercase hex.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId {
    selector: String,
    validator: String,
}

impl SessionId {
    /// Generates a new id with [`DEFAULT_ID_HALF_STRENGTH`] bytes per half.
    pub fn new() -> Self {
        Self {
            selector: random_hex(DEFAULT_ID_HALF_STRENGTH),
            validator: random_hex(DEFAULT_ID_HALF_STRENGTH),
        }
    }

    /// Parses a cookie value.
    ///
    /// Returns `None` unless both halves are lowercase hex of the expected
    /// length, so arbitrary client input never reaches a driver.
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let (selector, validator) = value.split_once(SEPARATOR)?;
        let expected = DEFAULT_ID_HALF_STRENGTH * 2;
        if !is_lower_hex(selector, expected) || !is_lower_hex(validator, expected) {
            return None;
        }
        Some(Self {
            selector: selector.to_owned(),
            validator: validator.to_owned(),
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn validator(&self) -> &str {
        &self.validator
    }

    /// SHA-256 of the validator, the value drivers store for comparison.
    pub fn as_hash(&self) -> String {
        hash_token(&self.validator)
    }

    /// The cookie value.
    pub fn as_string(&self) -> String {
        format!("{}{SEPARATOR}{}", self.selector, self.validator)
    }

    /// Compares both halves in constant time.
    pub fn same_as(&self, other: &SessionId) -> bool {
        constant_time_eq(self.as_string().as_bytes(), other.as_string().as_bytes())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionId")
            .field("selector", &self.selector)
            .field("validator", &"[REDACTED]")
            .finish()
    }
}
