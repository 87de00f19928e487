//! Error types for signed URLs and sessions.
//!
//! Errors fall into four groups:
//!
//! - configuration/input errors ([`InvalidArgument`]), raised at construction
//! - token errors ([`SignedUrlError::InvalidSignature`], [`SignedUrlError::Expired`],
//!   [`SignedUrlError::UsageExceeded`]), distinct so callers can map each one
//!   to its own HTTP response
//! - session integrity errors ([`SessionError::BadSessionId`],
//!   [`SessionError::PossibleBruteForce`])
//! - state discipline errors ([`SessionError::Locked`],
//!   [`SessionError::AlreadyRotated`], [`SessionError::AlreadyInvalidated`]),
//!   which indicate a bug in the calling code
//!
//! Nothing in this crate retries. Every failure is returned to the caller.

use thiserror::Error;

/// A constructor or operation received a value outside its allowed range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument: {0}")]
pub struct InvalidArgument(pub String);

impl InvalidArgument {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignedUrlError {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// The target already uses a query parameter the signer appends itself.
    #[error("target already contains the reserved query parameter \"{0}\"")]
    ReservedParameter(String),

    #[error("invalid signature for \"{0}\"")]
    InvalidSignature(String),

    #[error("signed url \"{identifier}\" expired at {expired_at}")]
    Expired { identifier: String, expired_at: i64 },

    #[error("signed url \"{identifier}\" exceeded its maximum usage")]
    UsageExceeded { identifier: String },

    #[error("no signed url stored for identifier \"{0}\"")]
    UnknownIdentifier(String),

    #[error("signed url storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// The driver holds no session for this selector.
    #[error("no session stored for selector \"{0}\"")]
    BadSessionId(String),

    /// The selector exists but the validator did not match. The stored
    /// session has already been destroyed when this is returned.
    #[error("session validator mismatch for selector \"{selector}\", possible brute force attempt")]
    PossibleBruteForce { selector: String },

    #[error("the session is locked because it was already saved")]
    Locked,

    #[error("the session was already rotated in this request cycle")]
    AlreadyRotated,

    #[error("the session was already invalidated in this request cycle")]
    AlreadyInvalidated,

    #[error("session driver error: {0}")]
    Driver(String),

    #[error("session serialization error: {0}")]
    Serialization(String),
}
