//! Signed urls and server-side sessions.
//!
//! - [`signed_url`] issues links with an expiry, a usage limit and an HMAC
//!   signature, and validates them against a pluggable storage
//! - [`session`] loads, rotates, expires and persists sessions identified
//!   by a selector/validator cookie
//!
//! Both are synchronous and storage agnostic. Time comes from a
//! [`clock::Clock`], so tests can travel through it with a
//! [`clock::TestClock`].

pub mod clock;
pub mod crypto;
pub mod events;
pub mod session;
pub mod signed_url;

mod error;
mod hmac;
mod lottery;
mod secret;

pub use error::{InvalidArgument, SessionError, SignedUrlError};
pub use self::hmac::Sha256Hmac;
pub use lottery::Lottery;
pub use secret::{Secret, MIN_SECRET_STRENGTH};
