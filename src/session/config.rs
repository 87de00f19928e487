//! Session cookie and lifetime configuration.
//!
//! # Example
//!
//! ```rust
//! use warden::session::{SameSite, SessionConfig};
//!
//! // Use defaults
//! let config = SessionConfig::default();
//! assert!(config.validate().is_ok());
//!
//! // Or customize
//! let config = SessionConfig {
//!     cookie_name: "app_session".to_owned(),
//!     idle_timeout_in_sec: 15 * 60,
//!     absolute_lifetime_in_sec: Some(8 * 60 * 60),
//!     same_site: SameSite::Lax,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::{InvalidArgument, Lottery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    None,
    Lax,
    #[default]
    Strict,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub same_site: SameSite,
    pub only_secure: bool,
    pub only_http: bool,

    /// How long the cookie lives in the browser.
    ///
    /// `None` issues a session cookie that is dropped when the browser closes.
    pub cookie_lifetime_in_sec: Option<u64>,

    /// Maximum gap between two requests before the session is stale.
    ///
    /// Default: 30 minutes
    pub idle_timeout_in_sec: u64,

    /// Maximum age of a session regardless of activity.
    ///
    /// Default: none
    pub absolute_lifetime_in_sec: Option<u64>,

    /// The id is rotated transparently once this much time passed since the
    /// last rotation.
    ///
    /// Default: 15 minutes
    pub rotation_interval_in_sec: u64,

    /// Chance, in percent, that saving a session also purges idle sessions.
    ///
    /// Default: 2
    pub garbage_collection_percentage: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "warden_session".to_owned(),
            cookie_path: "/".to_owned(),
            cookie_domain: None,
            same_site: SameSite::Strict,
            only_secure: true,
            only_http: true,
            cookie_lifetime_in_sec: None,
            idle_timeout_in_sec: 30 * 60,
            absolute_lifetime_in_sec: None,
            rotation_interval_in_sec: 15 * 60,
            garbage_collection_percentage: 2,
        }
    }
}

impl SessionConfig {
    /// Creates a configuration suitable for local development.
    ///
    /// Cookies are allowed over plain http and sessions idle longer.
    pub fn development() -> Self {
        Self {
            same_site: SameSite::Lax,
            only_secure: false,
            idle_timeout_in_sec: 2 * 60 * 60,
            rotation_interval_in_sec: 60 * 60,
            ..Self::default()
        }
    }

    /// Creates a configuration with stricter security settings.
    ///
    /// Short idle timeout, frequent rotation and an absolute lifetime.
    pub fn strict() -> Self {
        Self {
            idle_timeout_in_sec: 10 * 60,
            absolute_lifetime_in_sec: Some(8 * 60 * 60),
            rotation_interval_in_sec: 5 * 60,
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` describing the first invalid field.
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        if self.cookie_name.is_empty() {
            return Err(InvalidArgument::new("cookie_name must not be empty"));
        }
        if !self.cookie_path.starts_with('/') {
            return Err(InvalidArgument::new("cookie_path must start with \"/\""));
        }
        if self.same_site == SameSite::None && !self.only_secure {
            return Err(InvalidArgument::new(
                "same_site=None requires only_secure to be enabled",
            ));
        }
        if self.idle_timeout_in_sec == 0 {
            return Err(InvalidArgument::new(
                "idle_timeout_in_sec must be a positive integer",
            ));
        }
        if self.absolute_lifetime_in_sec == Some(0) {
            return Err(InvalidArgument::new(
                "absolute_lifetime_in_sec must be a positive integer",
            ));
        }
        if self.rotation_interval_in_sec == 0 {
            return Err(InvalidArgument::new(
                "rotation_interval_in_sec must be a positive integer",
            ));
        }
        self.gc_lottery()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` if the percentage is above 100.
    pub fn gc_lottery(&self) -> Result<Lottery, InvalidArgument> {
        Lottery::new(self.garbage_collection_percentage)
    }
}
