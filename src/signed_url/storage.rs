use std::collections::HashMap;

use crate::SignedUrlError;

/// Expiry and usage counter of one signed url.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRecord {
    pub expires: i64,
    pub max_usage: u32,
    pub used: u32,
}

impl UsageRecord {
    pub fn new(expires: i64, max_usage: u32) -> Self {
        Self {
            expires,
            max_usage,
            used: 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max_usage
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires < now
    }
}

/// Persistence for signed url usage counters, keyed by identifier.
///
/// Implement this trait for shared storage (redis, a database table) when
/// several processes validate the same links. [`InMemorySignedUrlStorage`]
/// is the reference implementation.
///
/// [`InMemorySignedUrlStorage`]: super::InMemorySignedUrlStorage
pub trait SignedUrlStorage: Send + Sync {
    fn store(&self, identifier: &str, expires: i64, max_usage: u32) -> Result<(), SignedUrlError>;

    /// Increments the usage counter and returns the new count.
    ///
    /// # Errors
    ///
    /// [`SignedUrlError::UnknownIdentifier`] if nothing is stored under
    /// `identifier`.
    fn increment_usage(&self, identifier: &str) -> Result<u32, SignedUrlError>;

    fn get(&self, identifier: &str) -> Result<Option<UsageRecord>, SignedUrlError>;

    fn all(&self) -> Result<HashMap<String, UsageRecord>, SignedUrlError>;

    /// Removes every record that expired before `timestamp` and returns how
    /// many were removed.
    fn delete_expired_before(&self, timestamp: i64) -> Result<u64, SignedUrlError>;
}
