//! Session storage traits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::SessionError;

/// What a driver stores for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedSession {
    /// Attributes as produced by a [`Serializer`](super::Serializer).
    pub data: String,
    /// SHA-256 of the id's validator half, compared on every load.
    pub hashed_validator: String,
    pub last_activity: i64,
    pub user_id: Option<String>,
}

impl SerializedSession {
    pub fn new(
        data: impl Into<String>,
        hashed_validator: impl Into<String>,
        last_activity: i64,
        user_id: Option<String>,
    ) -> Self {
        Self {
            data: data.into(),
            hashed_validator: hashed_validator.into(),
            last_activity,
            user_id,
        }
    }
}

/// Storage backend for sessions, keyed by selector.
///
/// Implementations provide different storage backends:
/// - [`InMemorySessionDriver`](super::InMemorySessionDriver): In-memory storage for testing
/// - [`FileSessionDriver`](super::FileSessionDriver): File-based storage
///
/// Drivers are shared by every request of a process and must be safe to call
/// concurrently. Two requests writing the same selector resolve as last write
/// wins.
pub trait SessionDriver: Send + Sync {
    /// # Errors
    ///
    /// [`SessionError::BadSessionId`] if nothing is stored for `selector`.
    fn read(&self, selector: &str) -> Result<SerializedSession, SessionError>;

    /// Creates or overwrites the session stored for `selector`.
    fn write(&self, selector: &str, session: SerializedSession) -> Result<(), SessionError>;

    /// Destroying an unknown selector is not an error.
    fn destroy(&self, selector: &str) -> Result<(), SessionError>;

    /// Updates only the last activity timestamp.
    ///
    /// # Errors
    ///
    /// [`SessionError::BadSessionId`] if nothing is stored for `selector`.
    fn touch(&self, selector: &str, timestamp: i64) -> Result<(), SessionError>;

    /// Removes every session whose last activity is older than `idle_cutoff`.
    ///
    /// Returns the number of sessions removed.
    fn gc(&self, idle_cutoff: i64) -> Result<u64, SessionError>;
}

/// Drivers that can find sessions by the user they belong to.
pub trait UserSessionsDriver: SessionDriver {
    /// All sessions of a user, keyed by selector.
    fn get_all_for_user_id(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, SerializedSession>, SessionError>;

    fn destroy_all_for_user_id(&self, user_id: &str) -> Result<u64, SessionError>;

    /// Logs a user out everywhere except the session identified by `selector`.
    fn destroy_all_for_user_id_except(
        &self,
        selector: &str,
        user_id: &str,
    ) -> Result<u64, SessionError>;

    fn destroy_all(&self) -> Result<u64, SessionError>;
}
