//! In-memory session storage.
//!
//! Suitable for development, testing, and single-instance deployments.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::driver::{SerializedSession, SessionDriver, UserSessionsDriver};
use crate::SessionError;

/// In-memory session storage.
///
/// Stores sessions in a `HashMap` protected by a `RwLock`, keyed by
/// selector. Clones share the same map.
///
/// # Note
///
/// Sessions are lost when the process restarts.
/// For persistent storage, use [`FileSessionDriver`](super::FileSessionDriver).
#[derive(Clone, Default)]
pub struct InMemorySessionDriver {
    sessions: Arc<RwLock<HashMap<String, SerializedSession>>>,
}

impl InMemorySessionDriver {
    /// Creates a new in-memory session driver.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of sessions currently stored.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns true if there are no sessions stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_guard(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<String, SerializedSession>>, SessionError> {
        self.sessions
            .read()
            .map_err(|_| SessionError::Driver("Lock poisoned".to_owned()))
    }

    fn write_guard(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, SerializedSession>>, SessionError> {
        self.sessions
            .write()
            .map_err(|_| SessionError::Driver("Lock poisoned".to_owned()))
    }

    fn remove_where(
        &self,
        predicate: impl Fn(&str, &SerializedSession) -> bool,
    ) -> Result<u64, SessionError> {
        let mut sessions = self.write_guard()?;
        let before_count = sessions.len();
        sessions.retain(|selector, session| !predicate(selector, session));
        let removed = before_count.saturating_sub(sessions.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

impl SessionDriver for InMemorySessionDriver {
    fn read(&self, selector: &str) -> Result<SerializedSession, SessionError> {
        self.read_guard()?
            .get(selector)
            .cloned()
            .ok_or_else(|| SessionError::BadSessionId(selector.to_owned()))
    }

    fn write(&self, selector: &str, session: SerializedSession) -> Result<(), SessionError> {
        self.write_guard()?.insert(selector.to_owned(), session);
        Ok(())
    }

    fn destroy(&self, selector: &str) -> Result<(), SessionError> {
        self.write_guard()?.remove(selector);
        Ok(())
    }

    fn touch(&self, selector: &str, timestamp: i64) -> Result<(), SessionError> {
        let mut sessions = self.write_guard()?;
        let session = sessions
            .get_mut(selector)
            .ok_or_else(|| SessionError::BadSessionId(selector.to_owned()))?;
        session.last_activity = timestamp;
        Ok(())
    }

    fn gc(&self, idle_cutoff: i64) -> Result<u64, SessionError> {
        self.remove_where(|_, session| session.last_activity < idle_cutoff)
    }
}

impl UserSessionsDriver for InMemorySessionDriver {
    fn get_all_for_user_id(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, SerializedSession>, SessionError> {
        Ok(self
            .read_guard()?
            .iter()
            .filter(|(_, session)| session.user_id.as_deref() == Some(user_id))
            .map(|(selector, session)| (selector.clone(), session.clone()))
            .collect())
    }

    fn destroy_all_for_user_id(&self, user_id: &str) -> Result<u64, SessionError> {
        self.remove_where(|_, session| session.user_id.as_deref() == Some(user_id))
    }

    fn destroy_all_for_user_id_except(
        &self,
        selector: &str,
        user_id: &str,
    ) -> Result<u64, SessionError> {
        self.remove_where(|candidate, session| {
            candidate != selector && session.user_id.as_deref() == Some(user_id)
        })
    }

    fn destroy_all(&self) -> Result<u64, SessionError> {
        self.remove_where(|_, _| true)
    }
}
