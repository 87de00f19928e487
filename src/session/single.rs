use std::sync::Mutex;

use super::capability::ImmutableSession;
use super::cookie::{CookiePool, SessionCookie};
use super::manager::{SessionHandle, SessionManager};
use crate::SessionError;

/// Wraps a manager so that every [`SessionManager::start`] within one request
/// returns the same session.
///
/// Create one per request. The first successful `start` is memoized; later
/// calls ignore their cookie pool and hand out the same [`SessionHandle`].
pub struct SingleSessionSessionManager<M> {
    inner: M,
    started: Mutex<Option<SessionHandle>>,
}

impl<M: SessionManager> SingleSessionSessionManager<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            started: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: SessionManager> SessionManager for SingleSessionSessionManager<M> {
    fn start(&self, cookies: &CookiePool) -> Result<SessionHandle, SessionError> {
        let mut started = self
            .started
            .lock()
            .map_err(|_| SessionError::Driver("Session lock poisoned".to_owned()))?;

        if let Some(handle) = started.as_ref() {
            return Ok(handle.clone());
        }

        let handle = self.inner.start(cookies)?;
        *started = Some(handle.clone());
        Ok(handle)
    }

    fn save(&self, session: &SessionHandle) -> Result<(), SessionError> {
        self.inner.save(session)
    }

    fn to_cookie(&self, session: &dyn ImmutableSession) -> SessionCookie {
        self.inner.to_cookie(session)
    }
}
