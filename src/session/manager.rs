use std::sync::{Arc, Mutex, MutexGuard};

use super::capability::ImmutableSession;
use super::cookie::{CookiePool, SessionCookie};
use super::driver::SessionDriver;
use super::serializer::Serializer;
use super::{ReadWriteSession, SessionConfig, SessionId};
use crate::clock::Clock;
use crate::crypto::constant_time_eq;
use crate::events::EventDispatcher;
use crate::{Lottery, SessionError};

/// Shared handle to the session of the current request.
///
/// Cloning the handle does not clone the session. Use
/// [`SessionHandle::same_as`] to check whether two handles point at the same
/// session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<ReadWriteSession>>,
}

impl SessionHandle {
    pub fn new(session: ReadWriteSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// # Errors
    ///
    /// Returns `SessionError::Driver` if a previous holder panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, ReadWriteSession>, SessionError> {
        self.inner
            .lock()
            .map_err(|_| SessionError::Driver("Session lock poisoned".to_owned()))
    }

    pub fn same_as(&self, other: &SessionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Starts, saves and issues cookies for sessions.
pub trait SessionManager: Send + Sync {
    /// Loads the session named by the request's cookie, or starts a new one.
    fn start(&self, cookies: &CookiePool) -> Result<SessionHandle, SessionError>;

    /// Persists the session, dispatches its events and occasionally runs
    /// garbage collection.
    fn save(&self, session: &SessionHandle) -> Result<(), SessionError>;

    fn to_cookie(&self, session: &dyn ImmutableSession) -> SessionCookie;
}

/// Session manager that builds a fresh [`ReadWriteSession`] on every
/// [`SessionManager::start`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use serde_json::json;
/// use warden::clock::SystemClock;
/// use warden::events::EventRegistry;
/// use warden::session::{
///     CookiePool, FactorySessionManager, ImmutableSession, InMemorySessionDriver,
///     JsonSerializer, MutableSession, SessionConfig, SessionManager,
/// };
///
/// let manager = FactorySessionManager::new(
///     SessionConfig::default(),
///     Arc::new(InMemorySessionDriver::new()),
///     Arc::new(JsonSerializer),
///     Arc::new(SystemClock),
///     Arc::new(EventRegistry::new()),
/// )
/// .unwrap();
///
/// let handle = manager.start(&CookiePool::default()).unwrap();
/// handle.lock().unwrap().put("user", json!("calvin")).unwrap();
/// manager.save(&handle).unwrap();
///
/// let cookie = manager.to_cookie(&*handle.lock().unwrap());
/// let pool = CookiePool::from_header(&format!("{}={}", cookie.name, cookie.value));
///
/// let again = manager.start(&pool).unwrap();
/// assert_eq!(again.lock().unwrap().get("user"), Some(&json!("calvin")));
/// ```
pub struct FactorySessionManager {
    config: SessionConfig,
    gc_lottery: Lottery,
    driver: Arc<dyn SessionDriver>,
    serializer: Arc<dyn Serializer>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventDispatcher>,
}

impl FactorySessionManager {
    /// # Errors
    ///
    /// Returns `SessionError::InvalidArgument` if the config is invalid.
    pub fn new(
        config: SessionConfig,
        driver: Arc<dyn SessionDriver>,
        serializer: Arc<dyn Serializer>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventDispatcher>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let gc_lottery = config.gc_lottery()?;
        Ok(Self {
            config,
            gc_lottery,
            driver,
            serializer,
            clock,
            events,
        })
    }

    /// Replaces the lottery derived from the config.
    #[must_use]
    pub fn with_gc_lottery(mut self, lottery: Lottery) -> Self {
        self.gc_lottery = lottery;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn load(&self, cookies: &CookiePool, now: i64) -> Result<ReadWriteSession, SessionError> {
        let Some(raw) = cookies.get(&self.config.cookie_name) else {
            return Ok(ReadWriteSession::create_empty(now));
        };

        let Some(id) = SessionId::from_cookie_value(raw) else {
            log::debug!(
                target: "warden::session",
                "msg=\"malformed session cookie\" cookie_prefix=\"{}...\"",
                raw.chars().take(8).collect::<String>()
            );
            return Ok(ReadWriteSession::create_empty(now));
        };

        let stored = match self.driver.read(id.selector()) {
            Ok(stored) => stored,
            Err(SessionError::BadSessionId(_)) => {
                log::debug!(
                    target: "warden::session",
                    "msg=\"unknown session selector\" selector={}",
                    id.selector()
                );
                return Ok(ReadWriteSession::create_empty(now));
            }
            Err(e) => return Err(e),
        };

        if !constant_time_eq(stored.hashed_validator.as_bytes(), id.as_hash().as_bytes()) {
            self.driver.destroy(id.selector())?;
            log::warn!(
                target: "warden::session",
                "msg=\"session validator mismatch, session destroyed\" selector={}",
                id.selector()
            );
            return Err(SessionError::PossibleBruteForce {
                selector: id.selector().to_owned(),
            });
        }

        if now.saturating_sub(stored.last_activity) > self.idle_timeout() {
            log::debug!(
                target: "warden::session",
                "msg=\"session idle timeout\" selector={}",
                id.selector()
            );
            return Ok(ReadWriteSession::create_empty(now));
        }

        let attributes = self.serializer.deserialize(&stored.data)?;
        let mut session = ReadWriteSession::from_stored(
            id,
            attributes,
            stored.last_activity,
            stored.user_id,
            now,
        );

        if let Some(absolute) = self.config.absolute_lifetime_in_sec {
            if now.saturating_sub(session.created_at()) > to_seconds(absolute) {
                log::debug!(
                    target: "warden::session",
                    "msg=\"session absolute lifetime exceeded\" selector={}",
                    session.id().selector()
                );
                return Ok(ReadWriteSession::create_empty(now));
            }
        }

        let rotation_interval = to_seconds(self.config.rotation_interval_in_sec);
        if now.saturating_sub(session.last_rotation()) >= rotation_interval {
            session.rotate_transparently();
        }

        Ok(session)
    }

    fn idle_timeout(&self) -> i64 {
        to_seconds(self.config.idle_timeout_in_sec)
    }
}

impl SessionManager for FactorySessionManager {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_start", skip_all, err)
    )]
    fn start(&self, cookies: &CookiePool) -> Result<SessionHandle, SessionError> {
        let now = self.clock.current_timestamp();
        self.load(cookies, now).map(SessionHandle::new)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_save", skip_all, err)
    )]
    fn save(&self, session: &SessionHandle) -> Result<(), SessionError> {
        let now = self.clock.current_timestamp();

        let events = {
            let mut session = session.lock()?;
            let hashed_validator = session.id().as_hash();
            session.save_using(
                self.driver.as_ref(),
                self.serializer.as_ref(),
                &hashed_validator,
                now,
            )?;
            session.release_events()
        };

        for event in events {
            self.events.dispatch(event);
        }

        if self.gc_lottery.wins() {
            let removed = self.driver.gc(now.saturating_sub(self.idle_timeout()))?;
            log::info!(
                target: "warden::session",
                "msg=\"idle sessions collected\" removed={removed}"
            );
        }

        Ok(())
    }

    fn to_cookie(&self, session: &dyn ImmutableSession) -> SessionCookie {
        let lifetime = self.config.cookie_lifetime_in_sec;
        let expiry_timestamp = lifetime
            .map(|seconds| self.clock.current_timestamp() + to_seconds(seconds))
            .unwrap_or(0);

        SessionCookie {
            name: self.config.cookie_name.clone(),
            value: session.id().as_string(),
            path: self.config.cookie_path.clone(),
            domain: self.config.cookie_domain.clone(),
            same_site: self.config.same_site,
            secure_only: self.config.only_secure,
            http_only: self.config.only_http,
            expiry_timestamp,
            lifetime,
        }
    }
}

fn to_seconds(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
