//! File-based session storage.
//!
//! Stores sessions as JSON files in a directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::driver::{SerializedSession, SessionDriver, UserSessionsDriver};
use super::id::DEFAULT_ID_HALF_STRENGTH;
use crate::crypto::is_lower_hex;
use crate::SessionError;

/// File-based session storage.
///
/// Each session is stored as a JSON file named `{selector}.json`
/// in the configured directory.
///
/// # Example
///
/// ```rust,no_run
/// use warden::session::FileSessionDriver;
///
/// let driver = FileSessionDriver::new("/var/lib/myapp/sessions")?;
/// # Ok::<(), warden::SessionError>(())
/// ```
pub struct FileSessionDriver {
    directory: PathBuf,
}

impl FileSessionDriver {
    /// Creates a new file session driver.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let dir = directory.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            SessionError::Driver(format!("Failed to create session directory: {e}"))
        })?;
        Ok(Self { directory: dir })
    }

    /// Returns the path for a session file, or `None` for a selector that
    /// could escape the directory.
    fn session_path(&self, selector: &str) -> Option<PathBuf> {
        if !is_lower_hex(selector, DEFAULT_ID_HALF_STRENGTH * 2) {
            return None;
        }
        Some(self.directory.join(format!("{selector}.json")))
    }

    fn read_session(&self, path: &Path) -> Result<Option<SerializedSession>, SessionError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Driver(format!("Failed to read session file: {e}")))?;

        let session = serde_json::from_str(&content)
            .map_err(|e| SessionError::Driver(format!("Failed to parse session file: {e}")))?;

        Ok(Some(session))
    }

    fn write_session(&self, path: &Path, session: &SerializedSession) -> Result<(), SessionError> {
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| SessionError::Driver(format!("Failed to serialize session: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| SessionError::Driver(format!("Failed to write session file: {e}")))?;

        Ok(())
    }

    /// Every readable session file with its selector. Unparseable files are
    /// skipped.
    fn all_sessions(&self) -> Result<Vec<(String, PathBuf, SerializedSession)>, SessionError> {
        let entries = std::fs::read_dir(&self.directory).map_err(|e| {
            SessionError::Driver(format!("Failed to read session directory: {e}"))
        })?;

        let mut sessions = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Some(selector) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let selector = selector.to_owned();
            if let Ok(Some(session)) = self.read_session(&path) {
                sessions.push((selector, path, session));
            }
        }
        Ok(sessions)
    }

    fn remove_where(
        &self,
        predicate: impl Fn(&str, &SerializedSession) -> bool,
    ) -> Result<u64, SessionError> {
        let mut removed = 0u64;
        for (selector, path, session) in self.all_sessions()? {
            if predicate(&selector, &session) && std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl SessionDriver for FileSessionDriver {
    fn read(&self, selector: &str) -> Result<SerializedSession, SessionError> {
        let bad_id = || SessionError::BadSessionId(selector.to_owned());
        let path = self.session_path(selector).ok_or_else(bad_id)?;
        self.read_session(&path)?.ok_or_else(bad_id)
    }

    fn write(&self, selector: &str, session: SerializedSession) -> Result<(), SessionError> {
        let path = self.session_path(selector).ok_or_else(|| {
            SessionError::Driver(format!("Refusing to write malformed selector \"{selector}\""))
        })?;
        self.write_session(&path, &session)
    }

    fn destroy(&self, selector: &str) -> Result<(), SessionError> {
        let Some(path) = self.session_path(selector) else {
            return Ok(());
        };
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                SessionError::Driver(format!("Failed to delete session file: {e}"))
            })?;
        }
        Ok(())
    }

    fn touch(&self, selector: &str, timestamp: i64) -> Result<(), SessionError> {
        let mut session = self.read(selector)?;
        session.last_activity = timestamp;
        self.write(selector, session)
    }

    fn gc(&self, idle_cutoff: i64) -> Result<u64, SessionError> {
        self.remove_where(|_, session| session.last_activity < idle_cutoff)
    }
}

impl UserSessionsDriver for FileSessionDriver {
    fn get_all_for_user_id(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, SerializedSession>, SessionError> {
        Ok(self
            .all_sessions()?
            .into_iter()
            .filter(|(_, _, session)| session.user_id.as_deref() == Some(user_id))
            .map(|(selector, _, session)| (selector, session))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::random_hex;

    fn selector() -> String {
        random_hex(DEFAULT_ID_HALF_STRENGTH)
    }

    fn session_for(user_id: Option<&str>, last_activity: i64) -> SerializedSession {
        SerializedSession::new("{\"a\":1}", "hash", last_activity, user_id.map(str::to_owned))
    }

    #[test]
    fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let driver = FileSessionDriver::new(dir.path()).unwrap();
        let selector = selector();

        driver.write(&selector, session_for(Some("1"), 10)).unwrap();

        let found = driver.read(&selector).unwrap();
        assert_eq!(found, session_for(Some("1"), 10));
        assert!(dir.path().join(format!("{selector}.json")).exists());
    }

    #[test]
    fn test_read_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let driver = FileSessionDriver::new(dir.path()).unwrap();

        assert!(matches!(
            driver.read(&selector()),
            Err(SessionError::BadSessionId(_))
        ));
    }

    #[test]
    fn test_path_traversal_prevention() {
        let dir = tempfile::tempdir().unwrap();
        let driver = FileSessionDriver::new(dir.path()).unwrap();

        // These should be rejected
        assert!(matches!(
            driver.read("../etc/passwd"),
            Err(SessionError::BadSessionId(_))
        ));
        assert!(driver
            .write("session/../../../etc/passwd", session_for(None, 1))
            .is_err());
        driver.destroy("../etc/passwd").unwrap();
    }

    #[test]
    fn test_destroy() {
        let dir = tempfile::tempdir().unwrap();
        let driver = FileSessionDriver::new(dir.path()).unwrap();
        let selector = selector();

        driver.write(&selector, session_for(None, 10)).unwrap();
        driver.destroy(&selector).unwrap();

        assert!(driver.read(&selector).is_err());
        driver.destroy(&selector).unwrap();
    }

    #[test]
    fn test_touch_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let driver = FileSessionDriver::new(dir.path()).unwrap();
        let selector = selector();

        driver.write(&selector, session_for(None, 10)).unwrap();
        driver.touch(&selector, 99).unwrap();

        let touched = driver.read(&selector).unwrap();
        assert_eq!(touched.last_activity, 99);
        assert_eq!(touched.data, "{\"a\":1}");
    }

    #[test]
    fn test_gc_and_user_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let driver = FileSessionDriver::new(dir.path()).unwrap();
        let (a, b, c) = (selector(), selector(), selector());

        driver.write(&a, session_for(Some("1"), 10)).unwrap();
        driver.write(&b, session_for(Some("1"), 50)).unwrap();
        driver.write(&c, session_for(Some("2"), 50)).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(driver.get_all_for_user_id("1").unwrap().len(), 2);
        assert_eq!(driver.gc(20).unwrap(), 1);
        assert!(driver.read(&a).is_err());

        assert_eq!(driver.destroy_all_for_user_id_except(&b, "1").unwrap(), 0);
        assert_eq!(driver.destroy_all_for_user_id("2").unwrap(), 1);
        assert_eq!(driver.destroy_all().unwrap(), 1);
        assert!(dir.path().join("notes.txt").exists());
    }
}
