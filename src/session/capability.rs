//! Read and write capabilities over a session.
//!
//! Code that handles a safe request (GET, HEAD) should receive something that
//! only implements [`ImmutableSession`]; code handling an unsafe request gets
//! a [`MutableSession`]. [`ReadOnlySession`] borrows a live session and
//! exposes only the read half, [`SessionSnapshot`] is an owned copy.

use serde_json::Value;

use super::attributes::{get_path, has_path, set_path, Attributes};
use super::read_write::{CREATED_AT, INTERNAL_NAMESPACE, LAST_ROTATED, OLD_INPUT};
use super::{ReadWriteSession, SessionId};
use crate::SessionError;

pub trait ImmutableSession {
    fn id(&self) -> &SessionId;

    /// True if the session was created during this request.
    fn is_new(&self) -> bool;

    /// All stored data including the internal namespace.
    fn attributes(&self) -> &Attributes;

    fn last_activity(&self) -> i64;

    fn user_id(&self) -> Option<&str>;

    /// User data, without the internal bookkeeping namespace.
    fn all(&self) -> Attributes {
        let mut all = self.attributes().clone();
        all.remove(INTERNAL_NAMESPACE);
        all
    }

    fn get(&self, key: &str) -> Option<&Value> {
        get_path(self.attributes(), key)
    }

    /// True if the key exists and is not null.
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_null())
    }

    /// True if the key exists, even if it holds null.
    fn exists(&self, key: &str) -> bool {
        has_path(self.attributes(), key)
    }

    fn missing(&self, key: &str) -> bool {
        !self.exists(key)
    }

    /// The subset of data stored under `keys`. Missing keys are skipped.
    fn only(&self, keys: &[&str]) -> Attributes {
        let mut only = Attributes::new();
        for key in keys {
            if let Some(value) = self.get(key) {
                set_path(&mut only, key, value.clone());
            }
        }
        only
    }

    /// Loose truthiness: `true`, non-zero numbers and the strings
    /// `"1"`, `"true"`, `"on"`, `"yes"`.
    fn boolean(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(value)) => *value,
            Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(value)) => matches!(
                value.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            ),
            _ => false,
        }
    }

    fn created_at(&self) -> i64 {
        get_path(self.attributes(), CREATED_AT)
            .and_then(Value::as_i64)
            .unwrap_or_default()
    }

    fn last_rotation(&self) -> i64 {
        get_path(self.attributes(), LAST_ROTATED)
            .and_then(Value::as_i64)
            .unwrap_or_default()
    }

    /// With `None`, true if any input was flashed; otherwise true if the
    /// given input key was flashed.
    fn has_old_input(&self, key: Option<&str>) -> bool {
        match key {
            None => get_path(self.attributes(), OLD_INPUT)
                .and_then(Value::as_object)
                .is_some_and(|input| !input.is_empty()),
            Some(key) => has_path(self.attributes(), &format!("{OLD_INPUT}.{key}")),
        }
    }

    fn old_input(&self, key: &str) -> Option<&Value> {
        get_path(self.attributes(), &format!("{OLD_INPUT}.{key}"))
    }
}

/// Mutating capability. Every method fails with [`SessionError::Locked`] once
/// the session has been saved.
pub trait MutableSession: ImmutableSession {
    fn put(&mut self, key: &str, value: Value) -> Result<(), SessionError>;

    fn put_many(&mut self, pairs: Vec<(&str, Value)>) -> Result<(), SessionError> {
        for (key, value) in pairs {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// Merges the given pairs into the session, overwriting existing keys.
    fn replace(&mut self, attributes: Attributes) -> Result<(), SessionError>;

    fn forget(&mut self, keys: &[&str]) -> Result<(), SessionError>;

    /// Removes one key and returns its value.
    fn remove(&mut self, key: &str) -> Result<Option<Value>, SessionError>;

    /// Removes all user data. Internal timestamps are kept.
    fn flush(&mut self) -> Result<(), SessionError>;

    /// Adds `by` to an integer value (missing counts as 0) and returns the
    /// new value.
    fn increment(&mut self, key: &str, by: i64) -> Result<i64, SessionError>;

    fn decrement(&mut self, key: &str, by: i64) -> Result<i64, SessionError>;

    /// Appends to the array stored under `key`, creating it if missing.
    fn push(&mut self, key: &str, value: Value) -> Result<(), SessionError>;

    /// Stores a value that survives the next save and is removed by the one
    /// after it.
    fn flash(&mut self, key: &str, value: Value) -> Result<(), SessionError>;

    /// Stores a value that is removed by the next save.
    fn flash_now(&mut self, key: &str, value: Value) -> Result<(), SessionError>;

    /// Flashes request input so it can be re-rendered after a redirect.
    fn flash_input(&mut self, input: Attributes) -> Result<(), SessionError>;

    /// Keeps all currently aging flash data for one more cycle.
    fn reflash(&mut self) -> Result<(), SessionError>;

    /// Keeps the given aging flash keys for one more cycle.
    fn keep(&mut self, keys: &[&str]) -> Result<(), SessionError>;

    fn set_user_id(&mut self, user_id: Option<String>) -> Result<(), SessionError>;

    /// Assigns a new id while keeping all data.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyRotated`] if called twice before saving.
    fn rotate(&mut self) -> Result<(), SessionError>;

    /// Assigns a new id and discards all user data.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyInvalidated`] if called twice before saving.
    fn invalidate(&mut self) -> Result<(), SessionError>;
}

/// Borrowed read-only view of a live session.
#[derive(Debug, Clone, Copy)]
pub struct ReadOnlySession<'a> {
    session: &'a ReadWriteSession,
}

impl<'a> ReadOnlySession<'a> {
    pub fn new(session: &'a ReadWriteSession) -> Self {
        Self { session }
    }
}

impl ImmutableSession for ReadOnlySession<'_> {
    fn id(&self) -> &SessionId {
        self.session.id()
    }

    fn is_new(&self) -> bool {
        self.session.is_new()
    }

    fn attributes(&self) -> &Attributes {
        self.session.attributes()
    }

    fn last_activity(&self) -> i64 {
        self.session.last_activity()
    }

    fn user_id(&self) -> Option<&str> {
        self.session.user_id()
    }
}

/// Owned read-only copy of a session at one point in time.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    id: SessionId,
    is_new: bool,
    attributes: Attributes,
    last_activity: i64,
    user_id: Option<String>,
}

impl SessionSnapshot {
    pub fn of(session: &impl ImmutableSession) -> Self {
        Self {
            id: session.id().clone(),
            is_new: session.is_new(),
            attributes: session.attributes().clone(),
            last_activity: session.last_activity(),
            user_id: session.user_id().map(str::to_owned),
        }
    }
}

impl ImmutableSession for SessionSnapshot {
    fn id(&self) -> &SessionId {
        &self.id
    }

    fn is_new(&self) -> bool {
        self.is_new
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn last_activity(&self) -> i64 {
        self.last_activity
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn session() -> ReadWriteSession {
        let mut session = ReadWriteSession::create_empty(1_000);
        session.put("name", json!("calvin")).unwrap();
        session.put("nothing", Value::Null).unwrap();
        session.put("flags.on", json!("yes")).unwrap();
        session.put("flags.off", json!(0)).unwrap();
        session
    }

    #[test]
    fn test_read_only_view_reads_live_state() {
        let session = session();
        let view = ReadOnlySession::new(&session);

        assert_eq!(view.get("name"), Some(&json!("calvin")));
        assert!(view.id().same_as(session.id()));
        assert!(view.is_new());
        assert_eq!(view.created_at(), 1_000);
    }

    #[test]
    fn test_has_exists_missing() {
        let session = session();
        assert!(session.has("name"));
        assert!(!session.has("nothing"));
        assert!(session.exists("nothing"));
        assert!(session.missing("unknown"));
    }

    #[test]
    fn test_boolean() {
        let session = session();
        assert!(session.boolean("flags.on"));
        assert!(!session.boolean("flags.off"));
        assert!(!session.boolean("name"));
        assert!(!session.boolean("unknown"));
    }

    #[test]
    fn test_only() {
        let session = session();
        let only = session.only(&["name", "flags.on", "unknown"]);
        assert_eq!(
            Value::Object(only),
            json!({"name": "calvin", "flags": {"on": "yes"}})
        );
    }

    #[test]
    fn test_all_excludes_internal_namespace() {
        let session = session();
        assert!(session.attributes().contains_key(INTERNAL_NAMESPACE));
        assert!(!session.all().contains_key(INTERNAL_NAMESPACE));
        assert!(session.all().contains_key("name"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut session = session();
        let snapshot = SessionSnapshot::of(&session);

        session.put("name", json!("marlon")).unwrap();

        assert_eq!(snapshot.get("name"), Some(&json!("calvin")));
        assert!(snapshot.id().same_as(session.id()));
    }
}
