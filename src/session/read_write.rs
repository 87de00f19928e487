use chrono::{DateTime, Utc};
use serde_json::Value;

use super::attributes::{
    get_path, remove_path, set_path, set_string_list, string_list, Attributes,
};
use super::capability::{ImmutableSession, MutableSession, SessionSnapshot};
use super::driver::{SerializedSession, SessionDriver};
use super::serializer::Serializer;
use super::SessionId;
use crate::events::SessionEvent;
use crate::{InvalidArgument, SessionError};

/// Top level key reserved for bookkeeping. Never part of [`ImmutableSession::all`].
pub const INTERNAL_NAMESPACE: &str = "_sniccowp";

pub(crate) const CREATED_AT: &str = "_sniccowp.timestamps.created_at";
pub(crate) const LAST_ROTATED: &str = "_sniccowp.timestamps.last_rotated";
pub(crate) const FLASH_NEW: &str = "_flash.new";
pub(crate) const FLASH_OLD: &str = "_flash.old";
pub(crate) const OLD_INPUT: &str = "_old_input";

/// The session aggregate for one request.
///
/// A session starts out either fresh ([`ReadWriteSession::create_empty`]) or
/// loaded from a driver ([`ReadWriteSession::from_stored`]). It can be
/// mutated until [`ReadWriteSession::save_using`] persists it; after that it
/// is locked and every mutator returns [`SessionError::Locked`].
///
/// # Flash data
///
/// Flashed keys live in two generations. [`MutableSession::flash`] records
/// the key as *new*. Each dirty save removes the *old* keys and promotes the
/// *new* ones, so a flashed value is readable on exactly one following
/// request.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use warden::session::{ImmutableSession, MutableSession, ReadWriteSession};
///
/// let mut session = ReadWriteSession::create_empty(1_700_000_000);
/// session.put("cart.items", json!(3)).unwrap();
/// session.flash("status", json!("saved")).unwrap();
///
/// assert_eq!(session.get("cart.items"), Some(&json!(3)));
/// assert!(session.is_dirty());
/// ```
#[derive(Debug)]
pub struct ReadWriteSession {
    id: SessionId,
    attributes: Attributes,
    original_attributes: Attributes,
    user_id: Option<String>,
    original_user_id: Option<String>,
    last_activity: i64,
    request_time: i64,
    is_new: bool,
    locked: bool,
    rotated: bool,
    invalidated: bool,
    invalidated_id: Option<SessionId>,
    events: Vec<SessionEvent>,
}

impl ReadWriteSession {
    /// A brand new session with a random id, created at `now`.
    pub fn create_empty(now: i64) -> Self {
        let mut attributes = Attributes::new();
        set_path(&mut attributes, CREATED_AT, Value::from(now));
        set_path(&mut attributes, LAST_ROTATED, Value::from(now));

        Self {
            id: SessionId::new(),
            original_attributes: attributes.clone(),
            attributes,
            user_id: None,
            original_user_id: None,
            last_activity: now,
            request_time: now,
            is_new: true,
            locked: false,
            rotated: false,
            invalidated: false,
            invalidated_id: None,
            events: Vec::new(),
        }
    }

    /// A session loaded from storage. `now` is the current request time.
    pub fn from_stored(
        id: SessionId,
        attributes: Attributes,
        last_activity: i64,
        user_id: Option<String>,
        now: i64,
    ) -> Self {
        Self {
            id,
            original_attributes: attributes.clone(),
            attributes,
            original_user_id: user_id.clone(),
            user_id,
            last_activity,
            request_time: now,
            is_new: false,
            locked: false,
            rotated: false,
            invalidated: false,
            invalidated_id: None,
            events: Vec::new(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The id this session had before it was first rotated in this cycle.
    pub fn invalidated_id(&self) -> Option<&SessionId> {
        self.invalidated_id.as_ref()
    }

    /// True if saving must rewrite the stored data instead of only touching
    /// it.
    pub fn is_dirty(&self) -> bool {
        self.is_new
            || self.invalidated_id.is_some()
            || self.attributes != self.original_attributes
            || self.user_id != self.original_user_id
            || !string_list(&self.attributes, FLASH_OLD).is_empty()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(self)
    }

    /// Drains the recorded events. Each event is returned exactly once.
    pub fn release_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Persists the session and locks it.
    ///
    /// A clean session is only touched. A dirty one first destroys the row of
    /// the id it was rotated away from, then ages flash data and writes the
    /// serialized attributes under the current selector.
    ///
    /// The session is locked even if the driver fails.
    ///
    /// # Errors
    ///
    /// [`SessionError::Locked`] if the session was already saved, or any
    /// driver/serializer error.
    pub fn save_using(
        &mut self,
        driver: &dyn SessionDriver,
        serializer: &dyn Serializer,
        hashed_validator: &str,
        now: i64,
    ) -> Result<(), SessionError> {
        self.check_unlocked()?;
        self.locked = true;

        if !self.is_dirty() {
            driver.touch(self.id.selector(), now)?;
            self.last_activity = now;
            return Ok(());
        }

        if let Some(stale) = &self.invalidated_id {
            driver.destroy(stale.selector())?;
            set_path(&mut self.attributes, LAST_ROTATED, Value::from(now));
        }

        self.age_flash_data();

        let data = serializer.serialize(&self.attributes)?;
        driver.write(
            self.id.selector(),
            SerializedSession::new(data, hashed_validator, now, self.user_id.clone()),
        )?;
        self.last_activity = now;

        log::debug!(
            target: "warden::session",
            "msg=\"session written\" selector={} new={} rotated={}",
            self.id.selector(),
            self.is_new,
            self.invalidated_id.is_some()
        );

        Ok(())
    }

    /// Assigns a new id without counting as an explicit rotation, used when
    /// the rotation interval elapsed.
    pub(crate) fn rotate_transparently(&mut self) {
        self.regenerate_id();
        self.record_rotation();
    }

    fn regenerate_id(&mut self) {
        let stale = std::mem::replace(&mut self.id, SessionId::new());
        if self.invalidated_id.is_none() {
            self.invalidated_id = Some(stale);
        }
    }

    fn record_rotation(&mut self) {
        let at = DateTime::<Utc>::from_timestamp(self.request_time, 0).unwrap_or_default();
        self.events.push(SessionEvent::SessionRotated {
            snapshot: self.snapshot(),
            at,
        });
    }

    fn age_flash_data(&mut self) {
        let old = string_list(&self.attributes, FLASH_OLD);
        let new = string_list(&self.attributes, FLASH_NEW);
        if old.is_empty() && new.is_empty() {
            return;
        }
        for key in old {
            remove_path(&mut self.attributes, &key);
        }
        set_string_list(&mut self.attributes, FLASH_OLD, new);
        set_string_list(&mut self.attributes, FLASH_NEW, Vec::new());
    }

    fn check_unlocked(&self) -> Result<(), SessionError> {
        if self.locked {
            return Err(SessionError::Locked);
        }
        Ok(())
    }

    fn check_user_key(key: &str) -> Result<(), SessionError> {
        let reserved = key
            .strip_prefix(INTERNAL_NAMESPACE)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'));
        if reserved {
            return Err(InvalidArgument::new(format!(
                "session key \"{key}\" is inside the reserved \"{INTERNAL_NAMESPACE}\" namespace"
            ))
            .into());
        }
        Ok(())
    }

    fn add_flash_key(&mut self, generation: &str, key: &str) {
        let mut keys = string_list(&self.attributes, generation);
        if !keys.iter().any(|existing| existing == key) {
            keys.push(key.to_owned());
        }
        set_string_list(&mut self.attributes, generation, keys);
    }

    fn remove_flash_key(&mut self, generation: &str, key: &str) {
        let mut keys = string_list(&self.attributes, generation);
        keys.retain(|existing| existing != key);
        set_string_list(&mut self.attributes, generation, keys);
    }

    fn add_to_number(&mut self, key: &str, by: i64) -> Result<i64, SessionError> {
        self.check_unlocked()?;
        Self::check_user_key(key)?;
        let current = match get_path(&self.attributes, key) {
            None | Some(Value::Null) => 0,
            Some(value) => value.as_i64().ok_or_else(|| {
                InvalidArgument::new(format!("session value \"{key}\" is not an integer"))
            })?,
        };
        let updated = current.checked_add(by).ok_or_else(|| {
            InvalidArgument::new(format!("session value \"{key}\" would overflow"))
        })?;
        set_path(&mut self.attributes, key, Value::from(updated));
        Ok(updated)
    }
}

impl ImmutableSession for ReadWriteSession {
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

impl MutableSession for ReadWriteSession {
    fn put(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
        self.check_unlocked()?;
        Self::check_user_key(key)?;
        set_path(&mut self.attributes, key, value);
        Ok(())
    }

    fn replace(&mut self, attributes: Attributes) -> Result<(), SessionError> {
        self.check_unlocked()?;
        for key in attributes.keys() {
            Self::check_user_key(key)?;
        }
        for (key, value) in attributes {
            set_path(&mut self.attributes, &key, value);
        }
        Ok(())
    }

    fn forget(&mut self, keys: &[&str]) -> Result<(), SessionError> {
        self.check_unlocked()?;
        for key in keys {
            Self::check_user_key(key)?;
        }
        for key in keys {
            remove_path(&mut self.attributes, key);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<Option<Value>, SessionError> {
        self.check_unlocked()?;
        Self::check_user_key(key)?;
        Ok(remove_path(&mut self.attributes, key))
    }

    fn flush(&mut self) -> Result<(), SessionError> {
        self.check_unlocked()?;
        self.attributes.retain(|key, _| key == INTERNAL_NAMESPACE);
        Ok(())
    }

    fn increment(&mut self, key: &str, by: i64) -> Result<i64, SessionError> {
        self.add_to_number(key, by)
    }

    fn decrement(&mut self, key: &str, by: i64) -> Result<i64, SessionError> {
        let by = by.checked_neg().ok_or_else(|| {
            InvalidArgument::new(format!("cannot decrement \"{key}\" by {by}"))
        })?;
        self.add_to_number(key, by)
    }

    fn push(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
        self.check_unlocked()?;
        Self::check_user_key(key)?;
        let mut items = match get_path(&self.attributes, key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                return Err(InvalidArgument::new(format!(
                    "session value \"{key}\" is not an array"
                ))
                .into())
            }
        };
        items.push(value);
        set_path(&mut self.attributes, key, Value::Array(items));
        Ok(())
    }

    fn flash(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
        self.put(key, value)?;
        self.add_flash_key(FLASH_NEW, key);
        self.remove_flash_key(FLASH_OLD, key);
        Ok(())
    }

    fn flash_now(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
        self.put(key, value)?;
        self.add_flash_key(FLASH_OLD, key);
        Ok(())
    }

    fn flash_input(&mut self, input: Attributes) -> Result<(), SessionError> {
        self.flash(OLD_INPUT, Value::Object(input))
    }

    fn reflash(&mut self) -> Result<(), SessionError> {
        self.check_unlocked()?;
        for key in string_list(&self.attributes, FLASH_OLD) {
            self.add_flash_key(FLASH_NEW, &key);
        }
        set_string_list(&mut self.attributes, FLASH_OLD, Vec::new());
        Ok(())
    }

    fn keep(&mut self, keys: &[&str]) -> Result<(), SessionError> {
        self.check_unlocked()?;
        for key in keys {
            Self::check_user_key(key)?;
        }
        for key in keys {
            self.add_flash_key(FLASH_NEW, key);
            self.remove_flash_key(FLASH_OLD, key);
        }
        Ok(())
    }

    fn set_user_id(&mut self, user_id: Option<String>) -> Result<(), SessionError> {
        self.check_unlocked()?;
        self.user_id = user_id;
        Ok(())
    }

    fn rotate(&mut self) -> Result<(), SessionError> {
        self.check_unlocked()?;
        if self.rotated {
            return Err(SessionError::AlreadyRotated);
        }
        self.regenerate_id();
        self.rotated = true;
        self.record_rotation();
        Ok(())
    }

    fn invalidate(&mut self) -> Result<(), SessionError> {
        self.check_unlocked()?;
        if self.invalidated {
            return Err(SessionError::AlreadyInvalidated);
        }
        self.regenerate_id();
        self.attributes.clear();
        set_path(&mut self.attributes, CREATED_AT, Value::from(self.request_time));
        set_path(&mut self.attributes, LAST_ROTATED, Value::from(self.request_time));
        self.user_id = None;
        self.invalidated = true;
        self.rotated = true;
        self.record_rotation();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::session::{InMemorySessionDriver, JsonSerializer};

    const NOW: i64 = 1_700_000_000;

    fn save(session: &mut ReadWriteSession, driver: &InMemorySessionDriver, now: i64) {
        let hash = session.id().as_hash();
        session
            .save_using(driver, &JsonSerializer, &hash, now)
            .unwrap();
    }

    fn reload(
        session: &ReadWriteSession,
        driver: &InMemorySessionDriver,
        now: i64,
    ) -> ReadWriteSession {
        let stored = driver.read(session.id().selector()).unwrap();
        let attributes = JsonSerializer.deserialize(&stored.data).unwrap();
        ReadWriteSession::from_stored(
            session.id().clone(),
            attributes,
            stored.last_activity,
            stored.user_id,
            now,
        )
    }

    #[test]
    fn test_new_session_timestamps() {
        let session = ReadWriteSession::create_empty(NOW);
        assert!(session.is_new());
        assert!(session.is_dirty());
        assert_eq!(session.created_at(), NOW);
        assert_eq!(session.last_rotation(), NOW);
        assert_eq!(session.last_activity(), NOW);
        assert!(session.all().is_empty());
    }

    #[test]
    fn test_put_get_forget_remove() {
        let mut session = ReadWriteSession::create_empty(NOW);
        session.put("a.b", json!(1)).unwrap();
        session.put("c", json!("d")).unwrap();

        assert_eq!(session.get("a.b"), Some(&json!(1)));
        assert_eq!(session.remove("c").unwrap(), Some(json!("d")));
        assert!(session.missing("c"));

        session.forget(&["a.b"]).unwrap();
        assert!(session.missing("a.b"));
    }

    #[test]
    fn test_replace_merges() {
        let mut session = ReadWriteSession::create_empty(NOW);
        session.put("keep", json!(1)).unwrap();
        session.put("overwrite", json!(1)).unwrap();

        let mut update = Attributes::new();
        update.insert("overwrite".to_owned(), json!(2));
        update.insert("added".to_owned(), json!(3));
        session.replace(update).unwrap();

        assert_eq!(
            Value::Object(session.all()),
            json!({"keep": 1, "overwrite": 2, "added": 3})
        );
    }

    #[test]
    fn test_put_many() {
        let mut session = ReadWriteSession::create_empty(NOW);
        session
            .put_many(vec![("a", json!(1)), ("b.c", json!(true))])
            .unwrap();

        assert_eq!(Value::Object(session.all()), json!({"a": 1, "b": {"c": true}}));
    }

    #[test]
    fn test_flush_keeps_internal_namespace() {
        let mut session = ReadWriteSession::create_empty(NOW);
        session.put("foo", json!("bar")).unwrap();
        session.flush().unwrap();

        assert!(session.all().is_empty());
        assert_eq!(session.created_at(), NOW);
    }

    #[test]
    fn test_internal_namespace_is_not_writable() {
        let mut session = ReadWriteSession::create_empty(NOW);
        session.put("x", json!(1)).unwrap();
        fn reserved<T>(result: Result<T, SessionError>) -> bool {
            matches!(result, Err(SessionError::InvalidArgument(_)))
        }

        assert!(reserved(session.forget(&["x", INTERNAL_NAMESPACE])));
        assert!(reserved(session.put(CREATED_AT, json!(i64::MIN))));
        assert!(reserved(session.put("_sniccowp.anything", json!(1))));
        assert!(reserved(session.remove(INTERNAL_NAMESPACE)));
        assert!(reserved(session.increment(LAST_ROTATED, 1)));
        assert!(reserved(session.push(INTERNAL_NAMESPACE, json!(1))));
        assert!(reserved(session.keep(&[CREATED_AT])));
        assert!(reserved(
            session.put_many(vec![("y", json!(2)), (INTERNAL_NAMESPACE, json!({}))])
        ));

        let mut update = Attributes::new();
        update.insert("z".to_owned(), json!(3));
        update.insert(INTERNAL_NAMESPACE.to_owned(), json!({}));
        assert!(reserved(session.replace(update)));

        assert_eq!(session.created_at(), NOW);
        assert_eq!(session.last_rotation(), NOW);
        // rejected batches leave earlier keys untouched
        assert_eq!(session.get("x"), Some(&json!(1)));
        assert!(session.missing("z"));
    }

    #[test]
    fn test_namespace_prefix_needs_separator() {
        let mut session = ReadWriteSession::create_empty(NOW);
        session.put("_sniccowpish", json!(1)).unwrap();
        assert_eq!(session.get("_sniccowpish"), Some(&json!(1)));
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut session = ReadWriteSession::create_empty(NOW);
        assert_eq!(session.increment("count", 1).unwrap(), 1);
        assert_eq!(session.increment("count", 4).unwrap(), 5);
        assert_eq!(session.decrement("count", 2).unwrap(), 3);

        session.put("name", json!("calvin")).unwrap();
        assert!(matches!(
            session.increment("name", 1),
            Err(SessionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_push() {
        let mut session = ReadWriteSession::create_empty(NOW);
        session.push("list", json!(1)).unwrap();
        session.push("list", json!(2)).unwrap();
        assert_eq!(session.get("list"), Some(&json!([1, 2])));

        session.put("scalar", json!(1)).unwrap();
        assert!(session.push("scalar", json!(2)).is_err());
    }

    #[test]
    fn test_mutators_fail_after_save() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        save(&mut session, &driver, NOW);

        assert!(session.is_locked());
        assert_eq!(session.put("a", json!(1)), Err(SessionError::Locked));
        assert_eq!(session.flush(), Err(SessionError::Locked));
        assert_eq!(session.forget(&["a"]), Err(SessionError::Locked));
        assert_eq!(session.increment("a", 1), Err(SessionError::Locked));
        assert_eq!(session.push("a", json!(1)), Err(SessionError::Locked));
        assert_eq!(session.flash("a", json!(1)), Err(SessionError::Locked));
        assert_eq!(session.rotate(), Err(SessionError::Locked));
        assert_eq!(session.invalidate(), Err(SessionError::Locked));

        let hash = session.id().as_hash();
        assert_eq!(
            session.save_using(&driver, &JsonSerializer, &hash, NOW),
            Err(SessionError::Locked)
        );
    }

    #[test]
    fn test_rotate_records_first_stale_id_once() {
        let mut session = ReadWriteSession::create_empty(NOW);
        let original = session.id().clone();

        session.rotate().unwrap();
        assert!(!session.id().same_as(&original));
        assert!(session.invalidated_id().unwrap().same_as(&original));

        assert_eq!(session.rotate(), Err(SessionError::AlreadyRotated));

        session.invalidate().unwrap();
        assert!(session.invalidated_id().unwrap().same_as(&original));
        assert_eq!(session.invalidate(), Err(SessionError::AlreadyInvalidated));
    }

    #[test]
    fn test_rotate_records_event_with_new_id() {
        let mut session = ReadWriteSession::create_empty(NOW);
        session.put("foo", json!("bar")).unwrap();
        session.rotate().unwrap();

        let events = session.release_events();
        assert_eq!(events.len(), 1);
        let SessionEvent::SessionRotated { snapshot, at } = &events[0];
        assert!(snapshot.id().same_as(session.id()));
        assert_eq!(snapshot.get("foo"), Some(&json!("bar")));
        assert_eq!(at.timestamp(), NOW);

        assert!(session.release_events().is_empty());
    }

    #[test]
    fn test_invalidate_discards_data_and_resets_timestamps() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        session.put("foo", json!("bar")).unwrap();
        session.set_user_id(Some("1".to_owned())).unwrap();
        save(&mut session, &driver, NOW);

        let mut loaded = reload(&session, &driver, NOW + 100);
        loaded.invalidate().unwrap();

        assert!(loaded.all().is_empty());
        assert_eq!(loaded.user_id(), None);
        assert_eq!(loaded.created_at(), NOW + 100);
        assert_eq!(loaded.last_rotation(), NOW + 100);
        assert_eq!(loaded.release_events().len(), 1);
    }

    #[test]
    fn test_clean_session_is_only_touched() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        session.put("foo", json!("bar")).unwrap();
        save(&mut session, &driver, NOW);
        let written = driver.read(session.id().selector()).unwrap();

        let mut loaded = reload(&session, &driver, NOW + 10);
        assert!(!loaded.is_dirty());
        save(&mut loaded, &driver, NOW + 10);

        let touched = driver.read(session.id().selector()).unwrap();
        assert_eq!(touched.data, written.data);
        assert_eq!(touched.last_activity, NOW + 10);
        assert_eq!(loaded.last_activity(), NOW + 10);
    }

    #[test]
    fn test_flash_survives_exactly_one_cycle() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        session.flash("status", json!("saved")).unwrap();
        save(&mut session, &driver, NOW);

        let mut second = reload(&session, &driver, NOW + 1);
        assert_eq!(second.get("status"), Some(&json!("saved")));
        assert!(second.is_dirty(), "old flash data forces a write");
        save(&mut second, &driver, NOW + 1);

        let third = reload(&session, &driver, NOW + 2);
        assert!(third.missing("status"));
        assert!(!third.is_dirty());
    }

    #[test]
    fn test_flash_now_expires_on_current_save() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        session.flash_now("error", json!("oops")).unwrap();
        assert_eq!(session.get("error"), Some(&json!("oops")));
        save(&mut session, &driver, NOW);

        let next = reload(&session, &driver, NOW + 1);
        assert!(next.missing("error"));
    }

    #[test]
    fn test_reflash_keeps_all_old_flash_data() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        session.flash("a", json!(1)).unwrap();
        session.flash("b", json!(2)).unwrap();
        save(&mut session, &driver, NOW);

        let mut second = reload(&session, &driver, NOW + 1);
        second.reflash().unwrap();
        save(&mut second, &driver, NOW + 1);

        let mut third = reload(&session, &driver, NOW + 2);
        assert_eq!(third.get("a"), Some(&json!(1)));
        assert_eq!(third.get("b"), Some(&json!(2)));
        save(&mut third, &driver, NOW + 2);

        let fourth = reload(&session, &driver, NOW + 3);
        assert!(fourth.missing("a"));
        assert!(fourth.missing("b"));
    }

    #[test]
    fn test_keep_only_named_keys() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        session.flash("a", json!(1)).unwrap();
        session.flash("b", json!(2)).unwrap();
        save(&mut session, &driver, NOW);

        let mut second = reload(&session, &driver, NOW + 1);
        second.keep(&["a"]).unwrap();
        save(&mut second, &driver, NOW + 1);

        let third = reload(&session, &driver, NOW + 2);
        assert_eq!(third.get("a"), Some(&json!(1)));
        assert!(third.missing("b"));
    }

    #[test]
    fn test_flash_input() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        assert!(!session.has_old_input(None));

        let mut input = Attributes::new();
        input.insert("email".to_owned(), json!("calvin@example.com"));
        session.flash_input(input).unwrap();
        save(&mut session, &driver, NOW);

        let next = reload(&session, &driver, NOW + 1);
        assert!(next.has_old_input(None));
        assert!(next.has_old_input(Some("email")));
        assert!(!next.has_old_input(Some("password")));
        assert_eq!(next.old_input("email"), Some(&json!("calvin@example.com")));
    }

    #[test]
    fn test_user_id_change_marks_dirty() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        save(&mut session, &driver, NOW);

        let mut loaded = reload(&session, &driver, NOW + 1);
        assert!(!loaded.is_dirty());
        loaded.set_user_id(Some("42".to_owned())).unwrap();
        assert!(loaded.is_dirty());
        save(&mut loaded, &driver, NOW + 1);

        let stored = driver.read(session.id().selector()).unwrap();
        assert_eq!(stored.user_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_save_after_rotation_destroys_stale_row() {
        let driver = InMemorySessionDriver::new();
        let mut session = ReadWriteSession::create_empty(NOW);
        session.put("foo", json!("bar")).unwrap();
        save(&mut session, &driver, NOW);

        let mut loaded = reload(&session, &driver, NOW + 5);
        loaded.rotate().unwrap();
        save(&mut loaded, &driver, NOW + 5);

        assert!(matches!(
            driver.read(session.id().selector()),
            Err(SessionError::BadSessionId(_))
        ));
        let stored = driver.read(loaded.id().selector()).unwrap();
        assert_eq!(stored.hashed_validator, loaded.id().as_hash());
        assert_eq!(loaded.last_rotation(), NOW + 5);
        assert_eq!(loaded.all(), session.all());
    }
}
