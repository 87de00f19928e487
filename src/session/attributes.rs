//! Dot-path access into nested session attributes.
//!
//! Session data is a JSON object. A path like `user.settings.theme` walks
//! nested objects one segment at a time. A top level key that literally
//! contains a dot is matched before the path is split.

use serde_json::{Map, Value};

/// Nested key-value data held by a session.
pub type Attributes = Map<String, Value>;

pub fn get_path<'a>(attributes: &'a Attributes, path: &str) -> Option<&'a Value> {
    if let Some(value) = attributes.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let mut current = attributes.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

pub fn has_path(attributes: &Attributes, path: &str) -> bool {
    get_path(attributes, path).is_some()
}

/// Sets `value` at `path`, creating intermediate objects as needed.
///
/// An intermediate segment holding a non-object value is replaced by an
/// object.
pub fn set_path(attributes: &mut Attributes, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = attributes;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_owned(), value);
            return;
        }
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
}

/// Removes the value at `path` and returns it.
///
/// Parent objects are left in place even if they become empty.
pub fn remove_path(attributes: &mut Attributes, path: &str) -> Option<Value> {
    if let Some(value) = attributes.remove(path) {
        return Some(value);
    }
    let (parent, last) = path.rsplit_once('.')?;
    get_path_mut(attributes, parent)?
        .as_object_mut()?
        .remove(last)
}

fn get_path_mut<'a>(attributes: &'a mut Attributes, path: &str) -> Option<&'a mut Value> {
    let mut segments = path.split('.');
    let mut current = attributes.get_mut(segments.next()?)?;
    for segment in segments {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Reads a list of strings stored at `path`, ignoring non-string entries.
pub(crate) fn string_list(attributes: &Attributes, path: &str) -> Vec<String> {
    get_path(attributes, path)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn set_string_list(attributes: &mut Attributes, path: &str, items: Vec<String>) {
    set_path(
        attributes,
        path,
        Value::Array(items.into_iter().map(Value::String).collect()),
    );
}
