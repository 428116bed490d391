//! Typed traversal of resource trees
//!
//! All tree surgery goes through these helpers so the builder and joiner
//! never probe value shapes ad hoc.

use serde_json::{Map, Value};

use crate::path::{ObjectPath, PathSegment};

/// Get a reference to the value at `path`, if present.
pub fn get_at_path<'a>(value: &'a Value, path: &ObjectPath) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.segments() {
        current = match segment {
            PathSegment::Key(key) => current.get(key)?,
            PathSegment::Index(idx) => current.get(*idx)?,
        };
    }
    Some(current)
}

/// Get a mutable reference to the object containing the field `path` names.
///
/// Returns `None` if the path is the root, does not resolve, or its parent is
/// not an object. Fields only live in objects; array elements are addressed
/// by recursing, never replaced wholesale.
pub fn parent_object_mut<'a>(
    value: &'a mut Value,
    path: &ObjectPath,
) -> Option<&'a mut Map<String, Value>> {
    let (parent, last) = path.split_last()?;
    if !matches!(last, PathSegment::Key(_)) {
        return None;
    }

    let mut current = value;
    for segment in parent.segments() {
        current = match segment {
            PathSegment::Key(key) => current.get_mut(key)?,
            PathSegment::Index(idx) => current.get_mut(*idx)?,
        };
    }
    current.as_object_mut()
}

/// Remove and return the field at `path`.
pub fn remove_at_path(value: &mut Value, path: &ObjectPath) -> Option<Value> {
    let key = path.last_key()?.to_string();
    parent_object_mut(value, path)?.remove(&key)
}

/// Set the field at `path`, overwriting any existing value.
///
/// Returns `false` if the parent object does not exist.
pub fn set_at_path(value: &mut Value, path: &ObjectPath, new_value: Value) -> bool {
    let Some(key) = path.last_key().map(str::to_string) else {
        return false;
    };
    match parent_object_mut(value, path) {
        Some(map) => {
            map.insert(key, new_value);
            true
        }
        None => false,
    }
}

/// Set a (possibly nested) field, creating intermediate objects as needed.
///
/// Used to mirror readonly field paths under the readonly container.
pub fn set_creating(value: &mut Value, path: &ObjectPath, new_value: Value) {
    let mut current = value;
    let segments = path.segments();
    for (i, segment) in segments.iter().enumerate() {
        let PathSegment::Key(key) = segment else {
            return;
        };
        let Some(map) = current.as_object_mut() else {
            return;
        };
        if i == segments.len() - 1 {
            map.insert(key.clone(), new_value);
            return;
        }
        current = map
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}
