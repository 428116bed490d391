//! Extraction markers
//!
//! An extracted field is replaced in the manifest by a marker: the field key
//! with a reserved suffix, whose value is the sidecar's relative path.
//! `"body"` becomes `"body@": "email_1/body.html"`.

use serde_json::Value;

use crate::path::ObjectPath;

/// Reserved suffix appended to a field key to mark it as extracted
pub const MARKER_SUFFIX: char = '@';

/// The marker key for a field name.
pub fn marker_key(field: &str) -> String {
    format!("{}{}", field, MARKER_SUFFIX)
}

/// The field name for a marker key, if it is one.
pub fn field_for_marker(key: &str) -> Option<&str> {
    key.strip_suffix(MARKER_SUFFIX).filter(|f| !f.is_empty())
}

/// One marker found in a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundMarker {
    /// Object path of the field the marker replaces (without the suffix)
    pub field_path: ObjectPath,
    /// Marker value, normally the sidecar's relative path
    pub value: Value,
}

/// Collect every marker field in the tree, in traversal order.
pub fn find_markers(value: &Value) -> Vec<FoundMarker> {
    let mut found = Vec::new();
    collect(value, &ObjectPath::root(), &mut found);
    found
}

fn collect(value: &Value, path: &ObjectPath, out: &mut Vec<FoundMarker>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if let Some(field) = field_for_marker(key) {
                    out.push(FoundMarker {
                        field_path: path.child_key(field),
                        value: child.clone(),
                    });
                } else {
                    collect(child, &path.child_key(key), out);
                }
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect(child, &path.child_index(i), out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_marker_key_round_trip() {
        assert_eq!(marker_key("body"), "body@");
        assert_eq!(field_for_marker("body@"), Some("body"));
        assert_eq!(field_for_marker("body"), None);
        assert_eq!(field_for_marker("@"), None);
    }

    #[test]
    fn test_find_markers_nested() {
        let tree = json!({
            "name": "welcome",
            "steps": [
                {"ref": "email_1", "template": {"body@": "email_1/body.html"}},
                {"ref": "sms_1", "template": {"body": "inline"}}
            ]
        });

        let found = find_markers(&tree);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field_path.to_string(), "steps[0].template.body");
        assert_eq!(found[0].value, json!("email_1/body.html"));
    }

    #[test]
    fn test_find_markers_does_not_descend_into_marker_values() {
        // A marker value is a path string in well-formed input, but even a
        // structured value under a marker key must not be scanned.
        let tree = json!({"blocks@": {"content@": "x"}});
        let found = find_markers(&tree);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field_path.to_string(), "blocks");
    }
}
