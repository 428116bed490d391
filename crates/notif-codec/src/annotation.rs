//! Annotation side channel
//!
//! The remote service describes, per resource, which fields are server-managed
//! and which long-form fields may be extracted into sidecar files. That
//! metadata travels beside the tree as a typed [`Annotation`] rather than
//! commingled with the data, so traversal code never probes for special keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which some payloads inline annotation data; always stripped
pub const ANNOTATION_KEY: &str = "__annotation";

/// Manifest key holding all server-managed, non-editable fields
pub const READONLY_KEY: &str = "__readonly";

/// Optional manifest field referencing a JSON Schema for editor tooling
pub const SCHEMA_KEY: &str = "$schema";

/// How one extractable field is handled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Extract without being asked (a field the user already extracted
    /// locally is extracted regardless)
    pub default_extract: bool,
    /// Sidecar file extension, without the dot (`html`, `txt`, `md`, `json`)
    pub file_ext: String,
}

impl ExtractionSettings {
    pub fn new(default_extract: bool, file_ext: impl Into<String>) -> Self {
        Self {
            default_extract,
            file_ext: file_ext.into(),
        }
    }
}

/// Extraction metadata for one resource tree
///
/// Path keys are index-stripped object paths (`steps.fields.body` matches
/// `steps[2].fields.body`), so one entry covers every element of an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Field paths always relocated under the readonly container
    #[serde(default)]
    pub readonly_fields: Vec<String>,

    /// Extractable fields reachable by the generic tree walk
    #[serde(default)]
    pub extractable: BTreeMap<String, ExtractionSettings>,

    /// Containers the generic walk must not enter (their contents are
    /// extracted by a dedicated recursion, e.g. workflow `steps`)
    #[serde(default)]
    pub skip_containers: Vec<String>,

    /// Extractable fields of a workflow step, relative to the step's
    /// `template` object; applied per step by the bundle builder
    #[serde(default)]
    pub step_fields: BTreeMap<String, ExtractionSettings>,
}

impl Annotation {
    /// Settings for a generic field, by index-stripped path.
    pub fn extractable_at(&self, stripped_path: &str) -> Option<&ExtractionSettings> {
        self.extractable.get(stripped_path)
    }

    /// True if the generic walk must not recurse into this container.
    pub fn skips(&self, stripped_path: &str) -> bool {
        self.skip_containers.iter().any(|p| p == stripped_path)
    }
}

/// Remove every inline annotation key from a tree.
///
/// Annotation metadata must never appear in written output.
pub fn strip_annotations(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove(ANNOTATION_KEY);
            for child in map.values_mut() {
                strip_annotations(child);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                strip_annotations(child);
            }
        }
        _ => {}
    }
}
