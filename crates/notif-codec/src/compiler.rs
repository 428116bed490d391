//! Extraction compiler
//!
//! Walks a resource tree and lists every field the annotation marks
//! extractable, deepest path first. Extraction must proceed leaf to root:
//! extracting a parent before a marked descendant would swallow the
//! descendant while it is still inline.

use serde_json::Value;

use crate::annotation::{ANNOTATION_KEY, Annotation, ExtractionSettings, READONLY_KEY};
use crate::path::ObjectPath;

/// One field to extract, in compiled order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledField {
    pub path: ObjectPath,
    pub settings: ExtractionSettings,
}

/// Compile the ordered extraction list for a tree.
///
/// Recurses into objects and arrays; skips the annotation's
/// `skip_containers` (their contents belong to a dedicated recursion, e.g.
/// workflow steps) and the bookkeeping keys. An extractable field is still
/// recursed into, since structured content can hold deeper extractable
/// fields of its own.
pub fn compile(value: &Value, annotation: &Annotation) -> Vec<CompiledField> {
    let mut out = Vec::new();
    visit(value, &ObjectPath::root(), annotation, &mut out);

    // Deepest first; path order breaks ties so compilation is deterministic.
    out.sort_by(|a, b| {
        b.path
            .depth()
            .cmp(&a.path.depth())
            .then_with(|| a.path.to_string().cmp(&b.path.to_string()))
    });
    out
}

fn visit(value: &Value, path: &ObjectPath, annotation: &Annotation, out: &mut Vec<CompiledField>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == ANNOTATION_KEY || key == READONLY_KEY {
                    continue;
                }
                let child_path = path.child_key(key);
                let stripped = child_path.stripped();
                if annotation.skips(&stripped) {
                    continue;
                }
                if let Some(settings) = annotation.extractable_at(&stripped) {
                    out.push(CompiledField {
                        path: child_path.clone(),
                        settings: settings.clone(),
                    });
                }
                visit(child, &child_path, annotation, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                visit(child, &path.child_index(i), annotation, out);
            }
        }
        _ => {}
    }
}
