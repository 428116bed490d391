//! Bundle builder
//!
//! Turns a fetched resource tree into a [`DirectoryBundle`]: extracted fields
//! move into sidecar files, markers take their place in the manifest, and
//! readonly fields relocate under the readonly container. The remote tree is
//! never mutated; everything happens on a clone.
//!
//! Extraction runs leaf to root (the compiler orders it that way), so by the
//! time a structured parent is extracted, markers for its already extracted
//! descendants are embedded in it. Those inner references are then rebased to
//! be relative to the parent's own sidecar file.

use serde_json::{Map, Value};
use tracing::debug;

use notif_fs::relative_to;

use crate::annotation::{Annotation, ExtractionSettings, READONLY_KEY, SCHEMA_KEY, strip_annotations};
use crate::bundle::DirectoryBundle;
use crate::compiler::compile;
use crate::index::LocalStepIndex;
use crate::marker::{field_for_marker, marker_key};
use crate::path::{ObjectPath, PathSegment};
use crate::resource::{ResourceKind, ResourceNode};
use crate::step::MAX_STEP_DEPTH;
use crate::value::{get_at_path, parent_object_mut, remove_at_path, set_creating};
use crate::{Error, Result};

/// Build a directory bundle from a fetched resource.
///
/// `local` is the previously pulled manifest tree (markers intact, as read
/// from disk), used to preserve the user's extraction layout: a field the
/// local manifest extracted is extracted again to the same path, whether or
/// not it would extract by default.
pub fn build(
    remote: &ResourceNode,
    local: Option<&Value>,
    schema_ref: Option<&str>,
) -> Result<DirectoryBundle> {
    let mut tree = remote.value.clone();
    strip_annotations(&mut tree);

    let mut bundle = DirectoryBundle::new(remote.kind, Value::Null);

    // Workflow steps recurse here, not in the generic walk: each branch's
    // nested steps need independent extraction under their own ref-named
    // directory.
    if remote.kind == ResourceKind::Workflow {
        let local_index = local
            .map(LocalStepIndex::from_manifest)
            .unwrap_or_default();
        if let Some(steps) = tree.get_mut("steps") {
            extract_step_list(
                steps,
                &remote.annotation,
                &local_index,
                &mut bundle,
                &ObjectPath::root().child_key("steps"),
                0,
            )?;
        }
    }

    for field in compile(&tree, &remote.annotation) {
        let local_path = local_marker_at(local, &field.path);
        extract_field(
            &mut tree,
            &field.path,
            &field.settings,
            local_path,
            "",
            &field.path.clone(),
            &mut bundle,
        )?;
    }

    relocate_readonly(&mut tree, &remote.annotation);

    if let Some(schema) = schema_ref
        && let Some(map) = tree.as_object_mut()
    {
        map.insert(SCHEMA_KEY.to_string(), Value::String(schema.to_string()));
    }

    bundle.set_manifest(tree);
    Ok(bundle)
}

/// Extract one field out of `tree` into the bundle.
///
/// `local_path` forces extraction to that exact path. Otherwise the field is
/// extracted only if its settings say so, to a path synthesized from the
/// object path under `dir_prefix`.
fn extract_field(
    tree: &mut Value,
    path: &ObjectPath,
    settings: &ExtractionSettings,
    local_path: Option<String>,
    dir_prefix: &str,
    full_path: &ObjectPath,
    bundle: &mut DirectoryBundle,
) -> Result<()> {
    if get_at_path(tree, path).is_none() {
        return Ok(());
    }

    let rel_path = match local_path {
        Some(p) => p,
        None if settings.default_extract => {
            format!("{}{}", dir_prefix, synthesize_rel_path(path, &settings.file_ext))
        }
        None => return Ok(()),
    };

    let Some(moved) = remove_at_path(tree, path) else {
        return Ok(());
    };

    let content = match moved {
        Value::String(text) => text,
        mut structured => {
            // Structured content: markers for already extracted descendants
            // reference the manifest directory; rewrite them relative to
            // this sidecar's own directory.
            rebase_inner_markers(&mut structured, parent_dir(&rel_path));
            let mut rendered = serde_json::to_string_pretty(&structured)?;
            rendered.push('\n');
            rendered
        }
    };

    let field_name = full_path.to_string();
    bundle.insert_file(&field_name, rel_path.clone(), content)?;

    let key = path.last_key().ok_or_else(|| Error::InvalidPath {
        field: field_name.clone(),
        path: rel_path.clone(),
    })?;
    let marker = marker_key(key);
    if let Some(parent) = parent_object_mut(tree, path) {
        parent.insert(marker, Value::String(rel_path.clone()));
    }

    debug!(field = %field_name, path = %rel_path, "extracted field");
    Ok(())
}

/// Synthesize a sidecar path from an object path: keys become directories,
/// an array index becomes a 1-based numeric prefix on the following key, and
/// the final component carries the file extension.
/// `pages[0].blocks[2].content` with `md` becomes `pages/1.blocks/3.content.md`.
fn synthesize_rel_path(path: &ObjectPath, ext: &str) -> String {
    let mut components: Vec<String> = Vec::new();
    let mut prefix = String::new();

    for segment in path.segments() {
        match segment {
            PathSegment::Index(i) => {
                if prefix.is_empty() {
                    prefix = (i + 1).to_string();
                } else {
                    prefix = format!("{}.{}", prefix, i + 1);
                }
            }
            PathSegment::Key(key) => {
                if prefix.is_empty() {
                    components.push(key.clone());
                } else {
                    components.push(format!("{}.{}", std::mem::take(&mut prefix), key));
                }
            }
        }
    }

    let mut rel = components.join("/");
    rel.push('.');
    rel.push_str(ext);
    rel
}

fn parent_dir(rel_path: &str) -> &str {
    rel_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Rewrite every marker in a subtree from a manifest-relative path to one
/// relative to `base_dir`.
fn rebase_inner_markers(value: &mut Value, base_dir: &str) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if field_for_marker(key).is_some() {
                    if let Value::String(path) = child {
                        *path = relative_to(path, base_dir);
                    }
                } else {
                    rebase_inner_markers(child, base_dir);
                }
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                rebase_inner_markers(child, base_dir);
            }
        }
        _ => {}
    }
}

/// The sidecar path the local manifest recorded for a generic field, if any.
fn local_marker_at(local: Option<&Value>, path: &ObjectPath) -> Option<String> {
    let local = local?;
    let (parent, last) = path.split_last()?;
    let PathSegment::Key(field) = last else {
        return None;
    };
    get_at_path(local, &parent)?
        .get(marker_key(field))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Extract every step in a `steps` array, recursing through branches.
fn extract_step_list(
    steps: &mut Value,
    annotation: &Annotation,
    local_index: &LocalStepIndex,
    bundle: &mut DirectoryBundle,
    base_path: &ObjectPath,
    depth: usize,
) -> Result<()> {
    if depth > MAX_STEP_DEPTH {
        return Err(Error::DepthExceeded {
            max: MAX_STEP_DEPTH,
        });
    }

    let Some(items) = steps.as_array_mut() else {
        return Err(Error::InvalidSteps {
            message: format!("{} is not an array", base_path),
        });
    };

    for (i, step) in items.iter_mut().enumerate() {
        let step_path = base_path.child_index(i);
        let (step_type, step_ref) = step_identity(step, &step_path)?;

        if step_type == "branch" {
            let branches_path = step_path.child_key("branches");
            let Some(branches) = step.get_mut("branches").and_then(Value::as_array_mut) else {
                return Err(Error::InvalidSteps {
                    message: format!("{} is missing branches", step_path),
                });
            };
            for (bi, branch) in branches.iter_mut().enumerate() {
                if let Some(branch_steps) = branch.get_mut("steps") {
                    extract_step_list(
                        branch_steps,
                        annotation,
                        local_index,
                        bundle,
                        &branches_path.child_index(bi).child_key("steps"),
                        depth + 1,
                    )?;
                }
            }
        } else if let Some(template) = step.get_mut("template") {
            extract_step_template(
                template,
                &step_ref,
                annotation,
                local_index,
                bundle,
                &step_path.child_key("template"),
            )?;
        }
    }

    Ok(())
}

/// Extract a single step's template fields under the step's ref directory.
fn extract_step_template(
    template: &mut Value,
    step_ref: &str,
    annotation: &Annotation,
    local_index: &LocalStepIndex,
    bundle: &mut DirectoryBundle,
    template_path: &ObjectPath,
) -> Result<()> {
    let step_annotation = Annotation {
        extractable: annotation.step_fields.clone(),
        ..Annotation::default()
    };
    let dir_prefix = format!("{}/", step_ref);

    for field in compile(template, &step_annotation) {
        let local_path = local_index.marker_path(step_ref, &field.path);
        let full_path = template_path.concat(&field.path);
        extract_field(
            template,
            &field.path,
            &field.settings,
            local_path,
            &dir_prefix,
            &full_path,
            bundle,
        )?;
    }

    Ok(())
}

fn step_identity(step: &Value, step_path: &ObjectPath) -> Result<(String, String)> {
    let obj = step.as_object().ok_or_else(|| Error::InvalidSteps {
        message: format!("{} is not an object", step_path),
    })?;
    let step_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidSteps {
            message: format!("{} is missing a type", step_path),
        })?;
    let step_ref = obj
        .get("ref")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidSteps {
            message: format!("{} is missing a ref", step_path),
        })?;
    Ok((step_type.to_string(), step_ref.to_string()))
}

/// Move every readonly field under the readonly container, merging with any
/// readonly data already present.
fn relocate_readonly(tree: &mut Value, annotation: &Annotation) {
    let mut readonly = tree
        .as_object_mut()
        .and_then(|map| map.remove(READONLY_KEY))
        .unwrap_or_else(|| Value::Object(Map::new()));

    for field in &annotation.readonly_fields {
        let path = ObjectPath::parse(field);
        if let Some(moved) = remove_at_path(tree, &path) {
            set_creating(&mut readonly, &path, moved);
        }
    }

    let keep = readonly.as_object().is_some_and(|map| !map.is_empty());
    if keep && let Some(map) = tree.as_object_mut() {
        map.insert(READONLY_KEY.to_string(), readonly);
    }
}
