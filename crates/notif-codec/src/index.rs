//! Local reference index
//!
//! Step order is not guaranteed stable across pulls, so a previously pulled
//! manifest is indexed by each step's `ref`. The bundle builder consults the
//! index to answer "was this step's field already extracted, and to where" -
//! that is what preserves a user's customized sidecar layout across re-pulls.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::marker::marker_key;
use crate::path::{ObjectPath, PathSegment};
use crate::step::{Step, walk_steps};
use crate::{Result, value};

/// Workflow steps from a local manifest, keyed by stable ref
#[derive(Debug, Default)]
pub struct LocalStepIndex {
    steps: BTreeMap<String, Step>,
}

impl LocalStepIndex {
    /// Index a step list, recursing into branch sub-steps.
    pub fn build(steps: &[Step]) -> Result<Self> {
        let mut index = BTreeMap::new();
        walk_steps(steps, &mut |step| {
            let previous = index.insert(step.step_ref().to_string(), step.clone());
            if previous.is_some() {
                warn!(step_ref = step.step_ref(), "duplicate step ref in local manifest");
            }
        })?;
        Ok(Self { steps: index })
    }

    /// Index the `steps` array of a local manifest tree, if it parses.
    ///
    /// A local manifest the user has broken by hand must not block a pull, so
    /// unparseable steps degrade to an empty index with a warning.
    pub fn from_manifest(manifest: &Value) -> Self {
        let Some(steps_value) = manifest.get("steps") else {
            return Self::default();
        };
        match Step::parse_all(steps_value).and_then(|steps| Self::build(&steps)) {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "ignoring unparseable local steps");
                Self::default()
            }
        }
    }

    pub fn get(&self, step_ref: &str) -> Option<&Step> {
        self.steps.get(step_ref)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The sidecar path the local manifest recorded for a step field, if the
    /// field is extracted there. `field_path` is relative to the step's
    /// `template` object.
    pub fn marker_path(&self, step_ref: &str, field_path: &ObjectPath) -> Option<String> {
        let step = self.get(step_ref)?;
        let template = step.template()?;
        let (parent, last) = field_path.split_last()?;
        let PathSegment::Key(field) = last else {
            return None;
        };

        let template_value = Value::Object(template.clone());
        let parent_value = value::get_at_path(&template_value, &parent)?;
        parent_value
            .get(marker_key(field))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
