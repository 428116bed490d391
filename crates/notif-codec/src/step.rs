//! Typed workflow step model
//!
//! Workflow steps form a recursive tree: a branch step holds ordered
//! sub-branches, each holding its own ordered step list. Modeling this as a
//! tagged enum (instead of an untyped map) makes exhaustive handling and the
//! nesting limit enforceable, and gives the local reference index something
//! stable to key on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Traversal guard for branch nesting; deeper trees are rejected as malformed
pub const MAX_STEP_DEPTH: usize = 16;

/// Fields shared by every non-branch step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonStep {
    /// Stable identifier, unique across the workflow
    #[serde(rename = "ref")]
    pub step_ref: String,

    /// Everything else, including the channel template
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// A branch step: ordered sub-branches, each with its own step list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchStep {
    #[serde(rename = "ref")]
    pub step_ref: String,

    pub branches: Vec<Branch>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One branch within a branch step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default)]
    pub steps: Vec<Step>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One workflow step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Channel(CommonStep),
    Delay(CommonStep),
    Batch(CommonStep),
    HttpFetch(CommonStep),
    Branch(BranchStep),
}

impl Step {
    /// The step's stable reference.
    pub fn step_ref(&self) -> &str {
        match self {
            Step::Channel(s) | Step::Delay(s) | Step::Batch(s) | Step::HttpFetch(s) => &s.step_ref,
            Step::Branch(s) => &s.step_ref,
        }
    }

    /// The step's `template` object, if any.
    pub fn template(&self) -> Option<&Map<String, Value>> {
        let rest = match self {
            Step::Channel(s) | Step::Delay(s) | Step::Batch(s) | Step::HttpFetch(s) => &s.rest,
            Step::Branch(s) => &s.rest,
        };
        rest.get("template").and_then(Value::as_object)
    }

    /// Parse a manifest's `steps` array.
    pub fn parse_all(steps: &Value) -> Result<Vec<Step>> {
        serde_json::from_value(steps.clone()).map_err(|e| Error::InvalidSteps {
            message: e.to_string(),
        })
    }
}

/// Visit every step, including branch sub-steps, depth first.
///
/// Fails with [`Error::DepthExceeded`] when branch nesting goes past
/// [`MAX_STEP_DEPTH`].
pub fn walk_steps<'a, F>(steps: &'a [Step], visit: &mut F) -> Result<()>
where
    F: FnMut(&'a Step),
{
    walk_at(steps, visit, 0)
}

fn walk_at<'a, F>(steps: &'a [Step], visit: &mut F, depth: usize) -> Result<()>
where
    F: FnMut(&'a Step),
{
    if depth > MAX_STEP_DEPTH {
        return Err(Error::DepthExceeded {
            max: MAX_STEP_DEPTH,
        });
    }

    for step in steps {
        visit(step);
        if let Step::Branch(branch_step) = step {
            for branch in &branch_step.branches {
                walk_at(&branch.steps, visit, depth + 1)?;
            }
        }
    }

    Ok(())
}
