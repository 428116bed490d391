//! Resource kinds and fetched resource trees

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::{Annotation, ExtractionSettings};

/// The kinds of configuration resource the service exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Workflow,
    Guide,
    Layout,
    MessageType,
    Partial,
}

impl ResourceKind {
    /// Every kind, in display order.
    pub fn all() -> [ResourceKind; 5] {
        [
            ResourceKind::Workflow,
            ResourceKind::Guide,
            ResourceKind::Layout,
            ResourceKind::MessageType,
            ResourceKind::Partial,
        ]
    }

    /// Fixed manifest file name for this kind.
    pub fn manifest_file_name(&self) -> &'static str {
        match self {
            ResourceKind::Workflow => "workflow.json",
            ResourceKind::Guide => "guide.json",
            ResourceKind::Layout => "layout.json",
            ResourceKind::MessageType => "message_type.json",
            ResourceKind::Partial => "partial.json",
        }
    }

    /// Stock annotation used when the remote payload carries none.
    pub fn default_annotation(&self) -> Annotation {
        let mut annotation = Annotation {
            readonly_fields: vec![
                "environment".into(),
                "key".into(),
                "created_at".into(),
                "updated_at".into(),
            ],
            ..Annotation::default()
        };

        match self {
            ResourceKind::Workflow => {
                annotation.readonly_fields.push("active".into());
                annotation.readonly_fields.push("valid".into());
                annotation.skip_containers.push("steps".into());
                annotation
                    .step_fields
                    .insert("body".into(), ExtractionSettings::new(true, "html"));
                annotation
                    .step_fields
                    .insert("text_body".into(), ExtractionSettings::new(true, "txt"));
                annotation
                    .step_fields
                    .insert("markdown_body".into(), ExtractionSettings::new(true, "md"));
                annotation
                    .step_fields
                    .insert("subject".into(), ExtractionSettings::new(false, "txt"));
                annotation
                    .step_fields
                    .insert("visual_blocks".into(), ExtractionSettings::new(true, "json"));
                annotation.step_fields.insert(
                    "visual_blocks.content".into(),
                    ExtractionSettings::new(true, "md"),
                );
            }
            ResourceKind::Guide => {
                annotation.readonly_fields.push("active".into());
                annotation
                    .extractable
                    .insert("description".into(), ExtractionSettings::new(false, "md"));
                annotation.extractable.insert(
                    "steps.fields.body".into(),
                    ExtractionSettings::new(true, "md"),
                );
            }
            ResourceKind::Layout => {
                annotation
                    .extractable
                    .insert("html_layout".into(), ExtractionSettings::new(true, "html"));
                annotation
                    .extractable
                    .insert("text_layout".into(), ExtractionSettings::new(true, "txt"));
            }
            ResourceKind::MessageType => {
                annotation
                    .extractable
                    .insert("preview".into(), ExtractionSettings::new(true, "html"));
                annotation
                    .extractable
                    .insert("description".into(), ExtractionSettings::new(false, "md"));
            }
            ResourceKind::Partial => {
                annotation
                    .extractable
                    .insert("content".into(), ExtractionSettings::new(true, "html"));
                annotation
                    .extractable
                    .insert("description".into(), ExtractionSettings::new(false, "md"));
            }
        }

        annotation
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Workflow => "workflow",
            ResourceKind::Guide => "guide",
            ResourceKind::Layout => "layout",
            ResourceKind::MessageType => "message_type",
            ResourceKind::Partial => "partial",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "workflow" => Ok(ResourceKind::Workflow),
            "guide" => Ok(ResourceKind::Guide),
            "layout" => Ok(ResourceKind::Layout),
            "message_type" => Ok(ResourceKind::MessageType),
            "partial" => Ok(ResourceKind::Partial),
            other => Err(format!("unknown resource kind: {}", other)),
        }
    }
}

/// One fetched resource instance: its tree plus the annotation side channel
#[derive(Debug, Clone)]
pub struct ResourceNode {
    pub kind: ResourceKind,
    pub value: Value,
    pub annotation: Annotation,
}

impl ResourceNode {
    /// Wrap a tree with the kind's stock annotation.
    pub fn new(kind: ResourceKind, value: Value) -> Self {
        Self {
            kind,
            value,
            annotation: kind.default_annotation(),
        }
    }

    /// Wrap a tree with an explicit annotation.
    pub fn with_annotation(kind: ResourceKind, value: Value, annotation: Annotation) -> Self {
        Self {
            kind,
            value,
            annotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_names() {
        assert_eq!(ResourceKind::Workflow.manifest_file_name(), "workflow.json");
        assert_eq!(
            ResourceKind::MessageType.manifest_file_name(),
            "message_type.json"
        );
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ResourceKind::all() {
            assert_eq!(kind.to_string().parse::<ResourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_workflow_annotation_skips_steps() {
        let annotation = ResourceKind::Workflow.default_annotation();
        assert!(annotation.skips("steps"));
        assert!(annotation.step_fields.contains_key("body"));
    }
}
