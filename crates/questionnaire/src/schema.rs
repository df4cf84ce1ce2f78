//! Declarative form schemas.
//!
//! A [`Questionnaire`] is the static, per-record-kind description of the answer tree:
//! which field paths exist, what kind of value each holds, whether it repeats, and
//! which validation rules apply. It is parsed once at startup and never mutated.
//!
//! Structural rules enforced on parse:
//! - leaves carry no children and groups carry at least one child,
//! - every child path is a direct child of its group's path (`name.family` under `name`),
//! - sibling paths are unique,
//! - `minLength` does not exceed `maxLength`.

use crate::{schema_mismatch, QuestionnaireError, QuestionnaireResult};
use directory_types::LinkId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Public schema types
// ============================================================================

/// The value type of a schema node (`type` on the wire).
///
/// Nodes that omit `type` are string leaves; groups must say `type: group`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    Group,
    Boolean,
    Decimal,
    Integer,
    Date,
    DateTime,
    Time,
    #[default]
    String,
    Text,
    Url,
    Coding,
    Reference,
    Quantity,
}

/// Whether a node holds children or values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Leaf,
}

/// Named pattern checks applied to string values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    Email,
    Phone,
    /// Email, phone or URL check chosen by the sibling `<group>.system` coding.
    ContactPoint,
}

/// Optional validation hints attached to a schema node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidationHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternKind>,

    /// Required record kind for reference values (`Organization`, `Location`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
}

/// One field of a form schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaNode {
    pub link_id: LinkId,

    /// Human-readable label, used as the field name in validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "type", default)]
    pub item_type: ItemType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub repeats: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Canonical code system for coding leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coding_system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationHint>,

    /// Ordered children (groups only).
    #[serde(default, rename = "item", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<SchemaNode>,
}

/// A complete form schema for one record kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Questionnaire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, rename = "item")]
    pub items: Vec<SchemaNode>,
}

// ============================================================================
// Schema operations
// ============================================================================

impl SchemaNode {
    pub fn kind(&self) -> NodeKind {
        if self.item_type == ItemType::Group {
            NodeKind::Group
        } else {
            NodeKind::Leaf
        }
    }

    /// Label used in validation messages: the `text`, or the path when no label exists.
    pub fn label(&self) -> &str {
        self.text.as_deref().unwrap_or(self.link_id.as_str())
    }

    /// Finds the direct child schema node with the given path.
    pub fn child(&self, link_id: &str) -> Option<&SchemaNode> {
        self.items.iter().find(|n| n.link_id.as_str() == link_id)
    }

    pub fn pattern(&self) -> Option<PatternKind> {
        self.validation.as_ref().and_then(|v| v.pattern)
    }

    pub fn target_type(&self) -> Option<&str> {
        self.validation
            .as_ref()
            .and_then(|v| v.target_type.as_deref())
    }
}

impl Questionnaire {
    /// Parse a schema document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`QuestionnaireError::Translation`] naming the failing field when the
    /// document does not match the schema wire format, or
    /// [`QuestionnaireError::InvalidSchema`] when it breaks a structural rule.
    pub fn parse_json(json_text: &str) -> QuestionnaireResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        let parsed: Questionnaire = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| schema_mismatch("Questionnaire", err))?;
        parsed.check_structure()?;
        Ok(parsed)
    }

    /// Parse a schema document from YAML text.
    ///
    /// # Errors
    ///
    /// See [`Questionnaire::parse_json`].
    pub fn parse_yaml(yaml_text: &str) -> QuestionnaireResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let parsed: Questionnaire = serde_path_to_error::deserialize(deserializer)
            .map_err(|err| schema_mismatch("Questionnaire", err))?;
        parsed.check_structure()?;
        Ok(parsed)
    }

    /// Render the schema as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`QuestionnaireError::Translation`] if serialisation fails.
    pub fn render_json(&self) -> QuestionnaireResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            QuestionnaireError::Translation(format!("Failed to serialise questionnaire: {e}"))
        })
    }

    /// Finds the top-level schema node with the given path.
    pub fn item(&self, link_id: &str) -> Option<&SchemaNode> {
        self.items.iter().find(|n| n.link_id.as_str() == link_id)
    }

    /// Finds a schema node anywhere in the schema by walking its path segments
    /// from the root, one owning group at a time.
    pub fn find(&self, link_id: &str) -> Option<&SchemaNode> {
        let target = LinkId::new(link_id).ok()?;
        let mut prefix = String::new();
        let mut scope: &[SchemaNode] = &self.items;
        let mut found = None;

        for segment in target.as_str().split(LinkId::SEPARATOR) {
            if !prefix.is_empty() {
                prefix.push(LinkId::SEPARATOR);
            }
            prefix.push_str(segment);

            let node = scope.iter().find(|n| n.link_id.as_str() == prefix)?;
            scope = &node.items;
            found = Some(node);
        }

        found
    }

    /// Checks the structural rules listed in the module documentation.
    ///
    /// # Errors
    ///
    /// Returns [`QuestionnaireError::InvalidSchema`] describing the first violation.
    pub fn check_structure(&self) -> QuestionnaireResult<()> {
        check_siblings(None, &self.items)
    }
}

fn check_siblings(parent: Option<&LinkId>, nodes: &[SchemaNode]) -> QuestionnaireResult<()> {
    let mut seen = HashSet::new();

    for node in nodes {
        if !seen.insert(node.link_id.as_str()) {
            return Err(QuestionnaireError::InvalidSchema(format!(
                "duplicate linkId '{}'",
                node.link_id
            )));
        }

        match parent {
            Some(group) if !node.link_id.is_child_of(group) => {
                return Err(QuestionnaireError::InvalidSchema(format!(
                    "linkId '{}' is not a direct child of group '{}'",
                    node.link_id, group
                )));
            }
            None if node.link_id.depth() != 1 => {
                return Err(QuestionnaireError::InvalidSchema(format!(
                    "top-level linkId '{}' must be a single segment",
                    node.link_id
                )));
            }
            _ => {}
        }

        match node.kind() {
            NodeKind::Leaf if !node.items.is_empty() => {
                return Err(QuestionnaireError::InvalidSchema(format!(
                    "leaf '{}' cannot have children",
                    node.link_id
                )));
            }
            NodeKind::Group if node.items.is_empty() => {
                return Err(QuestionnaireError::InvalidSchema(format!(
                    "group '{}' must have at least one child",
                    node.link_id
                )));
            }
            _ => {}
        }

        if let (Some(min), Some(max)) = (node.min_length, node.max_length) {
            if min > max {
                return Err(QuestionnaireError::InvalidSchema(format!(
                    "'{}' has minLength {min} greater than maxLength {max}",
                    node.link_id
                )));
            }
        }

        check_siblings(Some(&node.link_id), &node.items)?;
    }

    Ok(())
}
