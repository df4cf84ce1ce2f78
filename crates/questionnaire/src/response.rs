//! Answer trees.
//!
//! The answer tree is the interchange structure between the form renderer, the record
//! mappers and the validator. It is sparse: a field that has no value has no node.
//!
//! Node invariants:
//! - a group node has ordered children and no values,
//! - a leaf node has ordered values and no children,
//! - repeated groups appear as several sibling nodes sharing one `linkId`.
//!
//! On the wire a node is `{linkId, text?, answer?: [...], item?: [...]}`. A wire node
//! carrying both `answer` and `item` is rejected; a node carrying neither is a leaf
//! with no values.

use crate::value::TypedValue;
use crate::{schema_mismatch, QuestionnaireError, QuestionnaireResult};
use directory_types::LinkId;
use serde::{Deserialize, Serialize};

// ============================================================================
// Public tree types
// ============================================================================

/// Lifecycle status of an answer tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseStatus {
    #[default]
    InProgress,
    Completed,
    Amended,
    EnteredInError,
    Stopped,
}

/// Body of an answer node: either children or values, never both.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeBody {
    Group(Vec<AnswerNode>),
    Leaf(Vec<TypedValue>),
}

/// One node of an answer tree.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerNode {
    pub link_id: String,
    pub text: Option<String>,
    pub body: NodeBody,
}

/// The root of an answer tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuestionnaireResponse {
    pub status: ResponseStatus,
    pub items: Vec<AnswerNode>,
}

// ============================================================================
// Node construction and access
// ============================================================================

impl AnswerNode {
    /// Creates a group node.
    pub fn group(link_id: impl Into<String>, children: Vec<AnswerNode>) -> Self {
        Self {
            link_id: link_id.into(),
            text: None,
            body: NodeBody::Group(children),
        }
    }

    /// Creates a leaf node holding the given values in order.
    pub fn leaf(link_id: impl Into<String>, values: Vec<TypedValue>) -> Self {
        Self {
            link_id: link_id.into(),
            text: None,
            body: NodeBody::Leaf(values),
        }
    }

    /// Creates a leaf node holding one string value.
    pub fn string(link_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(link_id, vec![TypedValue::String(value.into())])
    }

    /// Records an "answered but empty" field: a single empty-string value.
    pub fn answered_empty(link_id: impl Into<String>) -> Self {
        Self::string(link_id, "")
    }

    pub fn is_group(&self) -> bool {
        matches!(self.body, NodeBody::Group(_))
    }

    /// Children of a group node; empty for leaves.
    pub fn children(&self) -> &[AnswerNode] {
        match &self.body {
            NodeBody::Group(children) => children,
            NodeBody::Leaf(_) => &[],
        }
    }

    /// Values of a leaf node; empty for groups.
    pub fn values(&self) -> &[TypedValue] {
        match &self.body {
            NodeBody::Leaf(values) => values,
            NodeBody::Group(_) => &[],
        }
    }

    /// Mutable children, for renderer edits. `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<AnswerNode>> {
        match &mut self.body {
            NodeBody::Group(children) => Some(children),
            NodeBody::Leaf(_) => None,
        }
    }

    /// Mutable values, for renderer edits. `None` for groups.
    pub fn values_mut(&mut self) -> Option<&mut Vec<TypedValue>> {
        match &mut self.body {
            NodeBody::Leaf(values) => Some(values),
            NodeBody::Group(_) => None,
        }
    }

    /// `true` when the node, or any node beneath it, holds a non-blank value.
    pub fn has_content(&self) -> bool {
        match &self.body {
            NodeBody::Leaf(values) => values.iter().any(|v| !v.is_blank()),
            NodeBody::Group(children) => children.iter().any(AnswerNode::has_content),
        }
    }

    /// Values that carry content, in order.
    pub fn present_values(&self) -> impl Iterator<Item = &TypedValue> {
        self.values().iter().filter(|v| !v.is_blank())
    }
}

impl QuestionnaireResponse {
    pub fn new(items: Vec<AnswerNode>) -> Self {
        Self {
            status: ResponseStatus::InProgress,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mutable top-level nodes, for renderer edits.
    pub fn items_mut(&mut self) -> &mut Vec<AnswerNode> {
        &mut self.items
    }

    /// Parse an answer tree from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`QuestionnaireError::Translation`] naming the failing field when the JSON
    /// does not match the wire format, or [`QuestionnaireError::InvalidInput`] when a node
    /// has a malformed `linkId` or carries both answers and children.
    pub fn parse_json(json_text: &str) -> QuestionnaireResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);
        let wire: ResponseWire = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| schema_mismatch("QuestionnaireResponse", err))?;

        wire_to_domain(wire)
    }

    /// Render the answer tree as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`QuestionnaireError::Translation`] if serialisation fails.
    pub fn render_json(&self) -> QuestionnaireResult<String> {
        let wire = domain_to_wire(self);
        serde_json::to_string_pretty(&wire).map_err(|e| {
            QuestionnaireError::Translation(format!("Failed to serialise response: {e}"))
        })
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
struct ResponseWire {
    #[serde(default)]
    pub status: ResponseStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<ItemWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
struct ItemWire {
    #[serde(rename = "linkId")]
    pub link_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Vec<TypedValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<ItemWire>>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: ResponseWire) -> QuestionnaireResult<QuestionnaireResponse> {
    let items = wire
        .item
        .into_iter()
        .map(item_to_node)
        .collect::<QuestionnaireResult<Vec<_>>>()?;

    Ok(QuestionnaireResponse {
        status: wire.status,
        items,
    })
}

fn item_to_node(item: ItemWire) -> QuestionnaireResult<AnswerNode> {
    LinkId::new(&item.link_id).map_err(|e| {
        QuestionnaireError::InvalidInput(format!("invalid linkId '{}': {e}", item.link_id))
    })?;

    let body = match (item.answer, item.item) {
        (Some(_), Some(_)) => {
            return Err(QuestionnaireError::InvalidInput(format!(
                "item '{}' cannot carry both answers and child items",
                item.link_id
            )));
        }
        (None, Some(children)) => NodeBody::Group(
            children
                .into_iter()
                .map(item_to_node)
                .collect::<QuestionnaireResult<Vec<_>>>()?,
        ),
        (answers, None) => NodeBody::Leaf(answers.unwrap_or_default()),
    };

    Ok(AnswerNode {
        link_id: item.link_id,
        text: item.text,
        body,
    })
}

fn domain_to_wire(response: &QuestionnaireResponse) -> ResponseWire {
    ResponseWire {
        status: response.status,
        item: response.items.iter().map(node_to_item).collect(),
    }
}

fn node_to_item(node: &AnswerNode) -> ItemWire {
    let (answer, item) = match &node.body {
        NodeBody::Leaf(values) => (Some(values.clone()), None),
        NodeBody::Group(children) => (None, Some(children.iter().map(node_to_item).collect())),
    };

    ItemWire {
        link_id: node.link_id.clone(),
        text: node.text.clone(),
        answer,
        item,
    }
}
