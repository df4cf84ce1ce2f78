//! Parent-scoped path resolution.
//!
//! Every lookup is made against an explicit scope: the tree root or one group node.
//! Only the direct children of that scope are searched. Looking up `address.city` at the
//! root finds nothing even when an `address` group holding `address.city` exists; the
//! caller must first resolve the owning `address` node and search within it.
//!
//! There is no whole-tree search. With repeated groups (several `telecom` siblings, each
//! holding a `telecom.value`) it would bind every repetition to the first match.

use crate::response::{AnswerNode, QuestionnaireResponse};
use crate::value::{Coding, TypedValue};

/// A node container that paths can be resolved against.
pub trait ItemScope {
    /// The direct children of this scope, in tree order.
    fn items(&self) -> &[AnswerNode];

    /// Every direct child with the given path, in tree order.
    ///
    /// Repeated groups yield several matches.
    fn resolve(&self, link_id: &str) -> Vec<&AnswerNode> {
        self.items()
            .iter()
            .filter(|node| node.link_id == link_id)
            .collect()
    }

    /// The first direct child with the given path, for known-singular fields.
    fn resolve_scalar(&self, link_id: &str) -> Option<&AnswerNode> {
        self.items().iter().find(|node| node.link_id == link_id)
    }

    /// Non-blank values of the first matching leaf.
    fn values_at(&self, link_id: &str) -> Vec<&TypedValue> {
        self.resolve_scalar(link_id)
            .map(|node| node.present_values().collect())
            .unwrap_or_default()
    }

    /// First non-blank string-like value of a singular leaf, as stored.
    fn text_at(&self, link_id: &str) -> Option<String> {
        self.values_at(link_id)
            .into_iter()
            .find_map(TypedValue::as_text)
            .map(str::to_owned)
    }

    /// Every non-blank string-like value of a leaf, as stored, in order.
    fn texts_at(&self, link_id: &str) -> Vec<String> {
        self.values_at(link_id)
            .into_iter()
            .filter_map(TypedValue::as_text)
            .map(str::to_owned)
            .collect()
    }

    /// First coding of a singular leaf that carries a code.
    fn coding_at(&self, link_id: &str) -> Option<&Coding> {
        self.values_at(link_id)
            .into_iter()
            .find_map(TypedValue::as_coding)
    }

    /// Every coding carrying a code, in order.
    fn codings_at(&self, link_id: &str) -> Vec<&Coding> {
        self.values_at(link_id)
            .into_iter()
            .filter_map(TypedValue::as_coding)
            .collect()
    }

    fn bool_at(&self, link_id: &str) -> Option<bool> {
        self.values_at(link_id)
            .into_iter()
            .find_map(TypedValue::as_bool)
    }

    fn integer_at(&self, link_id: &str) -> Option<i64> {
        self.values_at(link_id)
            .into_iter()
            .find_map(TypedValue::as_integer)
    }

    fn decimal_at(&self, link_id: &str) -> Option<f64> {
        self.values_at(link_id)
            .into_iter()
            .find_map(TypedValue::as_decimal)
    }
}

impl ItemScope for QuestionnaireResponse {
    fn items(&self) -> &[AnswerNode] {
        &self.items
    }
}

impl ItemScope for AnswerNode {
    fn items(&self) -> &[AnswerNode] {
        self.children()
    }
}
