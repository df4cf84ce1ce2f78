//! Schema-driven validation of answer trees.
//!
//! [`validate`] walks the tree depth-first in tree order. Each node is matched to the
//! schema node with the same `linkId` in the same scope and checked, in order, for:
//! 1. required presence (absent, or only blank values),
//! 2. length bounds, when a value is present,
//! 3. type-specific patterns: email, phone, `http`/`https` URL, `Kind/id` reference.
//!
//! Length and pattern rules are independent and may both report on one field. A failed
//! presence check suppresses the other checks for that node. After the nodes of a scope,
//! required schema children with no node in that scope are reported in schema order.
//!
//! Results are deterministic for a fixed tree and schema, and nothing is mutated.

use crate::resolve::ItemScope;
use crate::response::{AnswerNode, QuestionnaireResponse};
use crate::schema::{ItemType, NodeKind, PatternKind, Questionnaire, SchemaNode};
use crate::value::TypedValue;
use directory_types::LinkId;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Fewest digits accepted in a phone number once separators are removed.
const MIN_PHONE_DIGITS: usize = 7;

/// Most digits accepted in a phone number (E.164 maximum).
const MAX_PHONE_DIGITS: usize = 15;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<kind>[A-Z][A-Za-z]+)/(?P<id>[A-Za-z0-9.\-]{1,64})$")
        .expect("valid reference regex")
});

// ============================================================================
// Public result types
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    /// Reserved; no current rule reports warnings.
    Warning,
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Field label (schema `text`, or the path when unlabelled).
    pub field: String,
    /// Field path (`linkId`).
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    fn from_findings(findings: Vec<ValidationError>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = findings
            .into_iter()
            .partition(|f| f.severity == Severity::Error);

        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Messages of all errors, in report order.
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Validates an answer tree against a schema.
pub fn validate(tree: &QuestionnaireResponse, schema: &Questionnaire) -> ValidationResult {
    let mut findings = Vec::new();
    validate_scope(tree.items(), &schema.items, &mut findings);

    tracing::debug!(
        errors = findings.len(),
        title = schema.title.as_deref().unwrap_or("<untitled>"),
        "validated answer tree"
    );

    ValidationResult::from_findings(findings)
}

fn validate_scope(nodes: &[AnswerNode], schema_nodes: &[SchemaNode], out: &mut Vec<ValidationError>) {
    for node in nodes {
        let Some(schema_node) = schema_nodes
            .iter()
            .find(|s| s.link_id.as_str() == node.link_id)
        else {
            tracing::debug!(link_id = %node.link_id, "answer node has no schema counterpart");
            continue;
        };

        validate_node(node, schema_node, nodes, out);
    }

    for schema_node in schema_nodes.iter().filter(|s| s.required) {
        let present = nodes
            .iter()
            .any(|n| n.link_id == schema_node.link_id.as_str());
        if !present {
            out.push(required(schema_node));
        }
    }
}

fn validate_node(
    node: &AnswerNode,
    schema_node: &SchemaNode,
    siblings: &[AnswerNode],
    out: &mut Vec<ValidationError>,
) {
    if !node.has_content() {
        if schema_node.required {
            out.push(required(schema_node));
        }
        return;
    }

    match schema_node.kind() {
        NodeKind::Group => {
            if node.is_group() {
                validate_scope(node.children(), &schema_node.items, out);
            } else {
                tracing::debug!(link_id = %node.link_id, "leaf answer found where a group is expected");
            }
        }
        NodeKind::Leaf => {
            let values: Vec<&TypedValue> = node.present_values().collect();
            check_lengths(schema_node, &values, out);
            check_patterns(schema_node, &values, siblings, out);
        }
    }
}

fn check_lengths(schema_node: &SchemaNode, values: &[&TypedValue], out: &mut Vec<ValidationError>) {
    for text in values.iter().filter_map(|v| v.as_text()) {
        let length = text.trim().chars().count();

        if let Some(min) = schema_node.min_length {
            if length < min {
                out.push(error(
                    schema_node,
                    format!("{} must be at least {min} characters", schema_node.label()),
                ));
            }
        }

        if let Some(max) = schema_node.max_length {
            if length > max {
                out.push(error(
                    schema_node,
                    format!("{} must be at most {max} characters", schema_node.label()),
                ));
            }
        }
    }
}

/// Pattern rule selected for one leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rule {
    Email,
    Phone,
    Url,
    Reference,
}

fn check_patterns(
    schema_node: &SchemaNode,
    values: &[&TypedValue],
    siblings: &[AnswerNode],
    out: &mut Vec<ValidationError>,
) {
    let rule = match (schema_node.item_type, schema_node.pattern()) {
        (ItemType::Reference, _) => Some(Rule::Reference),
        (_, Some(PatternKind::Email)) => Some(Rule::Email),
        (_, Some(PatternKind::Phone)) => Some(Rule::Phone),
        (_, Some(PatternKind::ContactPoint)) => contact_point_rule(schema_node, siblings),
        (ItemType::Url, None) => Some(Rule::Url),
        _ => None,
    };

    let Some(rule) = rule else {
        return;
    };

    let label = schema_node.label();
    for text in values.iter().filter_map(|v| v.as_text()).map(str::trim) {
        match rule {
            Rule::Email if !is_email(text) => {
                out.push(error(schema_node, format!("{label} must be a valid email address")));
            }
            Rule::Phone if !is_phone(text) => {
                out.push(error(schema_node, format!("{label} must be a valid phone number")));
            }
            Rule::Url if !is_http_url(text) => {
                out.push(error(
                    schema_node,
                    format!("{label} must be a valid URL using http or https"),
                ));
            }
            Rule::Reference => check_reference(schema_node, text, out),
            _ => {}
        }
    }
}

/// Chooses the check for a contact point value from the `system` coding held by a sibling
/// in the same group. The sibling is resolved within the value's own group only.
fn contact_point_rule(schema_node: &SchemaNode, siblings: &[AnswerNode]) -> Option<Rule> {
    let system_path = match schema_node.link_id.parent() {
        Some(group) => format!("{group}{}system", LinkId::SEPARATOR),
        None => "system".to_owned(),
    };

    let system = siblings
        .iter()
        .find(|n| n.link_id == system_path)
        .and_then(leaf_code)?;

    match system {
        "email" => Some(Rule::Email),
        "phone" | "fax" | "sms" | "pager" => Some(Rule::Phone),
        "url" => Some(Rule::Url),
        _ => None,
    }
}

fn check_reference(schema_node: &SchemaNode, text: &str, out: &mut Vec<ValidationError>) {
    let label = schema_node.label();
    let Some(captures) = REFERENCE_RE.captures(text) else {
        out.push(error(
            schema_node,
            format!("{label} must be a reference of the form Kind/id"),
        ));
        return;
    };

    if let Some(target) = schema_node.target_type() {
        if &captures["kind"] != target {
            out.push(error(schema_node, format!("{label} must reference a {target} record")));
        }
    }
}

fn is_email(text: &str) -> bool {
    EMAIL_RE.is_match(text)
}

fn is_phone(text: &str) -> bool {
    let mut digits = 0usize;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' | '.' | '+' => {}
            _ => return false,
        }
    }
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

fn is_http_url(text: &str) -> bool {
    url::Url::parse(text)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

fn required(schema_node: &SchemaNode) -> ValidationError {
    error(schema_node, format!("{} is required", schema_node.label()))
}

fn error(schema_node: &SchemaNode, message: String) -> ValidationError {
    ValidationError {
        field: schema_node.label().to_owned(),
        path: schema_node.link_id.to_string(),
        message,
        severity: Severity::Error,
    }
}

/// Code of the first coding value held by a leaf.
fn leaf_code(node: &AnswerNode) -> Option<&str> {
    node.present_values()
        .find_map(TypedValue::as_coding)
        .and_then(|c| c.code())
}
