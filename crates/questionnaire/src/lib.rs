//! Schema-driven answer trees for record editing forms.
//!
//! This crate is the generic half of the form engine. It knows nothing about
//! practitioners or organisations; it only understands:
//! - a declarative schema of field paths ([`Questionnaire`] / [`SchemaNode`]),
//! - the answer tree edited by the form renderer ([`QuestionnaireResponse`] / [`AnswerNode`]),
//! - parent-scoped path resolution over that tree ([`ItemScope`]),
//! - validation of a tree against a schema ([`validate`]).
//!
//! Wire formats follow the FHIR `Questionnaire` / `QuestionnaireResponse` shape
//! (`linkId`, `answer`, nested `item`). Schema documents are authored as YAML or JSON;
//! answer trees travel as JSON.

pub mod resolve;
pub mod response;
pub mod schema;
pub mod validation;
pub mod value;

pub use resolve::ItemScope;
pub use response::{AnswerNode, NodeBody, QuestionnaireResponse, ResponseStatus};
pub use schema::{ItemType, NodeKind, PatternKind, Questionnaire, SchemaNode, ValidationHint};
pub use validation::{validate, Severity, ValidationError, ValidationResult};
pub use value::{Coding, Quantity, Reference, TypedValue};

pub use directory_types::LinkId;

/// Errors returned by the `questionnaire` crate.
///
/// These only arise when parsing or rendering documents. Resolution and validation
/// never fail; validation findings are reported as [`ValidationResult`] data.
#[derive(Debug, thiserror::Error)]
pub enum QuestionnaireError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`QuestionnaireError`].
pub type QuestionnaireResult<T> = Result<T, QuestionnaireError>;

/// Formats a `serde_path_to_error` failure as a translation error naming the failing field.
pub(crate) fn schema_mismatch<E: std::fmt::Display>(
    what: &str,
    err: serde_path_to_error::Error<E>,
) -> QuestionnaireError {
    let path = err.path().to_string();
    let source = err.into_inner();
    let path = if path.is_empty() {
        "<root>"
    } else {
        path.as_str()
    };
    QuestionnaireError::Translation(format!("{what} schema mismatch at {path}: {source}"))
}
