//! One record editing session.
//!
//! A [`FormSession`] owns the record being edited and the answer tree the renderer
//! mutates. Submitting validates the tree, maps it back to a record, saves it and
//! re-derives the tree from what the store returned.

use crate::mapping::{DomainRecord, RecordKind};
use crate::schema::SchemaRegistry;
use crate::store::RecordStore;
use crate::{CoreError, CoreResult};
use questionnaire::{validate, Questionnaire, QuestionnaireResponse, ValidationResult};
use std::time::Duration;

/// Result of a submit that reached a decision.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// The record as stored, with its store-assigned id and version.
    Saved(DomainRecord),
    /// The tree failed validation; nothing was saved and the tree is unchanged.
    Rejected(ValidationResult),
}

#[derive(Clone, Debug)]
pub struct FormSession {
    kind: RecordKind,
    record: Option<DomainRecord>,
    tree: QuestionnaireResponse,
}

impl FormSession {
    /// A blank form for a new record.
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            record: None,
            tree: QuestionnaireResponse::default(),
        }
    }

    /// Opens an existing record for editing.
    pub fn open(record: DomainRecord) -> Self {
        Self {
            kind: record.kind(),
            tree: record.to_tree(),
            record: Some(record),
        }
    }

    /// Reads a record from the store and opens it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the read fails, or [`CoreError::Timeout`] if it
    /// does not finish within `timeout`.
    pub async fn load<S: RecordStore + ?Sized>(
        kind: RecordKind,
        id: &str,
        store: &S,
        timeout: Duration,
    ) -> CoreResult<Self> {
        let record = tokio::time::timeout(timeout, store.read(kind, id))
            .await
            .map_err(|_| CoreError::Timeout(timeout))??;

        if record.kind() != kind {
            return Err(CoreError::InvalidInput(format!(
                "store returned a {} record for {kind}/{id}",
                record.kind()
            )));
        }

        tracing::debug!(%kind, id, "opened record for editing");
        Ok(Self::open(record))
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The record as last loaded or saved; `None` for a form that was never saved.
    pub fn record(&self) -> Option<&DomainRecord> {
        self.record.as_ref()
    }

    pub fn tree(&self) -> &QuestionnaireResponse {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut QuestionnaireResponse {
        &mut self.tree
    }

    pub fn validate(&self, schema: &Questionnaire) -> ValidationResult {
        validate(&self.tree, schema)
    }

    /// Validates, maps back and saves the current tree.
    ///
    /// The record keeps the `id` and `meta` of the loaded record, so an opened record
    /// is updated and a new one is created. On success the tree is replaced by one
    /// derived from the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the store rejects the record, or
    /// [`CoreError::Timeout`] if the save does not finish within `timeout`. The session
    /// is left unchanged on error.
    pub async fn submit<S: RecordStore + ?Sized>(
        &mut self,
        registry: &SchemaRegistry,
        store: &S,
        timeout: Duration,
    ) -> CoreResult<SubmitOutcome> {
        let result = self.validate(registry.get(self.kind));
        if !result.is_valid {
            tracing::debug!(
                kind = %self.kind,
                errors = result.errors.len(),
                "submit rejected by validation"
            );
            return Ok(SubmitOutcome::Rejected(result));
        }

        let mut record = DomainRecord::from_tree(self.kind, &self.tree);
        if let Some(loaded) = &self.record {
            record.set_id(loaded.id().cloned());
            record.set_meta(loaded.meta().cloned());
        }

        let stored = tokio::time::timeout(timeout, store.save(&record))
            .await
            .map_err(|_| CoreError::Timeout(timeout))??;

        tracing::info!(
            kind = %self.kind,
            id = stored.id().map(|id| id.as_str()).unwrap_or("<none>"),
            "record saved"
        );

        self.tree = stored.to_tree();
        self.record = Some(stored.clone());
        Ok(SubmitOutcome::Saved(stored))
    }
}
