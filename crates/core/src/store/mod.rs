//! Record persistence boundary.
//!
//! The editing session only sees [`RecordStore`]. Implementations:
//! - [`HttpRecordStore`]: JSON over HTTP against a FHIR-style REST endpoint,
//! - [`RetryingStore`]: wraps any store with bounded exponential backoff.
//!
//! Retry lives entirely in the wrapper; the session and the mappers own no retry state.

mod http;

pub use http::HttpRecordStore;

use crate::mapping::{DomainRecord, RecordKind};
use async_trait::async_trait;
use directory_retry::{classify_status, retry, Classify, FailureClass, RetryError, RetryPolicy};

/// Errors raised by a record store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The request never produced an HTTP response (refused, reset, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),

    #[error("store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The store answered 2xx with a body that is not a record of the expected kind.
    #[error("could not decode stored record: {0}")]
    Decode(String),

    #[error("invalid store request: {0}")]
    InvalidRequest(String),

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<StoreError>,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl Classify for StoreError {
    fn failure_class(&self) -> FailureClass {
        match self {
            StoreError::Network(_) => FailureClass::Transient,
            StoreError::Status { status, .. } => classify_status(*status),
            StoreError::Decode(_) | StoreError::InvalidRequest(_) => FailureClass::Permanent,
            StoreError::Exhausted { last, .. } => last.failure_class(),
        }
    }
}

/// Transient failures that outlasted the policy become [`StoreError::Exhausted`]; a
/// permanent failure is returned as-is, whichever attempt produced it.
impl From<RetryError<StoreError>> for StoreError {
    fn from(err: RetryError<StoreError>) -> Self {
        if err.attempts > 1 && err.error.is_transient() {
            StoreError::Exhausted {
                attempts: err.attempts,
                last: Box::new(err.error),
            }
        } else {
            err.error
        }
    }
}

/// Create, read and update records of every kind.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn read(&self, kind: RecordKind, id: &str) -> StoreResult<DomainRecord>;

    /// Stores a new record; the store assigns its id.
    async fn create(&self, record: &DomainRecord) -> StoreResult<DomainRecord>;

    /// Replaces the stored record with the same kind and id.
    async fn update(&self, record: &DomainRecord) -> StoreResult<DomainRecord>;

    /// Updates a record that already has an id, otherwise creates it.
    async fn save(&self, record: &DomainRecord) -> StoreResult<DomainRecord> {
        if record.id().is_some() {
            self.update(record).await
        } else {
            self.create(record).await
        }
    }
}

/// A store whose calls are retried under a [`RetryPolicy`].
#[derive(Clone, Debug)]
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for RetryingStore<S> {
    async fn read(&self, kind: RecordKind, id: &str) -> StoreResult<DomainRecord> {
        let inner = &self.inner;
        let outcome = retry(&self.policy, move |_| inner.read(kind, id)).await?;
        Ok(outcome.value)
    }

    async fn create(&self, record: &DomainRecord) -> StoreResult<DomainRecord> {
        let inner = &self.inner;
        let outcome = retry(&self.policy, move |_| inner.create(record)).await?;
        Ok(outcome.value)
    }

    async fn update(&self, record: &DomainRecord) -> StoreResult<DomainRecord> {
        let inner = &self.inner;
        let outcome = retry(&self.policy, move |_| inner.update(record)).await?;
        Ok(outcome.value)
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeStore;
    use super::*;
    use fhir::{NonEmptyText, Organization};
    use std::time::Duration;

    fn organization(name: &str) -> DomainRecord {
        Organization {
            name: Some(name.into()),
            ..Organization::default()
        }
        .into()
    }

    fn server_error() -> StoreError {
        StoreError::Status {
            status: 500,
            message: "internal error".into(),
        }
    }

    #[test]
    fn classifies_store_errors() {
        assert!(StoreError::Network("connection reset".into()).is_transient());
        assert!(server_error().is_transient());
        assert!(StoreError::Status {
            status: 429,
            message: String::new()
        }
        .is_transient());
        assert!(!StoreError::Status {
            status: 422,
            message: String::new()
        }
        .is_transient());
        assert!(!StoreError::Decode("bad body".into()).is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn save_creates_records_without_id() {
        let store = FakeStore::default();
        let stored = store.save(&organization("Leeds")).await.expect("create");

        assert_eq!(store.calls(), vec!["create"]);
        assert_eq!(stored.id().map(NonEmptyText::as_str), Some("rec-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn save_updates_records_with_id() {
        let store = FakeStore::default();
        let mut record = organization("Leeds");
        record.set_id(Some(NonEmptyText::new("org-9").expect("id")));

        let stored = store.save(&record).await.expect("update");

        assert_eq!(store.calls(), vec!["update"]);
        assert_eq!(
            stored.meta().and_then(|m| m.version_id.as_deref()),
            Some("1")
        );
        assert!(store.stored(RecordKind::Organization, "org-9").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn retrying_store_recovers_from_transient_failures() {
        let store = RetryingStore::new(
            FakeStore::failing_with([server_error(), StoreError::Network("reset".into())]),
            RetryPolicy::default(),
        );

        let stored = store.save(&organization("Leeds")).await.expect("third attempt");

        assert_eq!(store.inner().calls(), vec!["create", "create", "create"]);
        assert!(stored.id().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn retrying_store_surfaces_permanent_failures_at_once() {
        let conflict = StoreError::Status {
            status: 409,
            message: "version conflict".into(),
        };
        let store = RetryingStore::new(
            FakeStore::failing_with([conflict.clone()]),
            RetryPolicy::default(),
        );

        let err = store
            .save(&organization("Leeds"))
            .await
            .expect_err("409 is permanent");

        assert_eq!(err, conflict);
        assert_eq!(store.inner().calls(), vec!["create"]);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_after_retry_is_not_reported_as_exhaustion() {
        let conflict = StoreError::Status {
            status: 409,
            message: "version conflict".into(),
        };
        let store = RetryingStore::new(
            FakeStore::failing_with([server_error(), conflict.clone()]),
            RetryPolicy::default(),
        );

        let err = store
            .save(&organization("Leeds"))
            .await
            .expect_err("409 on second attempt");

        assert_eq!(err, conflict);
        assert_eq!(store.inner().calls(), vec!["create", "create"]);
    }

    #[tokio::test(start_paused = true)]
    async fn retrying_store_reports_exhaustion() {
        let policy = RetryPolicy::new(2, Duration::from_millis(100), 2.0, Duration::from_secs(1))
            .expect("valid policy");
        let store = RetryingStore::new(
            FakeStore::failing_with([server_error(), server_error(), server_error()]),
            policy,
        );

        let err = store
            .read(RecordKind::Organization, "org-1")
            .await
            .expect_err("retries exhausted");

        match &err {
            StoreError::Exhausted { attempts, last } => {
                assert_eq!(*attempts, 2);
                assert_eq!(**last, server_error());
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert!(err.to_string().contains("HTTP 500"));
        assert_eq!(store.inner().calls(), vec!["read", "read"]);
    }
}
