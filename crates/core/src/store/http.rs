//! JSON-over-HTTP record store.
//!
//! Speaks the FHIR REST interactions the editor needs:
//! - `GET {base}/{Kind}/{id}` (read),
//! - `POST {base}/{Kind}` (create),
//! - `PUT {base}/{Kind}/{id}` (update).
//!
//! One call is one HTTP request. Wrap the store in [`super::RetryingStore`] for backoff.

use super::{RecordStore, StoreError, StoreResult};
use crate::config::CoreConfig;
use crate::constants::{FHIR_JSON_MEDIA_TYPE, MAX_ERROR_BODY_CHARS};
use crate::mapping::{DomainRecord, RecordKind};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use url::Url;

/// Record store backed by a FHIR-style REST endpoint.
#[derive(Clone, Debug)]
pub struct HttpRecordStore {
    client: Client,
    base_url: Url,
}

impl HttpRecordStore {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.store_base_url().clone())
    }

    /// Uses a caller-built client, for example one with proxy or TLS settings.
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, kind: RecordKind, id: Option<&str>) -> StoreResult<Url> {
        endpoint(&self.base_url, kind, id)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(ACCEPT, FHIR_JSON_MEDIA_TYPE)
    }

    fn with_body(
        &self,
        method: Method,
        url: Url,
        record: &DomainRecord,
    ) -> StoreResult<RequestBuilder> {
        let body = record
            .to_json_value()
            .and_then(|value| serde_json::to_vec(&value).map_err(fhir::FhirError::from))
            .map_err(|e| StoreError::InvalidRequest(format!("could not encode record: {e}")))?;

        Ok(self
            .request(method, url)
            .header(CONTENT_TYPE, FHIR_JSON_MEDIA_TYPE)
            .body(body))
    }

    async fn send(&self, kind: RecordKind, request: RequestBuilder) -> StoreResult<DomainRecord> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %kind, "record store rejected request");
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: error_excerpt(&body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        decode_record(kind, &bytes)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn read(&self, kind: RecordKind, id: &str) -> StoreResult<DomainRecord> {
        let url = self.endpoint(kind, Some(id))?;
        tracing::debug!(%url, "reading record");
        self.send(kind, self.request(Method::GET, url)).await
    }

    async fn create(&self, record: &DomainRecord) -> StoreResult<DomainRecord> {
        let kind = record.kind();
        let url = self.endpoint(kind, None)?;
        tracing::debug!(%url, "creating record");
        let request = self.with_body(Method::POST, url, record)?;
        self.send(kind, request).await
    }

    async fn update(&self, record: &DomainRecord) -> StoreResult<DomainRecord> {
        let kind = record.kind();
        let id = record.id().ok_or_else(|| {
            StoreError::InvalidRequest(format!("cannot update a {kind} record without an id"))
        })?;
        let url = self.endpoint(kind, Some(id.as_str()))?;
        tracing::debug!(%url, "updating record");
        let request = self.with_body(Method::PUT, url, record)?;
        self.send(kind, request).await
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// `{base}/{Kind}` or `{base}/{Kind}/{id}`, with each segment percent-encoded.
fn endpoint(base: &Url, kind: RecordKind, id: Option<&str>) -> StoreResult<Url> {
    if id.is_some_and(|id| id.trim().is_empty()) {
        return Err(StoreError::InvalidRequest("record id must not be blank".into()));
    }

    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            StoreError::InvalidRequest(format!("store base URL {base} cannot hold a path"))
        })?;
        segments.pop_if_empty().push(kind.resource_type());
        if let Some(id) = id {
            segments.push(id.trim());
        }
    }
    Ok(url)
}

/// Diagnostics from an error document, or the start of the raw body.
fn error_excerpt(body: &str) -> String {
    let diagnostics = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|doc| {
            let issues = doc.get("issue")?.as_array()?;
            let messages: Vec<&str> = issues
                .iter()
                .filter_map(|issue| issue.get("diagnostics")?.as_str())
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        });

    let text = diagnostics.unwrap_or_else(|| body.trim().to_owned());
    text.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

fn decode_record(kind: RecordKind, bytes: &[u8]) -> StoreResult<DomainRecord> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| StoreError::Decode(format!("{kind} response is not JSON: {e}")))?;

    DomainRecord::from_json_value(kind, value).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::NonEmptyText;

    fn base(url: &str) -> Url {
        Url::parse(url).expect("valid url")
    }

    #[test]
    fn endpoint_appends_kind_and_id() {
        let url = endpoint(
            &base("http://store.test/fhir"),
            RecordKind::PractitionerRole,
            Some("r-1"),
        )
        .expect("endpoint");
        assert_eq!(url.as_str(), "http://store.test/fhir/PractitionerRole/r-1");

        let url = endpoint(&base("http://store.test/fhir/"), RecordKind::Location, None)
            .expect("endpoint");
        assert_eq!(url.as_str(), "http://store.test/fhir/Location");
    }

    #[test]
    fn endpoint_encodes_ids() {
        let url = endpoint(
            &base("http://store.test/fhir"),
            RecordKind::Organization,
            Some("a/b c"),
        )
        .expect("endpoint");
        assert_eq!(url.as_str(), "http://store.test/fhir/Organization/a%2Fb%20c");
    }

    #[test]
    fn endpoint_rejects_blank_ids() {
        let err = endpoint(
            &base("http://store.test/fhir"),
            RecordKind::Organization,
            Some("  "),
        )
        .expect_err("blank id");
        assert!(matches!(err, StoreError::InvalidRequest(_)));
    }

    #[test]
    fn error_excerpt_prefers_diagnostics() {
        let body = r#"{
            "resourceType": "OperationOutcome",
            "issue": [
                {"severity": "error", "diagnostics": "name is required"},
                {"severity": "error", "code": "invalid"},
                {"severity": "error", "diagnostics": "telecom value is malformed"}
            ]
        }"#;
        assert_eq!(
            error_excerpt(body),
            "name is required; telecom value is malformed"
        );
    }

    #[test]
    fn error_excerpt_truncates_raw_bodies() {
        let body = format!("  {}  ", "x".repeat(500));
        let excerpt = error_excerpt(&body);
        assert_eq!(excerpt.chars().count(), MAX_ERROR_BODY_CHARS);
        assert!(excerpt.starts_with('x'));
    }

    #[test]
    fn decodes_stored_records() {
        let body = br#"{"resourceType": "Organization", "id": "org-1", "name": "Leeds General"}"#;
        let record = decode_record(RecordKind::Organization, body).expect("decode");

        assert_eq!(record.kind(), RecordKind::Organization);
        assert_eq!(record.id().map(NonEmptyText::as_str), Some("org-1"));
    }

    #[test]
    fn decode_rejects_other_kinds_and_garbage() {
        let body = br#"{"resourceType": "Location", "name": "Ward 1"}"#;
        let err = decode_record(RecordKind::Organization, body).expect_err("wrong kind");
        assert!(matches!(err, StoreError::Decode(_)));

        let err = decode_record(RecordKind::Organization, b"<html>").expect_err("not json");
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn update_requires_an_id() {
        let store = HttpRecordStore::new(base("http://store.test/fhir"));
        let record: DomainRecord = fhir::Organization::default().into();

        let err = store.update(&record).await.expect_err("no id");
        assert!(matches!(err, StoreError::InvalidRequest(_)));
    }

    #[test]
    fn from_config_uses_configured_base_url() {
        let config = CoreConfig::new(
            base("https://directory.example.org/fhir"),
            directory_retry::RetryPolicy::default(),
            std::time::Duration::from_secs(5),
        )
        .expect("config");

        let store = HttpRecordStore::from_config(&config);
        assert_eq!(store.base_url().as_str(), "https://directory.example.org/fhir");
    }
}
