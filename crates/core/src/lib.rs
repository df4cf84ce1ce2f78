//! # Directory Core
//!
//! Core logic for editing directory records through forms.
//!
//! This crate ties the record types of `fhir` to the answer trees of `questionnaire`:
//! - forward and reverse mapping between records and answer trees ([`mapping`]),
//! - the shipped per-kind form schemas ([`schema`]),
//! - the editing session that validates, maps back and saves ([`session`]),
//! - the persistence boundary with retry ([`store`]).
//!
//! **No UI concerns**: rendering answer trees and navigating between forms belong to the
//! caller. Configuration is resolved once at startup into a [`CoreConfig`] and passed in.

pub mod config;
pub mod constants;
mod error;
pub mod mapping;
pub mod schema;
pub mod session;
pub mod store;

pub use config::{
    retry_policy_from_env_values, save_timeout_from_env_value, store_base_url_from_env_value,
    CoreConfig,
};
pub use error::{CoreError, CoreResult};
pub use mapping::{DomainRecord, RecordForm, RecordKind};
pub use schema::SchemaRegistry;
pub use session::{FormSession, SubmitOutcome};
pub use store::{HttpRecordStore, RecordStore, RetryingStore, StoreError, StoreResult};

pub use directory_retry::RetryPolicy;
