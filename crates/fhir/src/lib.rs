//! FHIR-aligned directory records.
//!
//! This crate provides the **domain records** edited through directory forms and their
//! JSON wire format at the persistence boundary:
//! - [`Practitioner`]: a person providing care,
//! - [`Organization`]: a formally recognised grouping of people or organisations,
//! - [`Location`]: a physical place where services are provided,
//! - [`PractitionerRole`]: a practitioner's role within an organisation.
//!
//! This crate focuses on:
//! - FHIR semantic alignment of record shapes and closed value sets
//! - serialisation/deserialisation of record JSON (`resourceType`-tagged)
//!
//! It knows nothing about forms or answer trees; translation between records and answer
//! trees lives in `directory-core`.

pub mod codes;
pub mod datatypes;
pub mod location;
pub mod organization;
pub mod practitioner;
pub mod practitioner_role;
pub mod resource;

// Re-export record types
pub use location::{Location, Position};
pub use organization::{Organization, OrganizationContact};
pub use practitioner::Practitioner;
pub use practitioner_role::PractitionerRole;
pub use resource::Resource;

// Re-export shared datatypes and value sets
pub use codes::{
    display_for_code, AddressType, AddressUse, AdministrativeGender, CodedValue,
    ContactPointSystem, ContactPointUse, IdentifierUse, LocationMode, LocationStatus, NameUse,
};
pub use datatypes::{
    Address, CodeableConcept, Coding, ContactPoint, HumanName, Identifier, Meta, Period,
    Reference,
};

pub use directory_types::NonEmptyText;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
