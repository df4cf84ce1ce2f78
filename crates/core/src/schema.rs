//! Per-kind form schemas.
//!
//! The schema documents ship inside the crate as YAML and are parsed once into a
//! [`SchemaRegistry`] that the caller owns and passes by reference. There is no
//! process-wide schema cache.

use crate::mapping::RecordKind;
use crate::{CoreError, CoreResult};
use questionnaire::Questionnaire;

const PRACTITIONER_SCHEMA: &str = include_str!("../schemas/practitioner.yaml");
const ORGANIZATION_SCHEMA: &str = include_str!("../schemas/organization.yaml");
const LOCATION_SCHEMA: &str = include_str!("../schemas/location.yaml");
const PRACTITIONER_ROLE_SCHEMA: &str = include_str!("../schemas/practitioner_role.yaml");

/// The YAML schema document shipped for a record kind.
pub fn embedded_document(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Practitioner => PRACTITIONER_SCHEMA,
        RecordKind::Organization => ORGANIZATION_SCHEMA,
        RecordKind::Location => LOCATION_SCHEMA,
        RecordKind::PractitionerRole => PRACTITIONER_ROLE_SCHEMA,
    }
}

/// Immutable schemas for every record kind.
#[derive(Clone, Debug)]
pub struct SchemaRegistry {
    practitioner: Questionnaire,
    organization: Questionnaire,
    location: Questionnaire,
    practitioner_role: Questionnaire,
}

impl SchemaRegistry {
    /// Parses the shipped schema documents.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Schema`] naming the record kind whose document is invalid.
    pub fn load_embedded() -> CoreResult<Self> {
        Self::from_documents(embedded_document)
    }

    /// Parses one YAML document per record kind, as supplied by `document`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Schema`] naming the record kind whose document is invalid.
    pub fn from_documents<'a>(document: impl Fn(RecordKind) -> &'a str) -> CoreResult<Self> {
        let parse = |kind: RecordKind| {
            Questionnaire::parse_yaml(document(kind)).map_err(|source| CoreError::Schema {
                kind: kind.resource_type(),
                source,
            })
        };

        let registry = Self {
            practitioner: parse(RecordKind::Practitioner)?,
            organization: parse(RecordKind::Organization)?,
            location: parse(RecordKind::Location)?,
            practitioner_role: parse(RecordKind::PractitionerRole)?,
        };

        tracing::debug!("loaded form schemas for all record kinds");
        Ok(registry)
    }

    pub fn get(&self, kind: RecordKind) -> &Questionnaire {
        match kind {
            RecordKind::Practitioner => &self.practitioner,
            RecordKind::Organization => &self.organization,
            RecordKind::Location => &self.location,
            RecordKind::PractitionerRole => &self.practitioner_role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questionnaire::{ItemType, NodeKind, PatternKind};

    #[test]
    fn embedded_schemas_parse() {
        let registry = SchemaRegistry::load_embedded().expect("embedded schemas");
        for kind in RecordKind::ALL {
            let schema = registry.get(kind);
            assert_eq!(schema.title.as_deref(), Some(kind.resource_type()));
            assert!(!schema.items.is_empty());
        }
    }

    #[test]
    fn nested_contact_paths_resolve() {
        let registry = SchemaRegistry::load_embedded().expect("embedded schemas");
        let organization = registry.get(RecordKind::Organization);

        let value = organization
            .find("contact.telecom.value")
            .expect("contact telecom value");
        assert_eq!(value.pattern(), Some(PatternKind::ContactPoint));
        assert_eq!(
            organization.find("contact.telecom").map(|n| n.kind()),
            Some(NodeKind::Group)
        );
        assert!(organization.item("telecom.value").is_none());
    }

    #[test]
    fn reference_fields_name_their_target() {
        let registry = SchemaRegistry::load_embedded().expect("embedded schemas");
        let role = registry.get(RecordKind::PractitionerRole);

        let location = role.item("location").expect("location field");
        assert_eq!(location.item_type, ItemType::Reference);
        assert!(location.repeats);
        assert_eq!(location.target_type(), Some("Location"));
        assert!(role.item("practitioner").is_some_and(|n| n.required));
    }

    #[test]
    fn invalid_document_names_its_kind() {
        let err = SchemaRegistry::from_documents(|kind| match kind {
            RecordKind::Location => "item:\n  - linkId: name\n    type: group\n",
            other => embedded_document(other),
        })
        .expect_err("group without children");

        match err {
            CoreError::Schema { kind, .. } => assert_eq!(kind, "Location"),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }
}
