//! Translation between directory records and answer trees.
//!
//! Every record kind implements [`RecordForm`]:
//! - `to_tree` (forward) emits a sparse answer tree holding only the fields present in
//!   the record, one sibling group per repetition of a composite field, in source order;
//! - `from_tree` (reverse) rebuilds the record through parent-scoped lookups mirroring the
//!   forward emission paths exactly.
//!
//! Both directions are pure and total. Malformed input degrades to omission: a value
//! that cannot be represented (blank text, unknown code, wrong value kind) is skipped and
//! logged at debug level, never fabricated.
//!
//! Fields with no place in the schemas (`id`, `meta`, `Reference.display`) are not mapped;
//! the editing session carries `id`/`meta` across a submit.

mod common;
mod location;
mod organization;
mod practitioner;
mod practitioner_role;

use fhir::{Location, Meta, NonEmptyText, Organization, Practitioner, PractitionerRole, Resource};
use questionnaire::QuestionnaireResponse;
use std::fmt;
use std::str::FromStr;

/// The record kinds edited through directory forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Practitioner,
    Organization,
    Location,
    PractitionerRole,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Practitioner,
        RecordKind::Organization,
        RecordKind::Location,
        RecordKind::PractitionerRole,
    ];

    /// FHIR resource type name, also used as the store path segment.
    pub fn resource_type(self) -> &'static str {
        match self {
            RecordKind::Practitioner => Practitioner::RESOURCE_TYPE,
            RecordKind::Organization => Organization::RESOURCE_TYPE,
            RecordKind::Location => Location::RESOURCE_TYPE,
            RecordKind::PractitionerRole => PractitionerRole::RESOURCE_TYPE,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_type())
    }
}

impl FromStr for RecordKind {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.resource_type() == s)
            .ok_or_else(|| crate::CoreError::InvalidInput(format!("unknown record kind '{s}'")))
    }
}

/// Translation between one record kind and its answer tree.
pub trait RecordForm: Resource {
    const KIND: RecordKind;

    /// Forward mapping: record to sparse answer tree.
    fn to_tree(&self) -> QuestionnaireResponse;

    /// Reverse mapping: answer tree to record. `id` and `meta` are left empty.
    fn from_tree(tree: &QuestionnaireResponse) -> Self;
}

/// A record of any kind, tagged with its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum DomainRecord {
    Practitioner(Practitioner),
    Organization(Organization),
    Location(Location),
    PractitionerRole(PractitionerRole),
}

/// Applies `$body` to the record held by any variant, bound as `$record`.
macro_rules! with_record {
    ($value:expr, $record:ident => $body:expr) => {
        match $value {
            DomainRecord::Practitioner($record) => $body,
            DomainRecord::Organization($record) => $body,
            DomainRecord::Location($record) => $body,
            DomainRecord::PractitionerRole($record) => $body,
        }
    };
}

impl DomainRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            DomainRecord::Practitioner(_) => RecordKind::Practitioner,
            DomainRecord::Organization(_) => RecordKind::Organization,
            DomainRecord::Location(_) => RecordKind::Location,
            DomainRecord::PractitionerRole(_) => RecordKind::PractitionerRole,
        }
    }

    pub fn id(&self) -> Option<&NonEmptyText> {
        with_record!(self, r => r.id())
    }

    pub fn set_id(&mut self, id: Option<NonEmptyText>) {
        with_record!(self, r => r.set_id(id))
    }

    pub fn meta(&self) -> Option<&Meta> {
        with_record!(self, r => r.meta())
    }

    pub fn set_meta(&mut self, meta: Option<Meta>) {
        with_record!(self, r => r.set_meta(meta))
    }

    pub fn to_tree(&self) -> QuestionnaireResponse {
        with_record!(self, r => r.to_tree())
    }

    /// Reverse-maps a tree as a record of the given kind.
    pub fn from_tree(kind: RecordKind, tree: &QuestionnaireResponse) -> Self {
        match kind {
            RecordKind::Practitioner => Practitioner::from_tree(tree).into(),
            RecordKind::Organization => Organization::from_tree(tree).into(),
            RecordKind::Location => Location::from_tree(tree).into(),
            RecordKind::PractitionerRole => PractitionerRole::from_tree(tree).into(),
        }
    }

    /// Renders the record as `resourceType`-tagged JSON.
    ///
    /// # Errors
    ///
    /// Returns [`fhir::FhirError`] if serialisation fails.
    pub fn to_json_value(&self) -> fhir::FhirResult<serde_json::Value> {
        with_record!(self, r => r.to_json_value())
    }

    /// Parses record JSON that must carry the `resourceType` of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`fhir::FhirError`] if the JSON is not a record of that kind.
    pub fn from_json_value(kind: RecordKind, value: serde_json::Value) -> fhir::FhirResult<Self> {
        Ok(match kind {
            RecordKind::Practitioner => Practitioner::from_json_value(value)?.into(),
            RecordKind::Organization => Organization::from_json_value(value)?.into(),
            RecordKind::Location => Location::from_json_value(value)?.into(),
            RecordKind::PractitionerRole => PractitionerRole::from_json_value(value)?.into(),
        })
    }
}

impl From<Practitioner> for DomainRecord {
    fn from(record: Practitioner) -> Self {
        DomainRecord::Practitioner(record)
    }
}

impl From<Organization> for DomainRecord {
    fn from(record: Organization) -> Self {
        DomainRecord::Organization(record)
    }
}

impl From<Location> for DomainRecord {
    fn from(record: Location) -> Self {
        DomainRecord::Location(record)
    }
}

impl From<PractitionerRole> for DomainRecord {
    fn from(record: PractitionerRole) -> Self {
        DomainRecord::PractitionerRole(record)
    }
}


#[cfg(test)]
mod tests {
    use super::harness::assert_round_trip;
    use fhir::{
        Address, CodeableConcept, Coding, ContactPoint, ContactPointSystem, HumanName, Identifier,
        Location, Organization, Period, Practitioner, PractitionerRole, Reference,
    };

    #[test]
    fn padded_text_survives_round_trip() {
        assert_round_trip(&Practitioner {
            name: vec![HumanName {
                family: Some(" Okafor".into()),
                given: vec!["Ada ".into(), " Ngozi ".into()],
                ..HumanName::default()
            }],
            birth_date: Some("1980-04-12 ".into()),
            ..Practitioner::default()
        });

        assert_round_trip(&Organization {
            identifier: vec![Identifier {
                system: Some(" https://fhir.nhs.uk/Id/ods-organization-code".into()),
                value: Some("RR8 ".into()),
                ..Identifier::default()
            }],
            name: Some("  Leeds Teaching Hospitals".into()),
            alias: vec![" LTHT".into()],
            ..Organization::default()
        });

        assert_round_trip(&Location {
            name: Some("Ward 7 ".into()),
            description: Some(" Adult inpatient ward\n".into()),
            address: Some(Address {
                line: vec![" Great George Street".into()],
                postal_code: Some("LS1 3EX ".into()),
                ..Address::default()
            }),
            physical_type: Some(CodeableConcept {
                coding: vec![Coding {
                    system: Some(fhir::codes::LOCATION_PHYSICAL_TYPE_SYSTEM.into()),
                    code: Some("wa".into()),
                    display: Some(" Ward ".into()),
                }],
                text: Some(" ward".into()),
            }),
            ..Location::default()
        });

        assert_round_trip(&PractitionerRole {
            period: Some(Period {
                start: Some(" 2024-01-01T09:00:00Z".into()),
                end: None,
            }),
            telecom: vec![ContactPoint {
                system: Some(ContactPointSystem::Phone),
                value: Some(" 0113 243 2799".into()),
                ..ContactPoint::default()
            }],
            location: vec![Reference::to("Location", "ward-7")],
            ..PractitionerRole::default()
        });
    }
}
