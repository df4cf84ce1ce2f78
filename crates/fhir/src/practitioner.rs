//! Practitioner records: a person directly or indirectly involved in providing care.

use crate::codes::AdministrativeGender;
use crate::datatypes::{Address, ContactPoint, HumanName, Identifier, Meta};
use crate::resource::impl_resource;
use crate::NonEmptyText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NonEmptyText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// Whether the practitioner's record is in active use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,

    /// Date of birth (ISO 8601 date: YYYY, YYYY-MM or YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

impl_resource!(Practitioner, "Practitioner");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{ContactPointSystem, NameUse};
    use crate::{FhirError, Resource};

    const SAMPLE: &str = r#"{
  "resourceType": "Practitioner",
  "id": "prac-001",
  "meta": { "versionId": "2", "lastUpdated": "2026-01-23T13:58:04Z" },
  "active": true,
  "identifier": [ { "system": "https://fhir.nhs.uk/Id/sds-user-id", "value": "G1234567" } ],
  "name": [ { "use": "official", "family": "Okafor", "given": ["Ada", "Ngozi"], "prefix": ["Dr"] } ],
  "telecom": [ { "system": "email", "value": "ada.okafor@example.org", "use": "work" } ],
  "gender": "female",
  "birthDate": "1980-04-12"
}"#;

    #[test]
    fn round_trips_sample_json() {
        let practitioner = Practitioner::parse_json(SAMPLE).expect("parse json");
        let output = practitioner.render_json().expect("render json");
        let reparsed = Practitioner::parse_json(&output).expect("reparse json");
        assert_eq!(practitioner, reparsed);
    }

    #[test]
    fn parses_nested_fields() {
        let practitioner = Practitioner::parse_json(SAMPLE).expect("parse json");
        assert_eq!(practitioner.id.as_ref().map(NonEmptyText::as_str), Some("prac-001"));
        assert_eq!(practitioner.name[0].use_type, Some(NameUse::Official));
        assert_eq!(practitioner.name[0].given, vec!["Ada", "Ngozi"]);
        assert_eq!(
            practitioner.telecom[0].system,
            Some(ContactPointSystem::Email)
        );
        assert_eq!(practitioner.gender, Some(AdministrativeGender::Female));
    }

    #[test]
    fn rejects_other_resource_type() {
        let err = Practitioner::parse_json(r#"{"resourceType":"Patient","id":"p1"}"#)
            .expect_err("should reject Patient");
        match err {
            FhirError::InvalidInput(msg) => {
                assert!(msg.contains("Practitioner"));
                assert!(msg.contains("Patient"));
            }
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn reports_path_of_unknown_code() {
        let input = r#"{"resourceType":"Practitioner","telecom":[{"system":"phone"},{"system":"pigeon"}]}"#;
        let err = Practitioner::parse_json(input).expect_err("unknown code");
        match err {
            FhirError::Translation(msg) => {
                assert!(msg.contains("telecom[1]"));
                assert!(msg.contains("pigeon"));
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn renders_minimal_practitioner() {
        let json = Practitioner::default().render_json().expect("render");
        assert!(json.contains("\"resourceType\": \"Practitioner\""));
        assert!(!json.contains("name"));
        assert!(!json.contains("id"));
    }
}
