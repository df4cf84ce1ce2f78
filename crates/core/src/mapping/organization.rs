//! Organization form mapping.
//!
//! Paths: `active`, `identifier.*`, `type.*`, `name`, `alias`, `telecom.*`, `address.*`,
//! `partOf`, `contact.*`. Each `contact` group nests its own `contact.purpose`,
//! `contact.name`, `contact.telecom` and `contact.address` groups.

use super::common::*;
use super::{RecordForm, RecordKind};
use fhir::codes::{CONTACT_ENTITY_TYPE_SYSTEM, ORGANIZATION_TYPE_SYSTEM};
use fhir::{CodeableConcept, Organization, OrganizationContact};
use questionnaire::{AnswerNode, QuestionnaireResponse};

fn type_children(group: &str, concept: &CodeableConcept) -> Vec<AnswerNode> {
    concept_children(group, concept, ORGANIZATION_TYPE_SYSTEM)
}

fn purpose_children(group: &str, concept: &CodeableConcept) -> Vec<AnswerNode> {
    concept_children(group, concept, CONTACT_ENTITY_TYPE_SYSTEM)
}

fn contact_children(group: &str, contact: &OrganizationContact) -> Vec<AnswerNode> {
    let mut out = Vec::new();
    push_group(
        &mut out,
        &path(group, "purpose"),
        contact.purpose.as_ref(),
        purpose_children,
    );
    push_group(&mut out, &path(group, "name"), contact.name.as_ref(), name_children);
    push_groups(&mut out, &path(group, "telecom"), &contact.telecom, telecom_children);
    push_group(
        &mut out,
        &path(group, "address"),
        contact.address.as_ref(),
        address_children,
    );
    out
}

fn read_contact(node: &AnswerNode, group: &str) -> Option<OrganizationContact> {
    let contact = OrganizationContact {
        purpose: read_group(node, &path(group, "purpose"), read_concept),
        name: read_group(node, &path(group, "name"), read_name),
        telecom: read_groups(node, &path(group, "telecom"), read_telecom),
        address: read_group(node, &path(group, "address"), read_address),
    };
    (contact != OrganizationContact::default()).then_some(contact)
}

impl RecordForm for Organization {
    const KIND: RecordKind = RecordKind::Organization;

    fn to_tree(&self) -> QuestionnaireResponse {
        let mut items = Vec::new();
        push_bool(&mut items, "active", self.active);
        push_groups(&mut items, "identifier", &self.identifier, identifier_children);
        push_groups(&mut items, "type", &self.org_type, type_children);
        push_text(&mut items, "name", self.name.as_deref());
        push_texts(&mut items, "alias", &self.alias);
        push_groups(&mut items, "telecom", &self.telecom, telecom_children);
        push_groups(&mut items, "address", &self.address, address_children);
        push_reference(&mut items, "partOf", self.part_of.as_ref());
        push_groups(&mut items, "contact", &self.contact, contact_children);
        QuestionnaireResponse::new(items)
    }

    fn from_tree(tree: &QuestionnaireResponse) -> Self {
        Organization {
            id: None,
            meta: None,
            active: read_bool(tree, "active"),
            identifier: read_groups(tree, "identifier", read_identifier),
            org_type: read_groups(tree, "type", read_concept),
            name: read_text(tree, "name"),
            alias: read_texts(tree, "alias"),
            telecom: read_groups(tree, "telecom", read_telecom),
            address: read_groups(tree, "address", read_address),
            part_of: read_reference(tree, "partOf"),
            contact: read_groups(tree, "contact", read_contact),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::harness::{assert_matches_schema, assert_round_trip, assert_sparse};
    use crate::SchemaRegistry;
    use fhir::{
        Address, Coding, ContactPoint, ContactPointSystem, ContactPointUse, HumanName, Identifier,
        Reference,
    };
    use questionnaire::{ItemScope, TypedValue};

    fn sample() -> Organization {
        Organization {
            id: None,
            meta: None,
            active: Some(true),
            identifier: vec![Identifier {
                use_type: None,
                system: Some("https://fhir.nhs.uk/Id/ods-organization-code".into()),
                value: Some("RR8".into()),
            }],
            org_type: vec![CodeableConcept {
                coding: vec![Coding::new(
                    ORGANIZATION_TYPE_SYSTEM,
                    "prov",
                    "Healthcare Provider",
                )],
                text: Some("Acute trust".into()),
            }],
            name: Some("Leeds General Infirmary".into()),
            alias: vec!["LGI".into(), "The General".into()],
            telecom: vec![
                ContactPoint {
                    system: Some(ContactPointSystem::Phone),
                    value: Some("0113 243 2799".into()),
                    use_type: Some(ContactPointUse::Work),
                    rank: None,
                },
                ContactPoint {
                    system: Some(ContactPointSystem::Url),
                    value: Some("https://www.leedsth.nhs.uk".into()),
                    use_type: None,
                    rank: None,
                },
            ],
            address: vec![Address {
                line: vec!["Great George Street".into()],
                city: Some("Leeds".into()),
                postal_code: Some("LS1 3EX".into()),
                country: Some("GB".into()),
                ..Address::default()
            }],
            part_of: Some(Reference::to("Organization", "leeds-trust")),
            contact: vec![
                OrganizationContact {
                    purpose: Some(CodeableConcept::from_coding(Coding::new(
                        CONTACT_ENTITY_TYPE_SYSTEM,
                        "PRESS",
                        "Press",
                    ))),
                    name: Some(HumanName {
                        family: Some("Mensah".into()),
                        given: vec!["Kojo".into()],
                        ..HumanName::default()
                    }),
                    telecom: vec![ContactPoint {
                        system: Some(ContactPointSystem::Email),
                        value: Some("press@leedsth.example.org".into()),
                        use_type: None,
                        rank: None,
                    }],
                    address: None,
                },
                OrganizationContact {
                    purpose: Some(CodeableConcept::from_coding(Coding::new(
                        CONTACT_ENTITY_TYPE_SYSTEM,
                        "BILL",
                        "Billing",
                    ))),
                    name: None,
                    telecom: vec![ContactPoint {
                        system: Some(ContactPointSystem::Phone),
                        value: Some("0113 206 0000".into()),
                        use_type: None,
                        rank: None,
                    }],
                    address: Some(Address {
                        line: vec!["St James's University Hospital".into()],
                        city: Some("Leeds".into()),
                        ..Address::default()
                    }),
                },
            ],
        }
    }

    #[test]
    fn round_trips_full_record() {
        assert_round_trip(&sample());
    }

    #[test]
    fn empty_record_maps_to_empty_tree() {
        assert_sparse(&Organization::default());
    }

    #[test]
    fn forward_tree_matches_schema() {
        let registry = SchemaRegistry::load_embedded().expect("embedded schemas");
        assert_matches_schema(&sample().to_tree(), registry.get(RecordKind::Organization));
    }

    #[test]
    fn contact_telecom_is_scoped_to_its_contact() {
        let tree = sample().to_tree();

        let top_level: Vec<String> = tree
            .resolve("telecom")
            .iter()
            .filter_map(|g| g.text_at("telecom.value"))
            .collect();
        assert_eq!(top_level, vec!["0113 243 2799", "https://www.leedsth.nhs.uk"]);

        let contacts = tree.resolve("contact");
        assert_eq!(contacts.len(), 2);
        let press: Vec<String> = contacts[0]
            .resolve("contact.telecom")
            .iter()
            .filter_map(|g| g.text_at("contact.telecom.value"))
            .collect();
        assert_eq!(press, vec!["press@leedsth.example.org"]);
    }

    #[test]
    fn part_of_encodes_as_reference_only() {
        let mut record = sample();
        record.part_of = Some(Reference {
            reference: Some("Organization/leeds-trust".into()),
            display: Some("Leeds Teaching Hospitals".into()),
        });

        let tree = record.to_tree();
        let values = tree.values_at("partOf");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].as_text(), Some("Organization/leeds-trust"));
        assert!(matches!(values[0], TypedValue::Reference(_)));

        let rebuilt = Organization::from_tree(&tree);
        assert_eq!(rebuilt.part_of, Some(Reference::to("Organization", "leeds-trust")));
    }

    #[test]
    fn type_without_system_or_display_gets_defaults() {
        let record = Organization {
            org_type: vec![CodeableConcept::from_coding(Coding {
                system: None,
                code: Some("dept".into()),
                display: None,
            })],
            ..Organization::default()
        };

        let rebuilt = Organization::from_tree(&record.to_tree());
        assert_eq!(
            rebuilt.org_type,
            vec![CodeableConcept::from_coding(Coding::new(
                ORGANIZATION_TYPE_SYSTEM,
                "dept",
                "Dept"
            ))]
        );
        assert_eq!(rebuilt.to_tree(), record.to_tree());
    }
}
