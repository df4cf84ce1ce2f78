//! Practitioner form mapping.
//!
//! Paths: `active`, `identifier.*`, `name.*`, `telecom.*`, `address.*`, `gender`,
//! `birthDate`. `identifier`, `name`, `telecom` and `address` repeat as sibling groups.

use super::common::*;
use super::{RecordForm, RecordKind};
use fhir::Practitioner;
use questionnaire::QuestionnaireResponse;

impl RecordForm for Practitioner {
    const KIND: RecordKind = RecordKind::Practitioner;

    fn to_tree(&self) -> QuestionnaireResponse {
        let mut items = Vec::new();
        push_bool(&mut items, "active", self.active);
        push_groups(&mut items, "identifier", &self.identifier, identifier_children);
        push_groups(&mut items, "name", &self.name, name_children);
        push_groups(&mut items, "telecom", &self.telecom, telecom_children);
        push_groups(&mut items, "address", &self.address, address_children);
        push_code(&mut items, "gender", self.gender);
        push_date(&mut items, "birthDate", self.birth_date.as_deref());
        QuestionnaireResponse::new(items)
    }

    fn from_tree(tree: &QuestionnaireResponse) -> Self {
        Practitioner {
            id: None,
            meta: None,
            active: read_bool(tree, "active"),
            identifier: read_groups(tree, "identifier", read_identifier),
            name: read_groups(tree, "name", read_name),
            telecom: read_groups(tree, "telecom", read_telecom),
            address: read_groups(tree, "address", read_address),
            gender: read_code(tree, "gender"),
            birth_date: read_text(tree, "birthDate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::harness::{assert_matches_schema, assert_round_trip, assert_sparse};
    use crate::SchemaRegistry;
    use fhir::{
        Address, AddressType, AddressUse, AdministrativeGender, ContactPoint, ContactPointSystem,
        ContactPointUse, HumanName, Identifier, IdentifierUse, Meta, NameUse, NonEmptyText,
    };
    use questionnaire::{AnswerNode, ItemScope, TypedValue};

    fn sample() -> Practitioner {
        Practitioner {
            id: None,
            meta: None,
            active: Some(true),
            identifier: vec![Identifier {
                use_type: Some(IdentifierUse::Official),
                system: Some("https://fhir.nhs.uk/Id/sds-user-id".into()),
                value: Some("G1234567".into()),
            }],
            name: vec![
                HumanName {
                    use_type: Some(NameUse::Official),
                    family: Some("Okafor".into()),
                    given: vec!["Ada".into(), "Ngozi".into()],
                    prefix: vec!["Dr".into()],
                    suffix: vec![],
                },
                HumanName {
                    use_type: Some(NameUse::Maiden),
                    family: Some("Eze".into()),
                    given: vec!["Ada".into()],
                    prefix: vec![],
                    suffix: vec![],
                },
            ],
            telecom: vec![
                ContactPoint {
                    system: Some(ContactPointSystem::Email),
                    value: Some("ada.okafor@example.org".into()),
                    use_type: Some(ContactPointUse::Work),
                    rank: Some(1),
                },
                ContactPoint {
                    system: Some(ContactPointSystem::Phone),
                    value: Some("+44 113 243 2799".into()),
                    use_type: Some(ContactPointUse::Mobile),
                    rank: Some(2),
                },
            ],
            address: vec![Address {
                use_type: Some(AddressUse::Work),
                address_type: Some(AddressType::Physical),
                line: vec!["Great George Street".into(), "Clarendon Wing".into()],
                city: Some("Leeds".into()),
                district: None,
                state: Some("West Yorkshire".into()),
                postal_code: Some("LS1 3EX".into()),
                country: Some("GB".into()),
            }],
            gender: Some(AdministrativeGender::Female),
            birth_date: Some("1980-04-12".into()),
        }
    }

    #[test]
    fn round_trips_full_record() {
        assert_round_trip(&sample());
    }

    #[test]
    fn id_and_meta_are_not_mapped() {
        let mut record = sample();
        record.id = Some(NonEmptyText::new("prac-001").expect("id"));
        record.meta = Some(Meta {
            version_id: Some("4".into()),
            last_updated: None,
        });

        assert_round_trip(&record);
        assert_eq!(record.to_tree(), sample().to_tree());
    }

    #[test]
    fn empty_record_maps_to_empty_tree() {
        assert_sparse(&Practitioner::default());
    }

    #[test]
    fn forward_tree_matches_schema() {
        let registry = SchemaRegistry::load_embedded().expect("embedded schemas");
        assert_matches_schema(&sample().to_tree(), registry.get(RecordKind::Practitioner));
    }

    #[test]
    fn repeated_identifiers_keep_source_order() {
        let record = Practitioner {
            identifier: ["A-1", "B-2", "C-3"]
                .into_iter()
                .map(|value| Identifier {
                    use_type: None,
                    system: None,
                    value: Some(value.into()),
                })
                .collect(),
            ..Practitioner::default()
        };

        let tree = record.to_tree();
        let groups = tree.resolve("identifier");
        assert_eq!(groups.len(), 3);
        assert_eq!(tree.items.len(), 3);

        let values: Vec<String> = groups
            .iter()
            .filter_map(|g| g.text_at("identifier.value"))
            .collect();
        assert_eq!(values, vec!["A-1", "B-2", "C-3"]);

        assert_eq!(Practitioner::from_tree(&tree).identifier, record.identifier);
    }

    #[test]
    fn given_names_share_one_leaf() {
        let tree = sample().to_tree();
        let name = tree.resolve("name")[0];
        let given = name.resolve_scalar("name.given").expect("given leaf");
        assert_eq!(given.values().len(), 2);
    }

    #[test]
    fn gender_emits_canonical_coding() {
        let tree = sample().to_tree();
        let coding = tree.coding_at("gender").expect("gender coding");
        assert_eq!(
            coding.system.as_deref(),
            Some("http://hl7.org/fhir/administrative-gender")
        );
        assert_eq!(coding.code(), Some("female"));
        assert_eq!(coding.display.as_deref(), Some("Female"));
    }

    #[test]
    fn reverse_ignores_blank_and_unknown_nodes() {
        let tree = QuestionnaireResponse::new(vec![
            AnswerNode::answered_empty("birthDate"),
            AnswerNode::string("nickname", "Ada"),
            AnswerNode::group(
                "name",
                vec![
                    AnswerNode::string("name.family", "  "),
                    AnswerNode::leaf("name.given", vec![TypedValue::Integer(7)]),
                ],
            ),
        ]);

        assert_eq!(Practitioner::from_tree(&tree), Practitioner::default());
    }

    #[test]
    fn edited_tree_maps_back() {
        let mut tree = sample().to_tree();
        let family = tree
            .items_mut()
            .iter_mut()
            .find(|n| n.link_id == "name")
            .and_then(|n| n.children_mut())
            .and_then(|children| children.iter_mut().find(|n| n.link_id == "name.family"))
            .and_then(|n| n.values_mut())
            .expect("family values");
        family[0] = TypedValue::String("Okafor-Eze".into());

        let record = Practitioner::from_tree(&tree);
        assert_eq!(record.name[0].family.as_deref(), Some("Okafor-Eze"));
        assert_eq!(record.name[1].family.as_deref(), Some("Eze"));
    }
}
