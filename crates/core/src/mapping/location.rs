//! Location form mapping.
//!
//! Paths: `status`, `name`, `alias`, `description`, `mode`, `type.*`, `telecom.*`,
//! `address.*` (single group), `physicalType.*`, `position.*`, `managingOrganization`,
//! `partOf`.

use super::common::*;
use super::{RecordForm, RecordKind};
use fhir::codes::{LOCATION_PHYSICAL_TYPE_SYSTEM, LOCATION_TYPE_SYSTEM};
use fhir::{CodeableConcept, Location, Position};
use questionnaire::{AnswerNode, QuestionnaireResponse};

fn type_children(group: &str, concept: &CodeableConcept) -> Vec<AnswerNode> {
    concept_children(group, concept, LOCATION_TYPE_SYSTEM)
}

fn physical_type_children(group: &str, concept: &CodeableConcept) -> Vec<AnswerNode> {
    concept_children(group, concept, LOCATION_PHYSICAL_TYPE_SYSTEM)
}

fn position_children(group: &str, position: &Position) -> Vec<AnswerNode> {
    let mut out = Vec::new();
    push_decimal(&mut out, &path(group, "longitude"), Some(position.longitude));
    push_decimal(&mut out, &path(group, "latitude"), Some(position.latitude));
    push_decimal(&mut out, &path(group, "altitude"), position.altitude);
    out
}

/// A position needs both coordinates; a partial one is dropped.
fn read_position(node: &AnswerNode, group: &str) -> Option<Position> {
    let longitude = read_decimal(node, &path(group, "longitude"));
    let latitude = read_decimal(node, &path(group, "latitude"));

    match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => Some(Position {
            longitude,
            latitude,
            altitude: read_decimal(node, &path(group, "altitude")),
        }),
        _ => {
            tracing::debug!(link_id = group, "position without both coordinates skipped");
            None
        }
    }
}

impl RecordForm for Location {
    const KIND: RecordKind = RecordKind::Location;

    fn to_tree(&self) -> QuestionnaireResponse {
        let mut items = Vec::new();
        push_code(&mut items, "status", self.status);
        push_text(&mut items, "name", self.name.as_deref());
        push_texts(&mut items, "alias", &self.alias);
        push_text(&mut items, "description", self.description.as_deref());
        push_code(&mut items, "mode", self.mode);
        push_groups(&mut items, "type", &self.location_type, type_children);
        push_groups(&mut items, "telecom", &self.telecom, telecom_children);
        push_group(&mut items, "address", self.address.as_ref(), address_children);
        push_group(
            &mut items,
            "physicalType",
            self.physical_type.as_ref(),
            physical_type_children,
        );
        push_group(&mut items, "position", self.position.as_ref(), position_children);
        push_reference(
            &mut items,
            "managingOrganization",
            self.managing_organization.as_ref(),
        );
        push_reference(&mut items, "partOf", self.part_of.as_ref());
        QuestionnaireResponse::new(items)
    }

    fn from_tree(tree: &QuestionnaireResponse) -> Self {
        Location {
            id: None,
            meta: None,
            status: read_code(tree, "status"),
            name: read_text(tree, "name"),
            alias: read_texts(tree, "alias"),
            description: read_text(tree, "description"),
            mode: read_code(tree, "mode"),
            location_type: read_groups(tree, "type", read_concept),
            telecom: read_groups(tree, "telecom", read_telecom),
            address: read_group(tree, "address", read_address),
            physical_type: read_group(tree, "physicalType", read_concept),
            position: read_group(tree, "position", read_position),
            managing_organization: read_reference(tree, "managingOrganization"),
            part_of: read_reference(tree, "partOf"),
        }
    }
}
