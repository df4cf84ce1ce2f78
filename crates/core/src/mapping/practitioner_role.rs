//! PractitionerRole form mapping.
//!
//! Paths: `active`, `identifier.*`, `period.*`, `practitioner`, `organization`,
//! `code.*`, `specialty.*`, `location`, `telecom.*`. `location` is one leaf holding every
//! location reference in order.

use super::common::*;
use super::{RecordForm, RecordKind};
use fhir::codes::{PRACTITIONER_ROLE_SYSTEM, SPECIALTY_SYSTEM};
use fhir::{CodeableConcept, PractitionerRole};
use questionnaire::{AnswerNode, QuestionnaireResponse};

fn code_children(group: &str, concept: &CodeableConcept) -> Vec<AnswerNode> {
    concept_children(group, concept, PRACTITIONER_ROLE_SYSTEM)
}

fn specialty_children(group: &str, concept: &CodeableConcept) -> Vec<AnswerNode> {
    concept_children(group, concept, SPECIALTY_SYSTEM)
}

impl RecordForm for PractitionerRole {
    const KIND: RecordKind = RecordKind::PractitionerRole;

    fn to_tree(&self) -> QuestionnaireResponse {
        let mut items = Vec::new();
        push_bool(&mut items, "active", self.active);
        push_groups(&mut items, "identifier", &self.identifier, identifier_children);
        push_group(&mut items, "period", self.period.as_ref(), period_children);
        push_reference(&mut items, "practitioner", self.practitioner.as_ref());
        push_reference(&mut items, "organization", self.organization.as_ref());
        push_groups(&mut items, "code", &self.code, code_children);
        push_groups(&mut items, "specialty", &self.specialty, specialty_children);
        push_references(&mut items, "location", &self.location);
        push_groups(&mut items, "telecom", &self.telecom, telecom_children);
        QuestionnaireResponse::new(items)
    }

    fn from_tree(tree: &QuestionnaireResponse) -> Self {
        PractitionerRole {
            id: None,
            meta: None,
            active: read_bool(tree, "active"),
            identifier: read_groups(tree, "identifier", read_identifier),
            period: read_group(tree, "period", read_period),
            practitioner: read_reference(tree, "practitioner"),
            organization: read_reference(tree, "organization"),
            code: read_groups(tree, "code", read_concept),
            specialty: read_groups(tree, "specialty", read_concept),
            location: read_references(tree, "location"),
            telecom: read_groups(tree, "telecom", read_telecom),
        }
    }
}
