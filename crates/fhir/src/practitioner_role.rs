//! PractitionerRole records: what a practitioner does for an organisation, where and when.

use crate::datatypes::{CodeableConcept, ContactPoint, Identifier, Meta, Period, Reference};
use crate::resource::impl_resource;
use crate::NonEmptyText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PractitionerRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NonEmptyText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    /// Period during which the practitioner holds this role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<Reference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Reference>,

    /// Roles the practitioner may perform (doctor, nurse, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specialty: Vec<CodeableConcept>,

    /// Locations where the role is performed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

impl_resource!(PractitionerRole, "PractitionerRole");
