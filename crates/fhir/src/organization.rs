//! Organization records: hospitals, departments, practices, payers and similar groupings.

use crate::datatypes::{Address, CodeableConcept, ContactPoint, HumanName, Identifier, Meta, Reference};
use crate::resource::impl_resource;
use crate::NonEmptyText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NonEmptyText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    /// Kind of organisation (provider, department, payer, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub org_type: Vec<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Other names the organisation is known by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    /// The organisation this one is part of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<OrganizationContact>,
}

/// A contact party for an organisation (billing desk, press office, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl_resource!(Organization, "Organization");
