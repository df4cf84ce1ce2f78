//! Location records: wards, clinics, rooms, vehicles and other places where care happens.

use crate::codes::{LocationMode, LocationStatus};
use crate::datatypes::{Address, CodeableConcept, ContactPoint, Meta, Reference};
use crate::resource::impl_resource;
use crate::NonEmptyText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NonEmptyText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LocationStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<LocationMode>,

    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub location_type: Vec<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// Physical form of the location (building, ward, room, vehicle, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_type: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Reference>,

    /// Another location this one is physically part of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Reference>,
}

/// WGS84 coordinates of a location.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl_resource!(Location, "Location");
