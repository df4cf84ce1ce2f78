//! `resourceType`-tagged record JSON.
//!
//! Every record kind implements [`Resource`], which provides JSON parse/render with a
//! `resourceType` check. Parse failures name the failing field path (for example
//! `telecom[1].system`) via `serde_path_to_error`.

use crate::datatypes::Meta;
use crate::{FhirError, FhirResult, NonEmptyText};
use serde::de::DeserializeOwned;
use serde::Serialize;

const RESOURCE_TYPE_KEY: &str = "resourceType";

/// A record kind with a FHIR resource type name.
pub trait Resource: Serialize + DeserializeOwned {
    /// FHIR resource type name (`"Practitioner"`, `"Organization"`, ...).
    const RESOURCE_TYPE: &'static str;

    /// Server-assigned logical id, absent before the first create.
    fn id(&self) -> Option<&NonEmptyText>;

    fn set_id(&mut self, id: Option<NonEmptyText>);

    fn meta(&self) -> Option<&Meta>;

    fn set_meta(&mut self, meta: Option<Meta>);

    /// Parse a record from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not a JSON object,
    /// - `resourceType` is missing or names another kind,
    /// - any field has an unexpected type or an unknown code.
    fn parse_json(json_text: &str) -> FhirResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json_text)?;
        Self::from_json_value(value)
    }

    /// Like [`Resource::parse_json`], from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`Resource::parse_json`].
    fn from_json_value(value: serde_json::Value) -> FhirResult<Self> {
        let serde_json::Value::Object(mut object) = value else {
            return Err(FhirError::InvalidInput(format!(
                "Expected a JSON object for {}",
                Self::RESOURCE_TYPE
            )));
        };

        match object.remove(RESOURCE_TYPE_KEY) {
            Some(serde_json::Value::String(kind)) if kind == Self::RESOURCE_TYPE => {}
            Some(other) => {
                return Err(FhirError::InvalidInput(format!(
                    "Expected resourceType '{}', got {}",
                    Self::RESOURCE_TYPE,
                    other
                )));
            }
            None => {
                return Err(FhirError::InvalidInput(format!(
                    "Missing resourceType (expected '{}')",
                    Self::RESOURCE_TYPE
                )));
            }
        }

        serde_path_to_error::deserialize(serde_json::Value::Object(object)).map_err(|err| {
            let path = err.path().to_string();
            let source = err.into_inner();
            FhirError::Translation(format!(
                "{} schema mismatch at {path}: {source}",
                Self::RESOURCE_TYPE
            ))
        })
    }

    /// Render the record as a `resourceType`-tagged JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialisation fails.
    fn to_json_value(&self) -> FhirResult<serde_json::Value> {
        let mut value = serde_json::to_value(self).map_err(|e| {
            FhirError::Translation(format!("Failed to serialise {}: {e}", Self::RESOURCE_TYPE))
        })?;

        match value.as_object_mut() {
            Some(object) => {
                object.insert(
                    RESOURCE_TYPE_KEY.to_owned(),
                    serde_json::Value::String(Self::RESOURCE_TYPE.to_owned()),
                );
            }
            None => {
                return Err(FhirError::Translation(format!(
                    "{} did not serialise to a JSON object",
                    Self::RESOURCE_TYPE
                )));
            }
        }

        Ok(value)
    }

    /// Render the record as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialisation fails.
    fn render_json(&self) -> FhirResult<String> {
        let value = self.to_json_value()?;
        serde_json::to_string_pretty(&value).map_err(|e| {
            FhirError::Translation(format!("Failed to serialise {}: {e}", Self::RESOURCE_TYPE))
        })
    }
}

/// Implements the id/meta accessors of [`Resource`] for a record with `id` and `meta` fields.
macro_rules! impl_resource {
    ($record:ty, $name:literal) => {
        impl $crate::resource::Resource for $record {
            const RESOURCE_TYPE: &'static str = $name;

            fn id(&self) -> Option<&$crate::NonEmptyText> {
                self.id.as_ref()
            }

            fn set_id(&mut self, id: Option<$crate::NonEmptyText>) {
                self.id = id;
            }

            fn meta(&self) -> Option<&$crate::datatypes::Meta> {
                self.meta.as_ref()
            }

            fn set_meta(&mut self, meta: Option<$crate::datatypes::Meta>) {
                self.meta = meta;
            }
        }
    };
}

pub(crate) use impl_resource;
