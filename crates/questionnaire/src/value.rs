//! Typed answer values.
//!
//! A [`TypedValue`] is a discriminated union: exactly one variant is populated. On the
//! wire each value is a single-key object named after its variant, for example
//! `{"valueString": "Smith"}` or `{"valueCoding": {"system": "...", "code": "female"}}`.

use serde::{Deserialize, Serialize};

/// One answer value held by a leaf node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
    #[serde(rename = "valueString")]
    String(String),
    #[serde(rename = "valueBoolean")]
    Boolean(bool),
    #[serde(rename = "valueInteger")]
    Integer(i64),
    #[serde(rename = "valueDecimal")]
    Decimal(f64),
    #[serde(rename = "valueDate")]
    Date(String),
    #[serde(rename = "valueDateTime")]
    DateTime(String),
    #[serde(rename = "valueTime")]
    Time(String),
    #[serde(rename = "valueUri")]
    Uri(String),
    #[serde(rename = "valueCoding")]
    Coding(Coding),
    #[serde(rename = "valueReference")]
    Reference(Reference),
    #[serde(rename = "valueQuantity")]
    Quantity(Quantity),
}

/// A `(system, code, display)` triple drawn from an external code system.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A pointer to another record, encoded as `"<Kind>/<id>"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    pub reference: String,
}

/// A measured amount with an optional unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Quantity {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Coding {
    /// Builds a fully populated coding.
    pub fn new(
        system: impl Into<String>,
        code: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            display: Some(display.into()),
        }
    }

    /// The code, if present and not blank.
    pub fn code(&self) -> Option<&str> {
        non_blank(self.code.as_deref())
    }
}

impl TypedValue {
    /// Returns the textual content of string-like values.
    ///
    /// Strings, dates, times, URIs and references are string-like. Codings, booleans,
    /// numbers and quantities are not.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::String(s)
            | TypedValue::Date(s)
            | TypedValue::DateTime(s)
            | TypedValue::Time(s)
            | TypedValue::Uri(s) => Some(s),
            TypedValue::Reference(r) => Some(&r.reference),
            _ => None,
        }
    }

    pub fn as_coding(&self) -> Option<&Coding> {
        match self {
            TypedValue::Coding(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of decimal and integer values.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            TypedValue::Decimal(d) => Some(*d),
            TypedValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// `true` when the value carries no usable content.
    ///
    /// Blank strings, codings without a code and non-finite numbers are blank.
    /// A recorded `false` is an answer, not a blank.
    pub fn is_blank(&self) -> bool {
        match self {
            TypedValue::Coding(c) => c.code().is_none(),
            TypedValue::Decimal(d) => !d.is_finite(),
            TypedValue::Quantity(q) => !q.value.is_finite(),
            TypedValue::Boolean(_) | TypedValue::Integer(_) => false,
            other => other.as_text().map_or(true, |s| s.trim().is_empty()),
        }
    }

    /// Short variant name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string",
            TypedValue::Boolean(_) => "boolean",
            TypedValue::Integer(_) => "integer",
            TypedValue::Decimal(_) => "decimal",
            TypedValue::Date(_) => "date",
            TypedValue::DateTime(_) => "dateTime",
            TypedValue::Time(_) => "time",
            TypedValue::Uri(_) => "uri",
            TypedValue::Coding(_) => "coding",
            TypedValue::Reference(_) => "reference",
            TypedValue::Quantity(_) => "quantity",
        }
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_use_single_key_wire_objects() {
        let value = TypedValue::String("Smith".into());
        let json = serde_json::to_string(&value).expect("serialise");
        assert_eq!(json, r#"{"valueString":"Smith"}"#);

        let coding: TypedValue = serde_json::from_str(
            r#"{"valueCoding":{"system":"http://hl7.org/fhir/administrative-gender","code":"female"}}"#,
        )
        .expect("parse coding");
        assert_eq!(
            coding.as_coding().and_then(Coding::code),
            Some("female")
        );
    }

    #[test]
    fn unknown_value_variant_is_rejected() {
        let err = serde_json::from_str::<TypedValue>(r#"{"valueAttachment":{}}"#)
            .expect_err("unknown variant");
        assert!(err.to_string().contains("valueAttachment"));
    }

    #[test]
    fn blankness_rules() {
        assert!(TypedValue::String("   ".into()).is_blank());
        assert!(TypedValue::Coding(Coding::default()).is_blank());
        assert!(!TypedValue::Boolean(false).is_blank());
        assert!(!TypedValue::Reference(Reference {
            reference: "Organization/1".into()
        })
        .is_blank());
    }

    #[test]
    fn text_view_covers_string_like_values() {
        let reference = TypedValue::Reference(Reference {
            reference: "Location/ward-7".into(),
        });
        assert_eq!(reference.as_text(), Some("Location/ward-7"));
        assert_eq!(TypedValue::Integer(3).as_text(), None);
        assert_eq!(TypedValue::Integer(3).as_decimal(), Some(3.0));
    }
}
