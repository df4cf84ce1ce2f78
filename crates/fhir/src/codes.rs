//! Closed FHIR value sets and canonical code systems.
//!
//! Each closed value set is a Rust enum implementing [`CodedValue`]: it knows its canonical
//! system URI, the wire code of every member and a display text. On the wire these enums
//! are plain code strings (`"female"`, `"work"`).
//!
//! Open code systems (organisation type, role code, specialty, ...) are carried as
//! [`crate::CodeableConcept`]; for those only the canonical system URI is fixed here.

/// Canonical system for organisation types.
pub const ORGANIZATION_TYPE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/organization-type";

/// Canonical system for organisation contact purposes.
pub const CONTACT_ENTITY_TYPE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/contactentity-type";

/// Canonical system for location types.
pub const LOCATION_TYPE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-RoleCode";

/// Canonical system for location physical types.
pub const LOCATION_PHYSICAL_TYPE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/location-physical-type";

/// Canonical system for practitioner role codes.
pub const PRACTITIONER_ROLE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/practitioner-role";

/// Canonical system for practice specialties.
pub const SPECIALTY_SYSTEM: &str = "http://snomed.info/sct";

/// A member of a closed value set with a fixed canonical system.
pub trait CodedValue: Sized + Copy {
    /// Canonical code system URI.
    const SYSTEM: &'static str;

    /// Wire code.
    fn code(self) -> &'static str;

    /// Human-readable display text.
    fn display(self) -> &'static str;

    /// Parses a wire code. Codes are case-sensitive.
    fn from_code(code: &str) -> Option<Self>;
}

/// Derives display text for a code that has none by capitalising its first letter.
///
/// The code stays the value of record; this is only for legibility.
pub fn display_for_code(code: &str) -> String {
    let mut chars = code.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

macro_rules! coded_value {
    (
        $(#[$meta:meta])*
        $name:ident, system = $system:expr, {
            $( $(#[$vmeta:meta])* $variant:ident => ($code:literal, $display:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl CodedValue for $name {
            const SYSTEM: &'static str = $system;

            fn code(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            fn display(self) -> &'static str {
                match self {
                    $( $name::$variant => $display ),+
                }
            }

            fn from_code(code: &str) -> Option<Self> {
                match code {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let code = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_code(&code).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} code '{}'",
                        stringify!($name),
                        code
                    ))
                })
            }
        }
    };
}

coded_value!(
    /// Administrative gender of a person.
    AdministrativeGender, system = "http://hl7.org/fhir/administrative-gender", {
        Male => ("male", "Male"),
        Female => ("female", "Female"),
        Other => ("other", "Other"),
        Unknown => ("unknown", "Unknown"),
    }
);

coded_value!(
    /// Purpose of a human name.
    NameUse, system = "http://hl7.org/fhir/name-use", {
        Usual => ("usual", "Usual"),
        Official => ("official", "Official"),
        Temp => ("temp", "Temp"),
        Nickname => ("nickname", "Nickname"),
        Anonymous => ("anonymous", "Anonymous"),
        Old => ("old", "Old"),
        /// Name changed for marriage.
        Maiden => ("maiden", "Name changed for Marriage"),
    }
);

coded_value!(
    /// Purpose of an identifier.
    IdentifierUse, system = "http://hl7.org/fhir/identifier-use", {
        Usual => ("usual", "Usual"),
        Official => ("official", "Official"),
        Temp => ("temp", "Temp"),
        Secondary => ("secondary", "Secondary"),
        Old => ("old", "Old"),
    }
);

coded_value!(
    /// Telecommunications form of a contact point.
    ContactPointSystem, system = "http://hl7.org/fhir/contact-point-system", {
        Phone => ("phone", "Phone"),
        Fax => ("fax", "Fax"),
        Email => ("email", "Email"),
        Pager => ("pager", "Pager"),
        Url => ("url", "URL"),
        Sms => ("sms", "SMS"),
        Other => ("other", "Other"),
    }
);

coded_value!(
    /// Purpose of a contact point.
    ContactPointUse, system = "http://hl7.org/fhir/contact-point-use", {
        Home => ("home", "Home"),
        Work => ("work", "Work"),
        Temp => ("temp", "Temp"),
        Old => ("old", "Old"),
        Mobile => ("mobile", "Mobile"),
    }
);

coded_value!(
    /// Purpose of an address.
    AddressUse, system = "http://hl7.org/fhir/address-use", {
        Home => ("home", "Home"),
        Work => ("work", "Work"),
        Temp => ("temp", "Temporary"),
        Old => ("old", "Old / Incorrect"),
        Billing => ("billing", "Billing"),
    }
);

coded_value!(
    /// Postal, physical or both.
    AddressType, system = "http://hl7.org/fhir/address-type", {
        Postal => ("postal", "Postal"),
        Physical => ("physical", "Physical"),
        Both => ("both", "Postal & Physical"),
    }
);

coded_value!(
    /// Operational status of a location.
    LocationStatus, system = "http://hl7.org/fhir/location-status", {
        Active => ("active", "Active"),
        Suspended => ("suspended", "Suspended"),
        Inactive => ("inactive", "Inactive"),
    }
);

coded_value!(
    /// Whether a location is a specific instance or a class of locations.
    LocationMode, system = "http://hl7.org/fhir/location-mode", {
        Instance => ("instance", "Instance"),
        Kind => ("kind", "Kind"),
    }
);
