//! Validated primitive types shared across the directory form crates.
//!
//! - [`NonEmptyText`]: trimmed text that is guaranteed to hold at least one character.
//! - [`LinkId`]: a dotted field path (`address.city`) addressing one field of a record
//!   relative to the record root.

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input was not a well-formed dotted field path
    #[error("invalid field path '{0}'")]
    InvalidPath(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err(TextError::Empty)` if the input is empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Like [`NonEmptyText::new`], but discards the error.
    ///
    /// Useful for optional fields where blank input simply means "absent".
    pub fn parse_optional(input: impl AsRef<str>) -> Option<Self> {
        Self::new(input).ok()
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A dotted field path such as `name`, `name.family` or `contact.telecom.value`.
///
/// Every segment must be non-empty and consist of ASCII alphanumerics, `-` or `_`.
/// A path is only meaningful relative to its owning group: `address.city` is the
/// `city` field of an `address` group, and is never looked up from the tree root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(String);

impl LinkId {
    /// Separator between path segments.
    pub const SEPARATOR: char = '.';

    /// Parses and validates a dotted field path.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input and [`TextError::InvalidPath`] when any
    /// segment is empty or contains characters outside `[A-Za-z0-9_-]`.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref().trim();
        if input.is_empty() {
            return Err(TextError::Empty);
        }

        let valid = input.split(Self::SEPARATOR).all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        });
        if !valid {
            return Err(TextError::InvalidPath(input.to_owned()));
        }

        Ok(Self(input.to_owned()))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the owning group's path, or `None` for a top-level field.
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once(Self::SEPARATOR).map(|(parent, _)| parent)
    }

    /// Returns the final segment (`city` for `address.city`).
    pub fn last_segment(&self) -> &str {
        self.0
            .rsplit_once(Self::SEPARATOR)
            .map_or(self.0.as_str(), |(_, last)| last)
    }

    /// Number of segments in the path.
    pub fn depth(&self) -> usize {
        self.0.split(Self::SEPARATOR).count()
    }

    /// Builds the path of a child field of this group.
    ///
    /// # Errors
    ///
    /// Returns [`TextError`] if `segment` is not a valid single path segment.
    pub fn child(&self, segment: &str) -> Result<Self, TextError> {
        if segment.contains(Self::SEPARATOR) {
            return Err(TextError::InvalidPath(segment.to_owned()));
        }
        Self::new(format!("{}{}{}", self.0, Self::SEPARATOR, segment))
    }

    /// Returns `true` when `self` is a direct child path of `group`.
    pub fn is_child_of(&self, group: &LinkId) -> bool {
        self.parent() == Some(group.as_str())
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LinkId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for LinkId {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for LinkId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for LinkId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LinkId::new(&s).map_err(serde::de::Error::custom)
    }
}
