//! Explicit presence marker for event fields.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// A field read from a device line.
///
/// Devices routinely send partial events. Absent fields are kept as
/// [`Field::Missing`] instead of a default so that a missing score can never
/// be mistaken for a real reading of `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// The field was present with the expected type.
    Present(T),
    /// The field was absent from the line.
    Missing,
    /// The field was present but held an unexpected JSON type.
    Mistyped(Value),
}

impl<T> Field<T> {
    /// Returns the value if present.
    #[must_use]
    pub const fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing | Self::Mistyped(_) => None,
        }
    }

    /// Consumes the field, returning the value if present.
    #[must_use]
    pub fn into_present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing | Self::Mistyped(_) => None,
        }
    }

    /// Returns `true` for [`Field::Present`].
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns `true` for [`Field::Missing`].
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Self::Present(value)
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(value) => fmt::Display::fmt(value, f),
            Self::Missing => f.write_str("<missing>"),
            Self::Mistyped(raw) => write!(f, "<invalid {raw}>"),
        }
    }
}

// Missing fields are skipped by the containing struct; a mistyped field is
// written back as the raw value the device sent.
impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => value.serialize(serializer),
            Self::Missing => serializer.serialize_none(),
            Self::Mistyped(raw) => raw.serialize(serializer),
        }
    }
}
