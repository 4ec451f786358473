//! Core types

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a mission in the hierarchy
    MissionId
);

string_id!(
    /// Identifier of one unit of operational data
    DatumId
);

/// Whether a mission aggregates children or consumes data directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionKind {
    /// Mission with no children; scored from usage facts
    Leaf,
    /// Mission scored as the mean of its children
    Composite,
}

/// One unit of operational data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalDatum {
    /// Datum identifier
    pub id: DatumId,
    /// Display name (optional)
    pub name: Option<String>,
}

impl OperationalDatum {
    /// Create an unnamed datum
    pub fn new(id: impl Into<DatumId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Create a datum with a display name
    pub fn named(id: impl Into<DatumId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    /// Name for reports, falling back to the identifier
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}
