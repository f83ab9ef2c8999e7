//! Strongly-typed identifiers.
//!
//! IDs that need global uniqueness get a validated newtype instead of a bare
//! `String`/`Uuid`; everything else (feature ids, provider names) stays a
//! plain `String` since those are caller-supplied, human-chosen keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to define a strongly-typed ID newtype wrapper.
///
/// Generates: struct, `from_string()`, `as_str()`, Display, Serialize, Deserialize.
/// The `uuid` flag additionally generates `new()` (UUID v4) and `Default`.
macro_rules! define_id {
    ($name:ident, uuid) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn from_string(s: String) -> Result<Self, &'static str> {
                if s.is_empty() {
                    return Err(concat!(stringify!($name), " cannot be empty"));
                }
                Ok(Self(s))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(EventId, uuid);
define_id!(SubscriberId, uuid);
define_id!(RequestId, uuid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn from_string_rejects_empty() {
        assert!(RequestId::from_string(String::new()).is_err());
    }

    #[test]
    fn display_roundtrips_as_str() {
        let id = SubscriberId::new();
        assert_eq!(id.to_string(), id.as_str());
    }
}
