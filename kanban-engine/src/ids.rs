//! Identifier types and the process-wide id generator
//!
//! Ids are ULIDs drawn from a single monotonic generator, so two entities
//! created within the same millisecond still get distinct, increasing ids.
//! Ids loaded from disk are accepted verbatim whatever their shape.

use crate::error::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{LazyLock, Mutex};
use ulid::{Generator, Ulid};

static GENERATOR: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

/// Produce the next ULID string.
///
/// The monotonic generator only fails when the random component overflows
/// within a single millisecond; a fresh random ULID is used in that case.
fn next_ulid() -> String {
    let mut generator = match GENERATOR.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    generator
        .generate()
        .unwrap_or_else(|_| Ulid::new())
        .to_string()
}

/// Issue a new raw id for the given entity kind.
pub fn new_id(kind: EntityKind) -> String {
    let id = next_ulid();
    tracing::trace!(%kind, %id, "issued id");
    id
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh id
            pub fn new() -> Self {
                Self(new_id($kind))
            }

            /// Wrap an existing id string
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// An empty id. Back-references hold this until relinked, which
            /// avoids drawing from the generator for every loaded entity.
            pub fn unlinked() -> Self {
                Self(String::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&$name> for $name {
            fn from(id: &$name) -> Self {
                id.clone()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifies a board
    BoardId,
    EntityKind::Board
);
define_id!(
    /// Identifies a column within a board
    ColumnId,
    EntityKind::Column
);
define_id!(
    /// Identifies a task within a column
    TaskId,
    EntityKind::Task
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_ulids() {
        let id = TaskId::new();
        assert_eq!(id.as_str().len(), 26);
        assert!(Ulid::from_string(id.as_str()).is_ok());
    }

    #[test]
    fn test_rapid_ids_do_not_collide() {
        let ids: Vec<TaskId> = (0..10_000).map(|_| TaskId::new()).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_rapid_ids_are_increasing() {
        let a = new_id(EntityKind::Column);
        let b = new_id(EntityKind::Column);
        assert!(b > a);
    }

    #[test]
    fn test_unlinked_is_empty() {
        assert!(ColumnId::unlinked().as_str().is_empty());
        assert_eq!(BoardId::unlinked(), BoardId::from_string(""));
    }

    #[test]
    fn test_legacy_ids_kept_verbatim() {
        let id = TaskId::from_string("item-1700000000000");
        assert_eq!(id.to_string(), "item-1700000000000");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"item-1700000000000\"");
    }
}
