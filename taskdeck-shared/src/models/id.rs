/// Entity identifiers
///
/// The backend hands out opaque identifiers. Graphene serializes `ID` fields
/// as strings while some arguments (`taskId: Int!`) want the numeric form, so
/// `EntityId` accepts both on the wire and keeps the string form internally.
///
/// Entities created optimistically carry a temporary identifier until the
/// server confirms them:
///
/// ```
/// use taskdeck_shared::models::EntityId;
///
/// let temp = EntityId::temporary();
/// assert!(temp.is_temporary());
/// assert_eq!(temp.as_int(), None);
///
/// let server = EntityId::from(42);
/// assert!(!server.is_temporary());
/// assert_eq!(server.as_int(), Some(42));
/// ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Prefix marking client-generated identifiers
pub const TEMPORARY_PREFIX: &str = "tmp-";

/// Opaque entity identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Wraps a server-assigned identifier
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    /// Generates a locally unique temporary identifier
    pub fn temporary() -> Self {
        EntityId(format!("{}{}", TEMPORARY_PREFIX, Uuid::new_v4()))
    }

    /// True for identifiers generated by [`EntityId::temporary`]
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_PREFIX)
    }

    /// Numeric form for `Int` arguments; `None` for temporary or non-numeric ids
    pub fn as_int(&self) -> Option<i64> {
        if self.is_temporary() {
            return None;
        }
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId(id)
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId(id.to_string())
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Number(i64),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Text(text) => Ok(EntityId(text)),
            Wire::Number(number) => Ok(EntityId::from(number)),
        }
    }
}
