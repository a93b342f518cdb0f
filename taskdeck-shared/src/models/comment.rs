/// Task comment model
///
/// Comments are append-only from the client's perspective: there is no edit
/// or delete operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::EntityId;
use super::Identified;

/// Comment attached to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Server ID, or a temporary ID while the append is in flight
    pub id: EntityId,

    /// Comment body
    pub content: String,

    /// Author email
    pub author_email: String,

    /// When the comment was written
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    /// Builds a provisional comment stamped with the current time
    pub fn provisional(content: impl Into<String>, author_email: impl Into<String>) -> Self {
        Self {
            id: EntityId::temporary(),
            content: content.into(),
            author_email: author_email.into(),
            timestamp: Utc::now(),
        }
    }
}

impl Identified for Comment {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
