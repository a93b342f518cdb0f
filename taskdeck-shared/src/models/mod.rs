/// Domain models for TaskDeck
///
/// These are the typed shapes of the entities the backend returns. They are
/// plain data: fetching and caching live in `taskdeck-client`.
///
/// # Models
///
/// - `id`: opaque entity identifiers, including temporary client IDs
/// - `scope`: organization and project scoping keys
/// - `user`: authenticated user and organization
/// - `project`: projects and their status
/// - `task`: board tasks and their status
/// - `comment`: append-only task comments

pub mod comment;
pub mod id;
pub mod project;
pub mod scope;
pub mod task;
pub mod user;

pub use comment::Comment;
pub use id::EntityId;
pub use project::{Project, ProjectStatus};
pub use scope::{OrgScope, ProjectScope};
pub use task::{Task, TaskStatus};
pub use user::{Organization, User};

/// Entities that carry an identity usable as a cache and merge key
pub trait Identified {
    fn id(&self) -> &EntityId;
}

impl Identified for EntityId {
    fn id(&self) -> &EntityId {
        self
    }
}

/// Graphene list fields are nullable; treat `null` as an empty list
pub(crate) fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    nullable(deserializer)
}

/// Defaulted fields may also arrive as an explicit `null`
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
