/// Task model
///
/// Tasks belong to exactly one project and are shown on a three-column board.
/// There is no transition restriction between statuses: the board dropdown can
/// move a task from any column to any other.
///
/// # Status
///
/// ```text
/// TODO ⇄ IN_PROGRESS ⇄ DONE
/// ```
///
/// # Lifecycle
///
/// A task created from the board first exists in the client cache with a
/// temporary [`EntityId`] and is then reconciled to the server-assigned id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::comment::Comment;
use super::id::EntityId;
use super::Identified;

/// Board column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Board column order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    /// Column heading
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Counts toward a project's completion rate
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "TODO" | "TO_DO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// Task as returned by task queries and mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server ID, or a temporary ID while the create is in flight
    pub id: EntityId,

    /// Short summary
    pub title: String,

    /// Longer description
    #[serde(default)]
    pub description: Option<String>,

    /// Board column
    #[serde(default)]
    pub status: TaskStatus,

    /// Assignee, defaults to the creator's email
    #[serde(default)]
    pub assignee_email: Option<String>,

    /// Optional deadline
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    /// Comments in append order
    #[serde(default, deserialize_with = "super::nullable_list")]
    pub comments: Vec<Comment>,
}

impl Task {
    /// True while the task only exists in the local cache
    pub fn is_provisional(&self) -> bool {
        self.id.is_temporary()
    }
}

impl Identified for Task {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
