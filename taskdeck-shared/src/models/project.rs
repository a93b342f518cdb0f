/// Project model
///
/// Projects belong to exactly one organization and are addressed by a slug
/// that is unique within it. The slug is computed server side from the name.
///
/// # Status
///
/// ```text
/// ACTIVE | COMPLETED | ON_HOLD
/// ```
///
/// The dashboard query additionally selects `taskCount` and `completionRate`,
/// aggregates the backend derives from the project's tasks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::EntityId;
use super::Identified;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// Work in progress
    #[default]
    Active,

    /// Finished
    Completed,

    /// Paused
    OnHold,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Active,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::OnHold => "ON_HOLD",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "Active",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::OnHold => "On Hold",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(ProjectStatus::Active),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            "ON_HOLD" => Ok(ProjectStatus::OnHold),
            other => Err(format!("unknown project status: {}", other)),
        }
    }
}

/// Project as returned by project queries and mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: EntityId,

    /// Unique within the organization; empty when not selected
    #[serde(default, deserialize_with = "super::nullable")]
    pub slug: String,

    /// Display name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Lifecycle status
    #[serde(default, deserialize_with = "super::nullable")]
    pub status: ProjectStatus,

    /// Optional deadline
    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    /// Number of tasks (dashboard query only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_count: Option<i64>,

    /// Percentage of tasks in DONE (dashboard query only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
}

impl Identified for Project {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_status_round_trip_names() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
        }
        assert_eq!("on_hold".parse::<ProjectStatus>().unwrap(), ProjectStatus::OnHold);
        assert!("DONE".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_project_status_labels() {
        assert_eq!(ProjectStatus::OnHold.label(), "On Hold");
        assert_eq!(ProjectStatus::default(), ProjectStatus::Active);
    }

    #[test]
    fn test_project_deserializes_partial_selection() {
        let project: Project = serde_json::from_value(json!({
            "id": "1",
            "name": "Website",
            "description": "Relaunch",
            "taskCount": 4,
            "completionRate": 25.0
        }))
        .unwrap();

        assert_eq!(project.slug, "");
        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.task_count, Some(4));
        assert_eq!(project.completion_rate, Some(25.0));
    }

    #[test]
    fn test_project_null_slug_and_status() {
        let project: Project = serde_json::from_value(json!({
            "id": "3",
            "slug": null,
            "name": "Archive",
            "status": null
        }))
        .unwrap();

        assert_eq!(project.slug, "");
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[test]
    fn test_project_due_date() {
        let project: Project = serde_json::from_value(json!({
            "id": "2",
            "slug": "launch",
            "name": "Launch",
            "status": "ON_HOLD",
            "dueDate": "2025-03-01"
        }))
        .unwrap();

        assert_eq!(project.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(project.status, ProjectStatus::OnHold);
    }
}
