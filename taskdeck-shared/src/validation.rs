/// Form input validation
///
/// Each form in the client owns one of these input structs. Validation runs
/// locally before any request is built; a failing input never reaches the
/// transport. Failures are reported per field so forms can show inline
/// messages.
///
/// ```
/// use taskdeck_shared::validation::{FormInput, ProjectInput};
///
/// let input = ProjectInput { name: "   ".to_string(), ..ProjectInput::default() };
/// let errors = input.check().unwrap_err();
/// assert_eq!(errors.get("name"), Some("Project name is required"));
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationErrors};

use crate::graphql::operations::{ProjectFields, TaskPatch};
use crate::models::{Project, ProjectStatus, Task, TaskStatus};

/// Per-field validation messages, one per field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for a field, keeping the first one
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let field = field.to_string();
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            fields.add(field, message);
        }
        fields
    }
}

/// Shared behaviour of form inputs
pub trait FormInput: Validate + Clone + Default {
    /// Trims free text and drops empty optional values
    fn normalized(&self) -> Self;

    /// Normalizes, then validates; returns the normalized input on success
    fn check(&self) -> Result<Self, FieldErrors> {
        let input = self.normalized();
        input.validate().map_err(FieldErrors::from)?;
        Ok(input)
    }
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Login form fields
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl FormInput for LoginInput {
    fn normalized(&self) -> Self {
        Self {
            username: trimmed(&self.username),
            password: self.password.clone(),
        }
    }
}

/// Signup form fields
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct SignupInput {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Organization name is required"))]
    pub organization_name: String,
}

impl FormInput for SignupInput {
    fn normalized(&self) -> Self {
        Self {
            username: trimmed(&self.username),
            password: self.password.clone(),
            organization_name: trimmed(&self.organization_name),
        }
    }
}

/// Project form fields, used for both create and edit
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(required(message = "Status is required"))]
    pub status: Option<ProjectStatus>,

    pub due_date: Option<NaiveDate>,
}

impl Default for ProjectInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            status: Some(ProjectStatus::Active),
            due_date: None,
        }
    }
}

impl ProjectInput {
    /// Prefills the form from an existing project
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            status: Some(project.status),
            due_date: project.due_date,
        }
    }

    /// Mutation fields; call on a checked input
    pub fn fields(&self) -> ProjectFields {
        ProjectFields {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status.unwrap_or_default(),
            due_date: self.due_date,
        }
    }
}

impl FormInput for ProjectInput {
    fn normalized(&self) -> Self {
        Self {
            name: trimmed(&self.name),
            description: non_empty(&self.description),
            status: self.status,
            due_date: self.due_date,
        }
    }
}

/// Task form fields
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(required(message = "Status is required"))]
    pub status: Option<TaskStatus>,

    #[validate(email(message = "Assignee must be a valid email address"))]
    pub assignee_email: Option<String>,

    pub due_date: Option<DateTime<Utc>>,
}

impl Default for TaskInput {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            status: Some(TaskStatus::Todo),
            assignee_email: None,
            due_date: None,
        }
    }
}

impl TaskInput {
    /// Patch carrying every field set on this input
    pub fn patch(&self) -> TaskPatch {
        TaskPatch {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            status: self.status,
            assignee_email: self.assignee_email.clone(),
            due_date: self.due_date,
        }
    }

    /// Prefills the form from an existing task
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: Some(task.status),
            assignee_email: task.assignee_email.clone(),
            due_date: task.due_date,
        }
    }
}

impl FormInput for TaskInput {
    fn normalized(&self) -> Self {
        Self {
            title: trimmed(&self.title),
            description: non_empty(&self.description),
            status: self.status,
            assignee_email: non_empty(&self.assignee_email),
            due_date: self.due_date,
        }
    }
}

/// Comment box on a task card
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct CommentInput {
    #[validate(length(min = 1, message = "Comment cannot be empty"))]
    pub content: String,
}

impl FormInput for CommentInput {
    fn normalized(&self) -> Self {
        Self {
            content: trimmed(&self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginInput::default().check().unwrap_err();
        assert_eq!(errors.get("username"), Some("Username is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_login_trims_username_only() {
        let input = LoginInput {
            username: "  kp121 ".to_string(),
            password: " secret ".to_string(),
        };
        let checked = input.check().unwrap();
        assert_eq!(checked.username, "kp121");
        assert_eq!(checked.password, " secret ");
    }

    #[test]
    fn test_signup_requires_organization() {
        let input = SignupInput {
            username: "kp".to_string(),
            password: "pw".to_string(),
            organization_name: " ".to_string(),
        };
        let errors = input.check().unwrap_err();
        assert_eq!(errors.get("organization_name"), Some("Organization name is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_project_blank_name_rejected() {
        let input = ProjectInput {
            name: "   ".to_string(),
            ..ProjectInput::default()
        };
        let errors = input.check().unwrap_err();
        assert_eq!(errors.get("name"), Some("Project name is required"));
    }

    #[test]
    fn test_project_missing_status_rejected() {
        let input = ProjectInput {
            name: "Website".to_string(),
            status: None,
            ..ProjectInput::default()
        };
        let errors = input.check().unwrap_err();
        assert_eq!(errors.get("status"), Some("Status is required"));
    }

    #[test]
    fn test_project_defaults_and_fields() {
        let input = ProjectInput {
            name: " Website ".to_string(),
            description: Some("  ".to_string()),
            ..ProjectInput::default()
        };
        let checked = input.check().unwrap();
        let fields = checked.fields();
        assert_eq!(fields.name, "Website");
        assert_eq!(fields.description, None);
        assert_eq!(fields.status, ProjectStatus::Active);
    }

    #[test]
    fn test_task_defaults_to_todo() {
        assert_eq!(TaskInput::default().status, Some(TaskStatus::Todo));
    }

    #[test]
    fn test_task_rejects_invalid_assignee() {
        let input = TaskInput {
            title: "Draft brief".to_string(),
            assignee_email: Some("not-an-email".to_string()),
            ..TaskInput::default()
        };
        let errors = input.check().unwrap_err();
        assert_eq!(errors.get("assignee_email"), Some("Assignee must be a valid email address"));
    }

    #[test]
    fn test_task_empty_assignee_is_dropped() {
        let input = TaskInput {
            title: "Draft brief".to_string(),
            assignee_email: Some("".to_string()),
            ..TaskInput::default()
        };
        let checked = input.check().unwrap();
        assert_eq!(checked.assignee_email, None);
    }

    #[test]
    fn test_comment_blank_rejected() {
        let input = CommentInput {
            content: "\n  ".to_string(),
        };
        assert!(input.check().is_err());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Project name is required");
        errors.add("name", "ignored");
        errors.add("status", "Status is required");
        assert_eq!(
            errors.to_string(),
            "name: Project name is required; status: Status is required"
        );
    }
}
