/// Operations understood by the TaskDeck backend
///
/// Project operations are scoped by `organizationSlug`; task and comment
/// operations also by `projectSlug`. Mutations select the full entity so the
/// client cache can be updated without a follow-up fetch.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Operation, OperationKind};
use crate::models::{
    Comment, EntityId, OrgScope, Project, ProjectScope, ProjectStatus, Task, TaskStatus, User,
};

macro_rules! operation {
    ($name:ident, $kind:ident, $vars:ty, $data:ty, $doc:expr) => {
        #[doc = concat!("`", stringify!($name), "` ", stringify!($kind))]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Operation for $name {
            const NAME: &'static str = stringify!($name);
            const DOCUMENT: &'static str = $doc;
            const KIND: OperationKind = OperationKind::$kind;
            type Variables = $vars;
            type Data = $data;
        }
    };
}

/// Variables for operations without arguments
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables {}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

operation!(
    Me,
    Query,
    NoVariables,
    MeData,
    "query Me { me { id username email organization { id slug name } } }"
);

#[derive(Debug, Clone, Deserialize)]
pub struct MeData {
    #[serde(default)]
    pub me: Option<User>,
}

operation!(
    Login,
    Mutation,
    LoginVariables,
    LoginData,
    "mutation Login($username: String!, $password: String!) { \
     login(username: $username, password: $password) { \
     user { id username email organization { id slug name } } } }"
);

#[derive(Debug, Clone, Serialize)]
pub struct LoginVariables {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub login: LoginPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub user: Option<User>,
}

operation!(
    Signup,
    Mutation,
    SignupVariables,
    SignupData,
    "mutation Signup($username: String!, $password: String!, $organizationName: String!) { \
     signup(username: $username, password: $password, organizationName: $organizationName) { \
     user organization } }"
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupVariables {
    pub username: String,
    pub password: String,
    pub organization_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupData {
    pub signup: SignupPayload,
}

/// Signup answers with the created username and organization name
#[derive(Debug, Clone, Deserialize)]
pub struct SignupPayload {
    pub user: String,
    pub organization: String,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

operation!(
    Projects,
    Query,
    OrgScope,
    ProjectsData,
    "query Projects($organizationSlug: String!) { \
     projects(organizationSlug: $organizationSlug) { \
     id name slug description status dueDate } }"
);

operation!(
    ProjectSummaries,
    Query,
    OrgScope,
    ProjectsData,
    "query ProjectSummaries($organizationSlug: String!) { \
     projects(organizationSlug: $organizationSlug) { \
     id name slug description status dueDate taskCount completionRate } }"
);

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectsData {
    #[serde(default, deserialize_with = "crate::models::nullable_list")]
    pub projects: Vec<Project>,
}

operation!(
    ProjectDetail,
    Query,
    ProjectScope,
    ProjectDetailData,
    "query ProjectDetail($organizationSlug: String!, $projectSlug: String!) { \
     project(organizationSlug: $organizationSlug, projectSlug: $projectSlug) { \
     id name slug description status dueDate taskCount completionRate } }"
);

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDetailData {
    #[serde(default)]
    pub project: Option<Project>,
}

/// Editable project fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFields {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub due_date: Option<NaiveDate>,
}

operation!(
    CreateProject,
    Mutation,
    CreateProjectVariables,
    CreateProjectData,
    "mutation CreateProject($organizationSlug: String!, $name: String!, \
     $description: String, $status: String!, $dueDate: Date) { \
     createProject(organizationSlug: $organizationSlug, name: $name, \
     description: $description, status: $status, dueDate: $dueDate) { \
     project { id name slug description status dueDate } } }"
);

#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectVariables {
    #[serde(flatten)]
    pub scope: OrgScope,

    #[serde(flatten)]
    pub fields: ProjectFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectData {
    pub create_project: ProjectPayload,
}

operation!(
    UpdateProject,
    Mutation,
    UpdateProjectVariables,
    UpdateProjectData,
    "mutation UpdateProject($organizationSlug: String!, $projectId: ID!, $name: String!, \
     $description: String, $status: String!, $dueDate: Date) { \
     updateProject(organizationSlug: $organizationSlug, projectId: $projectId, name: $name, \
     description: $description, status: $status, dueDate: $dueDate) { \
     project { id name slug description status dueDate } } }"
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectVariables {
    #[serde(flatten)]
    pub scope: OrgScope,

    pub project_id: EntityId,

    #[serde(flatten)]
    pub fields: ProjectFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectData {
    pub update_project: ProjectPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPayload {
    pub project: Project,
}

operation!(
    DeleteProject,
    Mutation,
    DeleteProjectVariables,
    DeleteProjectData,
    "mutation DeleteProject($organizationSlug: String!, $projectId: ID!) { \
     deleteProject(organizationSlug: $organizationSlug, projectId: $projectId) { success } }"
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProjectVariables {
    #[serde(flatten)]
    pub scope: OrgScope,

    pub project_id: EntityId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProjectData {
    pub delete_project: DeletePayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletePayload {
    #[serde(default)]
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

operation!(
    Tasks,
    Query,
    ProjectScope,
    TasksData,
    "query Tasks($organizationSlug: String!, $projectSlug: String!) { \
     tasks(organizationSlug: $organizationSlug, projectSlug: $projectSlug) { \
     id title description status assigneeEmail dueDate \
     comments { id content authorEmail timestamp } } }"
);

#[derive(Debug, Clone, Deserialize)]
pub struct TasksData {
    #[serde(default, deserialize_with = "crate::models::nullable_list")]
    pub tasks: Vec<Task>,
}

operation!(
    CreateTask,
    Mutation,
    CreateTaskVariables,
    CreateTaskData,
    "mutation CreateTask($organizationSlug: String!, $projectSlug: String!, $title: String!, \
     $description: String, $status: String!, $assigneeEmail: String, $dueDate: DateTime) { \
     createTask(organizationSlug: $organizationSlug, projectSlug: $projectSlug, title: $title, \
     description: $description, status: $status, assigneeEmail: $assigneeEmail, dueDate: $dueDate) { \
     task { id title description status assigneeEmail dueDate \
     comments { id content authorEmail timestamp } } } }"
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskVariables {
    #[serde(flatten)]
    pub scope: ProjectScope,

    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_email: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskData {
    pub create_task: TaskPayload,
}

operation!(
    UpdateTask,
    Mutation,
    UpdateTaskVariables,
    UpdateTaskData,
    "mutation UpdateTask($organizationSlug: String!, $projectSlug: String!, $taskId: Int!, \
     $title: String, $description: String, $status: String, $assigneeEmail: String, \
     $dueDate: DateTime) { \
     updateTask(organizationSlug: $organizationSlug, projectSlug: $projectSlug, taskId: $taskId, \
     title: $title, description: $description, status: $status, \
     assigneeEmail: $assigneeEmail, dueDate: $dueDate) { \
     task { id title description status assigneeEmail dueDate \
     comments { id content authorEmail timestamp } } } }"
);

/// Partial task update; absent fields are left untouched by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Patch that only moves the task to another column
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch to a local copy
    pub fn apply(&self, task: &Task) -> Task {
        let mut patched = task.clone();
        if let Some(title) = &self.title {
            patched.title = title.clone();
        }
        if let Some(description) = &self.description {
            patched.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            patched.status = status;
        }
        if let Some(email) = &self.assignee_email {
            patched.assignee_email = Some(email.clone());
        }
        if let Some(due_date) = self.due_date {
            patched.due_date = Some(due_date);
        }
        patched
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskVariables {
    #[serde(flatten)]
    pub scope: ProjectScope,

    pub task_id: i64,

    #[serde(flatten)]
    pub patch: TaskPatch,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskData {
    pub update_task: TaskPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskPayload {
    pub task: Task,
}

operation!(
    DeleteTask,
    Mutation,
    DeleteTaskVariables,
    DeleteTaskData,
    "mutation DeleteTask($organizationSlug: String!, $projectSlug: String!, $taskId: Int!) { \
     deleteTask(organizationSlug: $organizationSlug, projectSlug: $projectSlug, taskId: $taskId) { \
     success } }"
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTaskVariables {
    #[serde(flatten)]
    pub scope: ProjectScope,

    pub task_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTaskData {
    pub delete_task: DeletePayload,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

operation!(
    Comments,
    Query,
    CommentsVariables,
    CommentsData,
    "query Comments($organizationSlug: String!, $projectSlug: String!, $taskId: Int!) { \
     comments(organizationSlug: $organizationSlug, projectSlug: $projectSlug, taskId: $taskId) { \
     id content authorEmail timestamp } }"
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsVariables {
    #[serde(flatten)]
    pub scope: ProjectScope,

    pub task_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentsData {
    #[serde(default, deserialize_with = "crate::models::nullable_list")]
    pub comments: Vec<Comment>,
}

operation!(
    CreateTaskComment,
    Mutation,
    CreateTaskCommentVariables,
    CreateTaskCommentData,
    "mutation CreateTaskComment($organizationSlug: String!, $projectSlug: String!, $taskId: Int!, \
     $content: String!, $authorEmail: String!) { \
     createTaskComment(organizationSlug: $organizationSlug, projectSlug: $projectSlug, \
     taskId: $taskId, content: $content, authorEmail: $authorEmail) { \
     comment { id content authorEmail timestamp } } }"
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskCommentVariables {
    #[serde(flatten)]
    pub scope: ProjectScope,

    pub task_id: i64,
    pub content: String,
    pub author_email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskCommentData {
    pub create_task_comment: CommentPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentPayload {
    pub comment: Comment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::GraphQLResponse;
    use serde_json::json;

    #[test]
    fn test_operation_names_match_documents() {
        assert!(Me::DOCUMENT.starts_with("query Me "));
        assert!(CreateTask::DOCUMENT.starts_with("mutation CreateTask("));
        assert!(CreateTaskComment::DOCUMENT.contains("createTaskComment("));
        assert_eq!(DeleteProject::KIND, OperationKind::Mutation);
        assert_eq!(ProjectSummaries::KIND, OperationKind::Query);
    }

    #[test]
    fn test_create_project_variables_are_flat() {
        let variables = CreateProjectVariables {
            scope: OrgScope::new("acme"),
            fields: ProjectFields {
                name: "Website".to_string(),
                description: None,
                status: ProjectStatus::OnHold,
                due_date: NaiveDate::from_ymd_opt(2025, 6, 30),
            },
        };

        let wire = serde_json::to_value(&variables).unwrap();
        assert_eq!(
            wire,
            json!({
                "organizationSlug": "acme",
                "name": "Website",
                "description": null,
                "status": "ON_HOLD",
                "dueDate": "2025-06-30"
            })
        );
    }

    #[test]
    fn test_update_task_omits_untouched_fields() {
        let variables = UpdateTaskVariables {
            scope: ProjectScope::new("acme", "website"),
            task_id: 7,
            patch: TaskPatch::status(TaskStatus::Done),
        };

        let wire = serde_json::to_value(&variables).unwrap();
        assert_eq!(
            wire,
            json!({
                "organizationSlug": "acme",
                "projectSlug": "website",
                "taskId": 7,
                "status": "DONE"
            })
        );
    }

    #[test]
    fn test_task_patch_apply() {
        let task = Task {
            id: EntityId::from(1),
            title: "Old".to_string(),
            description: None,
            status: TaskStatus::Todo,
            assignee_email: None,
            due_date: None,
            comments: Vec::new(),
        };

        let patch = TaskPatch {
            title: Some("New".to_string()),
            status: Some(TaskStatus::InProgress),
            ..TaskPatch::default()
        };

        let patched = patch.apply(&task);
        assert_eq!(patched.title, "New");
        assert_eq!(patched.status, TaskStatus::InProgress);
        assert_eq!(patched.id, task.id);
        assert!(!patch.is_empty());
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn test_create_comment_response() {
        let response = GraphQLResponse::data(json!({
            "createTaskComment": {
                "comment": {
                    "id": "31",
                    "content": "Ship it",
                    "authorEmail": "kp@example.com",
                    "timestamp": "2025-01-01T00:00:00+00:00"
                }
            }
        }));

        let data = response.into_data::<CreateTaskComment>().unwrap();
        assert_eq!(data.create_task_comment.comment.id, EntityId::from(31));
    }

    #[test]
    fn test_signup_response() {
        let response = GraphQLResponse::data(json!({
            "signup": { "user": "kp121", "organization": "Acme" }
        }));

        let data = response.into_data::<Signup>().unwrap();
        assert_eq!(data.signup.user, "kp121");
        assert_eq!(data.signup.organization, "Acme");
    }
}
