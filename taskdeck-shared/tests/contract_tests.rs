/// Contract tests against recorded backend payloads
///
/// Each test feeds a response body in the exact shape the backend produces
/// through the typed operation it answers, the way the client does.

use serde_json::json;
use taskdeck_shared::graphql::operations::{
    CreateTask, CreateTaskVariables, DeleteProject, Login, Projects, ProjectDetail,
    ProjectSummaries, Tasks,
};
use taskdeck_shared::graphql::{ContractError, GraphQLResponse, Operation};
use taskdeck_shared::models::{EntityId, OrgScope, ProjectScope, ProjectStatus, TaskStatus};
use taskdeck_shared::validation::{FormInput, TaskInput};

fn response(body: serde_json::Value) -> GraphQLResponse {
    serde_json::from_value(body).unwrap()
}

#[test]
fn test_project_list_with_nullable_fields() {
    let data = response(json!({
        "data": {
            "projects": [
                { "id": "1", "name": "Website", "slug": "website",
                  "description": null, "status": "ACTIVE", "dueDate": "2025-06-30" },
                { "id": "2", "name": "Mobile", "slug": "mobile",
                  "description": "iOS first", "status": "ON_HOLD", "dueDate": null }
            ]
        }
    }))
    .into_data::<Projects>()
    .unwrap();

    assert_eq!(data.projects.len(), 2);
    assert_eq!(data.projects[0].due_date.unwrap().to_string(), "2025-06-30");
    assert_eq!(data.projects[1].status, ProjectStatus::OnHold);
    assert_eq!(data.projects[1].description.as_deref(), Some("iOS first"));
    assert_eq!(data.projects[0].task_count, None);
}

#[test]
fn test_project_summaries_carry_aggregates() {
    let data = response(json!({
        "data": {
            "projects": [
                { "id": "1", "name": "Website", "slug": "website", "status": "ACTIVE",
                  "dueDate": null, "taskCount": 3, "completionRate": 33.33 },
                { "id": "2", "name": "Empty", "slug": "empty", "status": "ACTIVE",
                  "dueDate": null, "taskCount": 0, "completionRate": 0 }
            ]
        }
    }))
    .into_data::<ProjectSummaries>()
    .unwrap();

    assert_eq!(data.projects[0].task_count, Some(3));
    assert_eq!(data.projects[0].completion_rate, Some(33.33));
    assert_eq!(data.projects[1].completion_rate, Some(0.0));
}

#[test]
fn test_null_list_is_empty() {
    let data = response(json!({ "data": { "tasks": null } }))
        .into_data::<Tasks>()
        .unwrap();
    assert!(data.tasks.is_empty());
}

#[test]
fn test_missing_project_is_none() {
    let data = response(json!({ "data": { "project": null } }))
        .into_data::<ProjectDetail>()
        .unwrap();
    assert!(data.project.is_none());
}

#[test]
fn test_tasks_with_comments_and_numeric_ids() {
    let data = response(json!({
        "data": {
            "tasks": [{
                "id": 12,
                "title": "Write copy",
                "description": null,
                "status": "IN_PROGRESS",
                "assigneeEmail": "kp@example.com",
                "dueDate": "2025-07-01T09:00:00+00:00",
                "comments": [
                    { "id": "5", "content": "Started", "authorEmail": "kp@example.com",
                      "timestamp": "2025-06-01T12:30:00+00:00" }
                ]
            }]
        }
    }))
    .into_data::<Tasks>()
    .unwrap();

    let task = &data.tasks[0];
    assert_eq!(task.id, EntityId::from("12"));
    assert_eq!(task.id.as_int(), Some(12));
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.comments.len(), 1);
    assert_eq!(task.comments[0].author_email, "kp@example.com");
}

#[test]
fn test_create_task_request_from_form_input() {
    let input = TaskInput {
        title: "  Write copy ".to_string(),
        description: Some("   ".to_string()),
        assignee_email: Some("kp@example.com".to_string()),
        ..TaskInput::default()
    }
    .check()
    .unwrap();

    let variables = CreateTaskVariables {
        scope: ProjectScope::new("acme", "website"),
        title: input.title.clone(),
        description: input.description.clone(),
        status: input.status.unwrap_or_default(),
        assignee_email: input.assignee_email.clone(),
        due_date: input.due_date,
    };
    let request = CreateTask::request(&variables).unwrap();
    let wire = serde_json::to_value(&request).unwrap();

    assert_eq!(wire["operationName"], "CreateTask");
    assert_eq!(
        wire["variables"],
        json!({
            "organizationSlug": "acme",
            "projectSlug": "website",
            "title": "Write copy",
            "description": null,
            "status": "TODO",
            "assigneeEmail": "kp@example.com",
            "dueDate": null
        })
    );
}

#[test]
fn test_login_error_is_server_error() {
    let err = response(json!({
        "data": { "login": null },
        "errors": [{ "message": "Invalid username or password", "path": ["login"] }]
    }))
    .into_data::<Login>()
    .unwrap_err();

    assert_eq!(err, ContractError::Server("Invalid username or password".to_string()));
}

#[test]
fn test_wrong_shape_is_reported() {
    let err = response(json!({ "data": { "deleteProject": { "success": "yes" } } }))
        .into_data::<DeleteProject>()
        .unwrap_err();

    assert!(matches!(err, ContractError::Shape { operation: "DeleteProject", .. }));
}

#[test]
fn test_projects_request_scoped_by_organization() {
    let request = Projects::request(&OrgScope::new("acme")).unwrap();
    assert_eq!(request.variables, json!({ "organizationSlug": "acme" }));
    assert!(request.query.starts_with("query Projects("));
}
