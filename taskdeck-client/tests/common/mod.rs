/// Common test utilities for integration tests
///
/// This module provides an in-process fake of the TaskDeck backend:
/// - GraphQL endpoint dispatching on `operationName`
/// - Cookie session set by login, required by every scoped operation
/// - Logout endpoint checking the anti-forgery header
/// - One-shot failure injection for rollback tests

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::{Mutex, MutexGuard};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use taskdeck_client::cache::CacheStore;
use taskdeck_client::client::DataClient;
use taskdeck_client::config::ClientConfig;
use taskdeck_client::session::SessionStore;
use taskdeck_client::transport::HttpTransport;
use taskdeck_shared::graphql::GraphQLRequest;

pub const USERNAME: &str = "kp121";
pub const PASSWORD: &str = "secret";
pub const EMAIL: &str = "kp121@example.com";
pub const ORG_SLUG: &str = "acme";

const SESSION_ID: &str = "session-kp121";
const CSRF_TOKEN: &str = "csrf-kp121";

/// In-memory backend data
#[derive(Debug, Default)]
pub struct BackendState {
    pub projects: Vec<JsonValue>,

    /// Tasks keyed by project slug
    pub tasks: HashMap<String, Vec<JsonValue>>,

    pub logged_in: bool,

    /// Operation name whose next request is answered with an error
    pub fail_next: Option<String>,

    /// Every operation received, in order
    pub operations: Vec<String>,

    /// `X-CSRFToken` header of every logout request
    pub logout_tokens: Vec<Option<String>>,

    next_id: u64,
}

impl BackendState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn tasks_mut(&mut self, vars: &JsonValue) -> Option<&mut Vec<JsonValue>> {
        let slug = vars["projectSlug"].as_str()?;
        self.tasks.get_mut(slug)
    }

    fn task_mut(&mut self, vars: &JsonValue) -> Option<&mut JsonValue> {
        let id = vars["taskId"].as_i64()?.to_string();
        self.tasks_mut(vars)?
            .iter_mut()
            .find(|t| t["id"].as_str() == Some(id.as_str()))
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// Fake backend listening on an ephemeral local port
pub struct FakeBackend {
    pub base_url: String,
    state: Shared,
}

impl FakeBackend {
    /// Starts the server on the current runtime
    pub async fn start() -> anyhow::Result<Self> {
        let state: Shared = Arc::new(Mutex::new(BackendState::default()));
        let app = Router::new()
            .route("/graphql/", post(graphql))
            .route("/logout/", post(logout))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            state,
        })
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock()
    }

    /// Makes the next request for `operation` fail with a server error
    pub fn fail_next(&self, operation: &str) {
        self.state.lock().fail_next = Some(operation.to_string());
    }

    /// Session store wired to this backend over HTTP
    pub fn session(&self) -> anyhow::Result<SessionStore> {
        let config = ClientConfig::for_base_url(self.base_url.clone())?;
        let transport = HttpTransport::new(&config)?;
        let client = DataClient::new(Arc::new(transport), CacheStore::new());
        Ok(SessionStore::new(client))
    }
}

async fn graphql(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(request): Json<GraphQLRequest>,
) -> Response {
    let mut backend = state.lock();
    dispatch(&mut backend, &headers, request)
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut backend = state.lock();
    let token = headers
        .get("x-csrftoken")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.logout_tokens.push(token.clone());

    if token.is_none() || token != cookie(&headers, "csrftoken") {
        return StatusCode::FORBIDDEN.into_response();
    }

    backend.logged_in = false;
    (
        AppendHeaders([(header::SET_COOKIE, "sessionid=; Path=/; Max-Age=0".to_string())]),
        StatusCode::OK,
    )
        .into_response()
}

fn dispatch(backend: &mut BackendState, headers: &HeaderMap, request: GraphQLRequest) -> Response {
    let operation = request.operation_name;
    let vars = request.variables;
    backend.operations.push(operation.clone());

    if backend.fail_next.as_deref() == Some(operation.as_str()) {
        backend.fail_next = None;
        return error(&format!("{} rejected", operation));
    }

    let authenticated =
        backend.logged_in && cookie(headers, "sessionid").as_deref() == Some(SESSION_ID);

    match operation.as_str() {
        "Login" if vars["username"] == USERNAME && vars["password"] == PASSWORD => {
            backend.logged_in = true;
            let cookies = AppendHeaders([
                (header::SET_COOKIE, format!("sessionid={}; Path=/; HttpOnly", SESSION_ID)),
                (header::SET_COOKIE, format!("csrftoken={}; Path=/", CSRF_TOKEN)),
            ]);
            (cookies, Json(json!({ "data": { "login": { "user": user() } } }))).into_response()
        }
        "Login" => error("Invalid username or password"),
        "Signup" => data(json!({
            "signup": { "user": vars["username"], "organization": vars["organizationName"] }
        })),
        "Me" if authenticated => data(json!({ "me": user() })),
        "Me" => Json(json!({ "data": { "me": null }, "errors": [{ "message": "Not logged in" }] }))
            .into_response(),
        _ if !authenticated => error("Not logged in"),
        _ if vars["organizationSlug"] != ORG_SLUG => error("Organization not found"),
        "Projects" | "ProjectSummaries" => {
            let projects: Vec<JsonValue> = backend
                .projects
                .iter()
                .map(|p| with_aggregates(p, &backend.tasks))
                .collect();
            data(json!({ "projects": projects }))
        }
        "ProjectDetail" => {
            let project = backend
                .projects
                .iter()
                .find(|p| p["slug"] == vars["projectSlug"])
                .map(|p| with_aggregates(p, &backend.tasks));
            data(json!({ "project": project }))
        }
        "CreateProject" => {
            let name = vars["name"].as_str().unwrap_or_default().to_string();
            let slug = name.trim().to_lowercase().replace(' ', "-");
            let project = json!({
                "id": backend.next_id(),
                "name": name,
                "slug": slug,
                "description": vars["description"],
                "status": vars["status"],
                "dueDate": vars["dueDate"],
            });
            backend.tasks.insert(slug, Vec::new());
            backend.projects.push(project.clone());
            data(json!({ "createProject": { "project": project } }))
        }
        "UpdateProject" => {
            let Some(project) = backend
                .projects
                .iter_mut()
                .find(|p| p["id"] == vars["projectId"])
            else {
                return error("Project not found");
            };
            for field in ["name", "description", "status", "dueDate"] {
                project[field] = vars[field].clone();
            }
            data(json!({ "updateProject": { "project": project.clone() } }))
        }
        "DeleteProject" => {
            let before = backend.projects.len();
            backend.projects.retain(|p| p["id"] != vars["projectId"]);
            data(json!({ "deleteProject": { "success": backend.projects.len() < before } }))
        }
        "Tasks" => match backend.tasks_mut(&vars) {
            Some(tasks) => data(json!({ "tasks": tasks.clone() })),
            None => error("Project not found"),
        },
        "CreateTask" => {
            let task = json!({
                "id": backend.next_id(),
                "title": vars["title"],
                "description": vars["description"],
                "status": vars["status"],
                "assigneeEmail": vars["assigneeEmail"],
                "dueDate": vars["dueDate"],
                "comments": [],
            });
            match backend.tasks_mut(&vars) {
                Some(tasks) => {
                    tasks.push(task.clone());
                    data(json!({ "createTask": { "task": task } }))
                }
                None => error("Project not found"),
            }
        }
        "UpdateTask" => {
            let Some(task) = backend.task_mut(&vars) else {
                return error("Task not found");
            };
            for field in ["title", "description", "status", "assigneeEmail", "dueDate"] {
                if !vars[field].is_null() {
                    task[field] = vars[field].clone();
                }
            }
            data(json!({ "updateTask": { "task": task.clone() } }))
        }
        "DeleteTask" => {
            let id = vars["taskId"].as_i64().map(|n| n.to_string());
            let Some(tasks) = backend.tasks_mut(&vars) else {
                return error("Project not found");
            };
            let before = tasks.len();
            tasks.retain(|t| t["id"].as_str() != id.as_deref());
            data(json!({ "deleteTask": { "success": tasks.len() < before } }))
        }
        "Comments" => match backend.task_mut(&vars) {
            Some(task) => data(json!({ "comments": task["comments"].clone() })),
            None => error("Task not found"),
        },
        "CreateTaskComment" => {
            let id = backend.next_id();
            let Some(task) = backend.task_mut(&vars) else {
                return error("Task not found");
            };
            let comment = json!({
                "id": id,
                "content": vars["content"],
                "authorEmail": vars["authorEmail"],
                "timestamp": chrono::Utc::now().to_rfc3339(),
            });
            if let Some(comments) = task["comments"].as_array_mut() {
                comments.push(comment.clone());
            }
            data(json!({ "createTaskComment": { "comment": comment } }))
        }
        other => error(&format!("Unknown operation {}", other)),
    }
}

fn user() -> JsonValue {
    json!({
        "id": "1",
        "username": USERNAME,
        "email": EMAIL,
        "organization": { "id": "1", "slug": ORG_SLUG, "name": "Acme" }
    })
}

/// Adds `taskCount` and `completionRate`; the rate is 0 without tasks
fn with_aggregates(project: &JsonValue, tasks: &HashMap<String, Vec<JsonValue>>) -> JsonValue {
    let list = project["slug"]
        .as_str()
        .and_then(|slug| tasks.get(slug))
        .map(Vec::as_slice)
        .unwrap_or_default();
    let done = list.iter().filter(|t| t["status"] == "DONE").count();
    let rate = if list.is_empty() {
        0.0
    } else {
        done as f64 / list.len() as f64 * 100.0
    };

    let mut project = project.clone();
    project["taskCount"] = json!(list.len());
    project["completionRate"] = json!(rate);
    project
}

fn data(data: JsonValue) -> Response {
    Json(json!({ "data": data })).into_response()
}

fn error(message: &str) -> Response {
    Json(json!({ "data": null, "errors": [{ "message": message }] })).into_response()
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}
