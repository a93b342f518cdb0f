/// Remote data client
///
/// Issues typed operations through a [`Transport`] and keeps the
/// [`CacheStore`] in step with the results. Task creation, task updates,
/// project edits and comment appends are optimistic: the cache shows the
/// expected result while the request is in flight and is rolled back if the
/// request fails.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck_client::cache::CacheStore;
/// use taskdeck_client::client::DataClient;
/// use taskdeck_client::config::ClientConfig;
/// use taskdeck_client::transport::HttpTransport;
/// use taskdeck_shared::models::OrgScope;
///
/// # async fn example() -> anyhow::Result<()> {
/// let transport = HttpTransport::new(&ClientConfig::from_env()?)?;
/// let client = DataClient::new(Arc::new(transport), CacheStore::new());
///
/// let projects = client.projects(&OrgScope::new("acme")).await?;
/// println!("{} projects", projects.len());
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use taskdeck_shared::graphql::operations::{
    Comments, CommentsVariables, CreateProject, CreateProjectVariables, CreateTask,
    CreateTaskComment, CreateTaskCommentVariables, CreateTaskVariables, DeleteProject,
    DeleteProjectVariables, DeleteTask, DeleteTaskVariables, ProjectDetail, ProjectFields,
    ProjectSummaries, Projects, TaskPatch, Tasks, UpdateProject, UpdateProjectVariables,
    UpdateTask, UpdateTaskVariables,
};
use taskdeck_shared::graphql::Operation;
use taskdeck_shared::models::{
    Comment, EntityId, OrgScope, Project, ProjectScope, Task, TaskStatus,
};
use taskdeck_shared::validation::TaskInput;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, Undo};
use crate::error::{ClientError, ClientResult};
use crate::transport::Transport;

/// Typed GraphQL client backed by the normalized cache
#[derive(Clone)]
pub struct DataClient {
    transport: Arc<dyn Transport>,
    cache: CacheStore,
}

impl DataClient {
    pub fn new(transport: Arc<dyn Transport>, cache: CacheStore) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Sends one operation and validates the response shape
    pub async fn execute<O: Operation>(&self, variables: &O::Variables) -> ClientResult<O::Data> {
        let request = O::request(variables)?;
        debug!(operation = O::NAME, transport = self.transport.name(), "executing");

        let response = self.transport.execute(request).await.map_err(|e| {
            warn!(operation = O::NAME, error = %e, "transport failure");
            ClientError::from(e)
        })?;

        response.into_data::<O>().map_err(|e| {
            debug!(operation = O::NAME, error = %e, "operation failed");
            ClientError::from(e)
        })
    }

    fn rollback(&self, undo: Undo) {
        self.cache.update(|tx| undo.apply(tx));
    }

    // -- projects ---------------------------------------------------------

    /// Fetches an organization's projects and replaces the cached list
    pub async fn projects(&self, org: &OrgScope) -> ClientResult<Vec<Project>> {
        let data = self.execute::<Projects>(org).await?;
        self.cache.update(|tx| tx.set_project_list(org, data.projects.clone()));
        Ok(data.projects)
    }

    /// Fetches projects with their task aggregates for the dashboard
    pub async fn project_summaries(&self, org: &OrgScope) -> ClientResult<Vec<Project>> {
        let data = self.execute::<ProjectSummaries>(org).await?;
        self.cache.update(|tx| tx.set_project_list(org, data.projects.clone()));
        Ok(data.projects)
    }

    /// Fetches one project by slug
    pub async fn project(&self, scope: &ProjectScope) -> ClientResult<Project> {
        let data = self.execute::<ProjectDetail>(scope).await?;
        let project = data
            .project
            .ok_or_else(|| ClientError::NotFound(format!("Project {}", scope.project_slug)))?;
        self.cache.update(|tx| tx.put_project(project.clone()));
        Ok(project)
    }

    /// Creates a project and adds it to the organization's list once
    pub async fn create_project(&self, org: &OrgScope, fields: ProjectFields) -> ClientResult<Project> {
        let variables = CreateProjectVariables {
            scope: org.clone(),
            fields,
        };
        let project = self.execute::<CreateProject>(&variables).await?.create_project.project;

        info!(org = %org, project = %project.id, "project created");
        self.cache.update(|tx| tx.add_project(org, project.clone()));
        Ok(project)
    }

    /// Edits a project, showing the new fields while the request is in flight
    pub async fn update_project(
        &self,
        org: &OrgScope,
        id: &EntityId,
        fields: ProjectFields,
    ) -> ClientResult<Project> {
        if id.is_temporary() {
            return Err(ClientError::PendingEntity("Project".to_string()));
        }

        let undo = self.cache.update(|tx| {
            let previous = tx.state().project(id).cloned()?;
            tx.restore_project(Project {
                name: fields.name.clone(),
                description: fields.description.clone(),
                status: fields.status,
                due_date: fields.due_date,
                ..previous.clone()
            });
            Some(Undo::RestoreProject { previous })
        });

        let variables = UpdateProjectVariables {
            scope: org.clone(),
            project_id: id.clone(),
            fields,
        };

        match self.execute::<UpdateProject>(&variables).await {
            Ok(data) => {
                let project = data.update_project.project;
                self.cache.update(|tx| tx.put_project(project.clone()));
                Ok(project)
            }
            Err(err) => {
                if let Some(undo) = undo {
                    self.rollback(undo);
                }
                Err(err)
            }
        }
    }

    /// Deletes a project; the cache is only touched once the server agrees
    pub async fn delete_project(&self, org: &OrgScope, id: &EntityId) -> ClientResult<()> {
        if id.is_temporary() {
            return Err(ClientError::PendingEntity("Project".to_string()));
        }

        let variables = DeleteProjectVariables {
            scope: org.clone(),
            project_id: id.clone(),
        };
        let payload = self.execute::<DeleteProject>(&variables).await?.delete_project;
        if !payload.success {
            return Err(ClientError::Server("Project could not be deleted.".to_string()));
        }

        info!(org = %org, project = %id, "project deleted");
        self.cache.update(|tx| tx.remove_project(org, id));
        Ok(())
    }

    // -- tasks ------------------------------------------------------------

    /// Fetches a project's tasks and replaces the cached list
    pub async fn tasks(&self, scope: &ProjectScope) -> ClientResult<Vec<Task>> {
        let data = self.execute::<Tasks>(scope).await?;
        self.cache.update(|tx| tx.set_task_list(scope, data.tasks.clone()));
        Ok(data.tasks)
    }

    /// Creates a task from a checked form input
    ///
    /// A provisional task with a temporary id is appended to the board
    /// immediately and swapped for the server copy once it arrives.
    pub async fn create_task(&self, scope: &ProjectScope, input: &TaskInput) -> ClientResult<Task> {
        let status = input.status.unwrap_or_default();
        let provisional = Task {
            id: EntityId::temporary(),
            title: input.title.clone(),
            description: input.description.clone(),
            status,
            assignee_email: input.assignee_email.clone(),
            due_date: input.due_date,
            comments: Vec::new(),
        };
        let temporary = provisional.id.clone();

        let list_was_loaded = self.cache.update(|tx| {
            let loaded = tx.state().task_ids(scope).is_some();
            tx.append_task(scope, provisional);
            loaded
        });
        let undo = Undo::RemoveTask {
            scope: scope.clone(),
            id: temporary.clone(),
            list_was_loaded,
        };

        let variables = CreateTaskVariables {
            scope: scope.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            status,
            assignee_email: input.assignee_email.clone(),
            due_date: input.due_date,
        };

        match self.execute::<CreateTask>(&variables).await {
            Ok(data) => {
                let task = data.create_task.task;
                debug!(temporary = %temporary, id = %task.id, "task confirmed");
                self.cache.update(|tx| tx.confirm_task(scope, &temporary, task.clone()));
                Ok(task)
            }
            Err(err) => {
                self.rollback(undo);
                Err(err)
            }
        }
    }

    /// Applies a partial update to a task, optimistically
    pub async fn update_task(
        &self,
        scope: &ProjectScope,
        id: &EntityId,
        patch: TaskPatch,
    ) -> ClientResult<Task> {
        let task_id = numeric_task_id(id)?;

        if patch.is_empty() {
            return self
                .cache
                .snapshot()
                .task(id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("Task {}", id)));
        }

        let undo = self.cache.update(|tx| {
            let previous = tx.state().task(id).cloned()?;
            tx.restore_task(patch.apply(&previous));
            Some(Undo::RestoreTask { previous })
        });

        let variables = UpdateTaskVariables {
            scope: scope.clone(),
            task_id,
            patch,
        };

        match self.execute::<UpdateTask>(&variables).await {
            Ok(data) => {
                let task = data.update_task.task;
                self.cache.update(|tx| tx.put_task(task.clone()));
                Ok(task)
            }
            Err(err) => {
                if let Some(undo) = undo {
                    self.rollback(undo);
                }
                Err(err)
            }
        }
    }

    /// Moves a task to another board column
    pub async fn move_task(
        &self,
        scope: &ProjectScope,
        id: &EntityId,
        status: TaskStatus,
    ) -> ClientResult<Task> {
        self.update_task(scope, id, TaskPatch::status(status)).await
    }

    /// Deletes a task; the cache is only touched once the server agrees
    pub async fn delete_task(&self, scope: &ProjectScope, id: &EntityId) -> ClientResult<()> {
        let task_id = numeric_task_id(id)?;

        let variables = DeleteTaskVariables {
            scope: scope.clone(),
            task_id,
        };
        let payload = self.execute::<DeleteTask>(&variables).await?.delete_task;
        if !payload.success {
            return Err(ClientError::Server("Task could not be deleted.".to_string()));
        }

        self.cache.update(|tx| tx.remove_task(scope, id));
        Ok(())
    }

    // -- comments ---------------------------------------------------------

    /// Fetches a task's comments and merges them into the cached task
    pub async fn comments(&self, scope: &ProjectScope, task_id: &EntityId) -> ClientResult<Vec<Comment>> {
        let variables = CommentsVariables {
            scope: scope.clone(),
            task_id: numeric_task_id(task_id)?,
        };
        let comments = self.execute::<Comments>(&variables).await?.comments;
        self.cache.update(|tx| tx.merge_comments(task_id, comments.clone()));
        Ok(comments)
    }

    /// Appends a comment to a task, optimistically
    pub async fn add_comment(
        &self,
        scope: &ProjectScope,
        task_id: &EntityId,
        content: &str,
        author_email: &str,
    ) -> ClientResult<Comment> {
        let numeric_id = numeric_task_id(task_id)?;

        let provisional = Comment::provisional(content, author_email);
        let temporary = provisional.id.clone();
        let appended = self.cache.update(|tx| tx.append_comment(task_id, provisional));
        let undo = appended.then(|| Undo::RemoveComment {
            task_id: task_id.clone(),
            comment_id: temporary.clone(),
        });

        let variables = CreateTaskCommentVariables {
            scope: scope.clone(),
            task_id: numeric_id,
            content: content.to_string(),
            author_email: author_email.to_string(),
        };

        match self.execute::<CreateTaskComment>(&variables).await {
            Ok(data) => {
                let comment = data.create_task_comment.comment;
                self.cache
                    .update(|tx| tx.confirm_comment(task_id, &temporary, comment.clone()));
                Ok(comment)
            }
            Err(err) => {
                if let Some(undo) = undo {
                    self.rollback(undo);
                }
                Err(err)
            }
        }
    }
}

/// Numeric id for `taskId: Int!` arguments
fn numeric_task_id(id: &EntityId) -> ClientResult<i64> {
    if id.is_temporary() {
        return Err(ClientError::PendingEntity("Task".to_string()));
    }
    id.as_int()
        .ok_or_else(|| ClientError::MalformedResponse(format!("task id {} is not numeric", id)))
}
