/// Task board view
///
/// Groups a project's tasks into one column per [`TaskStatus`], in the
/// order TODO, IN_PROGRESS, DONE. Within a column tasks keep list order.
/// Provisional tasks are marked until the server confirms them.

use async_trait::async_trait;
use std::fmt::Write as _;
use taskdeck_shared::models::{ProjectScope, Task, TaskStatus};

use super::{render_pending, View, ViewState};
use crate::cache::{CacheEvent, CacheKey, CacheState};
use crate::client::DataClient;

#[derive(Debug, Clone, PartialEq)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

/// Tasks of one project grouped by status
#[derive(Debug, Clone, PartialEq)]
pub struct TaskBoard {
    pub columns: Vec<BoardColumn>,
}

impl TaskBoard {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let columns = TaskStatus::ALL
            .iter()
            .map(|status| BoardColumn {
                status: *status,
                tasks: tasks.iter().filter(|t| t.status == *status).cloned().collect(),
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        self.columns
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.tasks.as_slice())
            .unwrap_or_default()
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct TaskBoardView {
    scope: ProjectScope,
}

impl TaskBoardView {
    pub fn new(scope: ProjectScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &ProjectScope {
        &self.scope
    }
}

#[async_trait]
impl View for TaskBoardView {
    type Data = TaskBoard;

    async fn load(&self, client: &DataClient) -> ViewState<TaskBoard> {
        ViewState::from_result(client.tasks(&self.scope).await).map(TaskBoard::from_tasks)
    }

    fn read(&self, cache: &CacheState) -> ViewState<TaskBoard> {
        match cache.tasks(&self.scope) {
            Some(tasks) => ViewState::Ready(TaskBoard::from_tasks(tasks)),
            None => ViewState::Loading,
        }
    }

    fn is_stale(&self, event: &CacheEvent) -> bool {
        event.affects(&CacheKey::TaskList(self.scope.clone()))
            || event.keys.iter().any(|k| matches!(k, CacheKey::Task(_)))
    }

    fn render(&self, state: &ViewState<TaskBoard>) -> String {
        if let Some(pending) = render_pending(state, "tasks") {
            return pending;
        }
        let Some(board) = state.data() else {
            return String::new();
        };

        let mut out = format!("Board: {}\n", self.scope);
        for column in &board.columns {
            let _ = writeln!(out, "\n{} ({})", column.status.label(), column.tasks.len());
            if column.tasks.is_empty() {
                out.push_str("  (empty)\n");
            }
            for task in &column.tasks {
                render_task(&mut out, task);
            }
        }
        out
    }
}

fn render_task(out: &mut String, task: &Task) {
    if task.is_provisional() {
        let _ = writeln!(out, "  [saving...] {}", task.title);
    } else {
        let _ = writeln!(out, "  [{}] {}", task.id, task.title);
    }

    if let Some(description) = &task.description {
        let _ = writeln!(out, "      {}", description);
    }

    let mut meta = Vec::new();
    if let Some(assignee) = &task.assignee_email {
        meta.push(format!("assignee: {}", assignee));
    }
    if let Some(due) = task.due_date {
        meta.push(format!("due: {}", due.format("%Y-%m-%d %H:%M")));
    }
    if !meta.is_empty() {
        let _ = writeln!(out, "      {}", meta.join("  "));
    }

    for comment in &task.comments {
        let pending = if comment.id.is_temporary() { " (sending)" } else { "" };
        let _ = writeln!(out, "      > {}: {}{}", comment.author_email, comment.content, pending);
    }
}
