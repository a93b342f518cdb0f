/// Optimistic write support
///
/// An optimistic mutation writes its expected outcome to the cache before the
/// request is sent and records an [`Undo`] describing how to take it back.
/// On failure the undo is applied in its own transaction.
///
/// ```text
/// record Undo ──► optimistic commit ──► request
///                                          │
///                      ┌── Ok ─────────────┴────────── Err ──┐
///                      ▼                                     ▼
///               reconcile with server copy          apply Undo (rollback)
/// ```

use taskdeck_shared::models::{EntityId, Project, ProjectScope, Task};
use tracing::{debug, warn};

use super::{lists, Transaction};

/// Merges a server project into the cached copy
///
/// List queries do not select the dashboard aggregates, so a missing
/// aggregate keeps the cached value.
pub fn merge_project(cached: Option<&Project>, incoming: Project) -> Project {
    match cached {
        Some(cached) => Project {
            task_count: incoming.task_count.or(cached.task_count),
            completion_rate: incoming.completion_rate.or(cached.completion_rate),
            ..incoming
        },
        None => incoming,
    }
}

/// Merges a server task into the cached copy
///
/// Comments are merged by id so provisional comments still waiting on their
/// append survive a refetch of the task.
pub fn merge_task(cached: Option<&Task>, incoming: Task) -> Task {
    match cached {
        Some(cached) => {
            let pending: Vec<_> = cached
                .comments
                .iter()
                .filter(|c| c.id.is_temporary())
                .cloned()
                .collect();
            Task {
                comments: lists::merge_by_id(&incoming.comments, &pending),
                ..incoming
            }
        }
        None => incoming,
    }
}

/// How to take back one optimistic write
#[derive(Debug, Clone, PartialEq)]
pub enum Undo {
    /// Remove a provisional task
    ///
    /// `list_was_loaded` is false when the append created the task list; the
    /// rollback then drops the list again if nothing else was added to it.
    RemoveTask {
        scope: ProjectScope,
        id: EntityId,
        list_was_loaded: bool,
    },

    /// Put back the task fields as they were before a patch
    RestoreTask { previous: Task },

    /// Put back a project as it was before an edit
    RestoreProject { previous: Project },

    /// Remove a provisional comment
    RemoveComment {
        task_id: EntityId,
        comment_id: EntityId,
    },
}

impl Undo {
    /// Applies the rollback; returns false if the target no longer exists
    ///
    /// A missing target is a no-op: a refetch or delete got there first.
    pub fn apply(self, tx: &mut Transaction) -> bool {
        let applied = match &self {
            Undo::RemoveTask {
                scope,
                id,
                list_was_loaded,
            } => {
                let removed = tx.remove_task(scope, id);
                if !list_was_loaded {
                    tx.drop_empty_task_list(scope);
                }
                removed
            }
            Undo::RestoreTask { previous } => match tx.state().task(&previous.id) {
                Some(current) => {
                    // comments appended meanwhile are not part of this write
                    let restored = Task {
                        comments: current.comments.clone(),
                        ..previous.clone()
                    };
                    tx.restore_task(restored);
                    true
                }
                None => false,
            },
            Undo::RestoreProject { previous } => {
                if tx.state().project(&previous.id).is_some() {
                    tx.restore_project(previous.clone());
                    true
                } else {
                    false
                }
            }
            Undo::RemoveComment {
                task_id,
                comment_id,
            } => tx.remove_comment(task_id, comment_id),
        };

        if applied {
            debug!(undo = ?self, "rolled back optimistic write");
        } else {
            warn!(undo = ?self, "rollback target no longer cached, skipping");
        }
        applied
    }
}
