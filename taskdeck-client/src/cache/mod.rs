/// Normalized client cache
///
/// Entities are stored once, keyed by [`EntityId`]; lists hold ids only and
/// are keyed by their scope. Views read an immutable [`CacheState`] snapshot.
/// Writers go through [`CacheStore::transaction`], which applies a closure to
/// a private copy and swaps it in only if the closure succeeds.
///
/// ```text
/// projects:       id -> Project
/// project_lists:  org slug -> [id]
/// tasks:          id -> Task
/// task_lists:     (org slug, project slug) -> [id]
/// ```
///
/// Every commit bumps the revision and broadcasts a [`CacheEvent`] naming the
/// keys it touched, so subscribed views know when to re-read.
///
/// # Example
///
/// ```
/// use taskdeck_client::cache::CacheStore;
/// use taskdeck_shared::models::{OrgScope, Project};
///
/// let cache = CacheStore::new();
/// let org = OrgScope::new("acme");
/// let project: Project = serde_json::from_value(serde_json::json!({
///     "id": "1", "slug": "website", "name": "Website", "status": "ACTIVE"
/// })).unwrap();
///
/// cache.update(|tx| tx.set_project_list(&org, vec![project]));
///
/// assert_eq!(cache.snapshot().projects(&org).map(|p| p.len()), Some(1));
/// assert_eq!(cache.revision(), 1);
/// ```

pub mod lists;
pub mod optimistic;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use taskdeck_shared::models::{Comment, EntityId, OrgScope, Project, ProjectScope, Task, User};
use tokio::sync::broadcast;
use tracing::debug;

pub use optimistic::Undo;

const EVENT_CAPACITY: usize = 256;

/// Cache entry touched by a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Current user
    Session,

    /// Project list of one organization
    ProjectList(OrgScope),

    /// A single project
    Project(EntityId),

    /// Task list of one project
    TaskList(ProjectScope),

    /// A single task, including its comments
    Task(EntityId),

    /// Everything; emitted by [`CacheStore::reset`]
    All,
}

/// Broadcast after every commit that changed something
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEvent {
    pub revision: u64,
    pub keys: Vec<CacheKey>,
}

impl CacheEvent {
    /// True if a view reading `key` should re-read
    pub fn affects(&self, key: &CacheKey) -> bool {
        self.keys.iter().any(|k| k == key || *k == CacheKey::All)
    }
}

/// Immutable view of the cache at one revision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheState {
    revision: u64,
    user: Option<User>,
    projects: HashMap<EntityId, Project>,
    project_lists: HashMap<OrgScope, Vec<EntityId>>,
    tasks: HashMap<EntityId, Task>,
    task_lists: HashMap<ProjectScope, Vec<EntityId>>,
}

impl CacheState {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn project(&self, id: &EntityId) -> Option<&Project> {
        self.projects.get(id)
    }

    /// Looks a project up by slug within one organization's list
    pub fn project_by_slug(&self, org: &OrgScope, slug: &str) -> Option<&Project> {
        self.project_lists
            .get(org)?
            .iter()
            .filter_map(|id| self.projects.get(id))
            .find(|p| p.slug == slug)
    }

    /// Projects of an organization in list order; `None` until first loaded
    pub fn projects(&self, org: &OrgScope) -> Option<Vec<Project>> {
        let ids = self.project_lists.get(org)?;
        Some(ids.iter().filter_map(|id| self.projects.get(id)).cloned().collect())
    }

    /// Project ids of an organization in list order
    pub fn project_ids(&self, org: &OrgScope) -> Option<&[EntityId]> {
        self.project_lists.get(org).map(Vec::as_slice)
    }

    pub fn task(&self, id: &EntityId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Tasks of a project in list order; `None` until first loaded
    pub fn tasks(&self, scope: &ProjectScope) -> Option<Vec<Task>> {
        let ids = self.task_lists.get(scope)?;
        Some(ids.iter().filter_map(|id| self.tasks.get(id)).cloned().collect())
    }

    /// Task ids of a project in list order
    pub fn task_ids(&self, scope: &ProjectScope) -> Option<&[EntityId]> {
        self.task_lists.get(scope).map(Vec::as_slice)
    }

    /// True if `id` is referenced by any project list
    pub fn project_listed(&self, id: &EntityId) -> bool {
        self.project_lists.values().any(|ids| lists::contains(ids, id))
    }

    /// True if `id` is referenced by any task list
    pub fn task_listed(&self, id: &EntityId) -> bool {
        self.task_lists.values().any(|ids| lists::contains(ids, id))
    }
}

/// Pending write against a private copy of the state
///
/// Obtained from [`CacheStore::transaction`]. All list rewrites use the pure
/// functions in [`lists`].
pub struct Transaction {
    state: CacheState,
    touched: Vec<CacheKey>,
}

impl Transaction {
    fn new(state: CacheState) -> Self {
        Self {
            state,
            touched: Vec::new(),
        }
    }

    /// State as modified so far
    pub fn state(&self) -> &CacheState {
        &self.state
    }

    fn touch(&mut self, key: CacheKey) {
        if !self.touched.contains(&key) {
            self.touched.push(key);
        }
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.state.user = user;
        self.touch(CacheKey::Session);
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.state = CacheState {
            revision: self.state.revision,
            ..CacheState::default()
        };
        self.touch(CacheKey::All);
    }

    // -- projects ---------------------------------------------------------

    /// Writes a project, merging it with the cached copy
    pub fn put_project(&mut self, project: Project) {
        let merged = optimistic::merge_project(self.state.projects.get(&project.id), project);
        self.touch(CacheKey::Project(merged.id.clone()));
        self.state.projects.insert(merged.id.clone(), merged);
    }

    /// Overwrites a project exactly, without merging
    pub fn restore_project(&mut self, project: Project) {
        self.touch(CacheKey::Project(project.id.clone()));
        self.state.projects.insert(project.id.clone(), project);
    }

    /// Replaces an organization's list with a server result
    pub fn set_project_list(&mut self, org: &OrgScope, projects: Vec<Project>) {
        let ids: Vec<EntityId> = projects.iter().map(|p| p.id.clone()).collect();
        for project in projects {
            self.put_project(project);
        }
        self.state
            .project_lists
            .insert(org.clone(), lists::merge_by_id(&[], &ids));
        self.touch(CacheKey::ProjectList(org.clone()));
    }

    /// Adds a project to an organization's list exactly once
    ///
    /// A list that was never loaded stays unloaded: the next fetch brings the
    /// project in with everything else.
    pub fn add_project(&mut self, org: &OrgScope, project: Project) {
        let id = project.id.clone();
        self.put_project(project);
        if let Some(ids) = self.state.project_lists.get(org) {
            let updated = lists::append(ids, id);
            self.state.project_lists.insert(org.clone(), updated);
            self.touch(CacheKey::ProjectList(org.clone()));
        }
    }

    /// Removes a project from the organization and drops its task list
    pub fn remove_project(&mut self, org: &OrgScope, id: &EntityId) {
        let removed = self.state.projects.remove(id);
        self.touch(CacheKey::Project(id.clone()));

        if let Some(ids) = self.state.project_lists.get(org) {
            let updated = lists::remove_by_id(ids, id);
            self.state.project_lists.insert(org.clone(), updated);
            self.touch(CacheKey::ProjectList(org.clone()));
        }

        if let Some(project) = removed {
            let scope = org.project(project.slug);
            if let Some(task_ids) = self.state.task_lists.remove(&scope) {
                for task_id in &task_ids {
                    self.state.tasks.remove(task_id);
                }
                self.touch(CacheKey::TaskList(scope));
            }
        }
    }

    // -- tasks ------------------------------------------------------------

    /// Writes a task, merging it with the cached copy
    pub fn put_task(&mut self, task: Task) {
        let merged = optimistic::merge_task(self.state.tasks.get(&task.id), task);
        self.touch(CacheKey::Task(merged.id.clone()));
        self.state.tasks.insert(merged.id.clone(), merged);
    }

    /// Overwrites a task exactly, without merging
    pub fn restore_task(&mut self, task: Task) {
        self.touch(CacheKey::Task(task.id.clone()));
        self.state.tasks.insert(task.id.clone(), task);
    }

    /// Replaces a project's task list with a server result
    ///
    /// Provisional tasks still waiting on their create stay at the end of
    /// the list.
    pub fn set_task_list(&mut self, scope: &ProjectScope, tasks: Vec<Task>) {
        let mut ids: Vec<EntityId> = tasks.iter().map(|t| t.id.clone()).collect();
        if let Some(current) = self.state.task_lists.get(scope) {
            let pending: Vec<EntityId> = current.iter().filter(|id| id.is_temporary()).cloned().collect();
            ids = lists::merge_by_id(&ids, &pending);
        }
        for task in tasks {
            self.put_task(task);
        }
        self.state
            .task_lists
            .insert(scope.clone(), lists::merge_by_id(&[], &ids));
        self.touch(CacheKey::TaskList(scope.clone()));
    }

    /// Appends a task to a project's list
    pub fn append_task(&mut self, scope: &ProjectScope, task: Task) {
        let id = task.id.clone();
        self.put_task(task);
        let current = self.state.task_lists.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let updated = lists::append(current, id);
        self.state.task_lists.insert(scope.clone(), updated);
        self.touch(CacheKey::TaskList(scope.clone()));
    }

    /// Swaps a provisional task for the server copy, in place
    pub fn confirm_task(&mut self, scope: &ProjectScope, temporary: &EntityId, task: Task) {
        let id = task.id.clone();
        self.state.tasks.remove(temporary);
        self.touch(CacheKey::Task(temporary.clone()));
        self.put_task(task);

        let current = self.state.task_lists.get(scope).map(Vec::as_slice).unwrap_or(&[]);
        let updated = if lists::contains(current, temporary) {
            lists::replace_by_id(current, temporary, id)
        } else {
            lists::append(current, id)
        };
        self.state.task_lists.insert(scope.clone(), updated);
        self.touch(CacheKey::TaskList(scope.clone()));
    }

    /// Removes a task from its project's list and the entity table
    ///
    /// Returns false if the task was not cached.
    pub fn remove_task(&mut self, scope: &ProjectScope, id: &EntityId) -> bool {
        let existed = self.state.tasks.remove(id).is_some();
        self.touch(CacheKey::Task(id.clone()));

        if let Some(ids) = self.state.task_lists.get(scope) {
            let listed = lists::contains(ids, id);
            let updated = lists::remove_by_id(ids, id);
            self.state.task_lists.insert(scope.clone(), updated);
            self.touch(CacheKey::TaskList(scope.clone()));
            return existed || listed;
        }
        existed
    }

    /// Forgets a project's task list if it is empty
    ///
    /// The next read of the board is `None` again, as if never fetched.
    pub fn drop_empty_task_list(&mut self, scope: &ProjectScope) -> bool {
        let empty = self.state.task_lists.get(scope).is_some_and(Vec::is_empty);
        if empty {
            self.state.task_lists.remove(scope);
            self.touch(CacheKey::TaskList(scope.clone()));
        }
        empty
    }

    // -- comments ---------------------------------------------------------

    /// Applies `rewrite` to a task's comment list; false if the task is gone
    fn rewrite_comments<F>(&mut self, task_id: &EntityId, rewrite: F) -> bool
    where
        F: FnOnce(&[Comment]) -> Vec<Comment>,
    {
        let Some(task) = self.state.tasks.get(task_id) else {
            return false;
        };
        let updated = Task {
            comments: rewrite(&task.comments),
            ..task.clone()
        };
        self.state.tasks.insert(task_id.clone(), updated);
        self.touch(CacheKey::Task(task_id.clone()));
        true
    }

    pub fn append_comment(&mut self, task_id: &EntityId, comment: Comment) -> bool {
        self.rewrite_comments(task_id, |comments| lists::append(comments, comment))
    }

    /// Swaps a provisional comment for the server copy
    pub fn confirm_comment(&mut self, task_id: &EntityId, temporary: &EntityId, comment: Comment) -> bool {
        self.rewrite_comments(task_id, |comments| {
            if lists::contains(comments, temporary) {
                lists::replace_by_id(comments, temporary, comment)
            } else {
                lists::append(comments, comment)
            }
        })
    }

    pub fn remove_comment(&mut self, task_id: &EntityId, comment_id: &EntityId) -> bool {
        let present = self
            .state
            .tasks
            .get(task_id)
            .is_some_and(|t| lists::contains(&t.comments, comment_id));
        present && self.rewrite_comments(task_id, |comments| lists::remove_by_id(comments, comment_id))
    }

    /// Merges a fetched comment list into a task
    pub fn merge_comments(&mut self, task_id: &EntityId, incoming: Vec<Comment>) -> bool {
        self.rewrite_comments(task_id, |comments| lists::merge_by_id(comments, &incoming))
    }
}

struct Shared {
    state: Mutex<Arc<CacheState>>,
    events: broadcast::Sender<CacheEvent>,
}

/// Cloneable handle to one cache
///
/// Clones share the same state. Create one per session and hand it to the
/// components that need it.
#[derive(Clone)]
pub struct CacheStore {
    shared: Arc<Shared>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(Arc::new(CacheState::default())),
                events,
            }),
        }
    }

    /// Current committed state
    pub fn snapshot(&self) -> Arc<CacheState> {
        self.shared.state.lock().clone()
    }

    pub fn revision(&self) -> u64 {
        self.shared.state.lock().revision
    }

    /// Receives an event after every commit
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.shared.events.subscribe()
    }

    /// Runs `apply` against a copy of the state and commits it on `Ok`
    ///
    /// The lock is held for the duration of `apply`, so transactions are
    /// serialized and readers only ever see committed states. A transaction
    /// that touched nothing commits nothing.
    pub fn transaction<T, E, F>(&self, apply: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction) -> Result<T, E>,
    {
        let event = {
            let mut committed = self.shared.state.lock();
            let mut tx = Transaction::new(CacheState::clone(&committed));
            let value = apply(&mut tx)?;

            if tx.touched.is_empty() {
                return Ok(value);
            }

            let Transaction { mut state, touched } = tx;
            state.revision = committed.revision + 1;
            let revision = state.revision;
            *committed = Arc::new(state);

            debug!(revision, keys = touched.len(), "cache commit");
            (
                value,
                CacheEvent {
                    revision,
                    keys: touched,
                },
            )
        };

        let (value, event) = event;
        // no subscribers is fine
        let _ = self.shared.events.send(event);
        Ok(value)
    }

    /// Applies `write` in a transaction that cannot fail
    pub fn update<T, F>(&self, write: F) -> T
    where
        F: FnOnce(&mut Transaction) -> T,
    {
        match self.transaction(|tx| Ok::<T, std::convert::Infallible>(write(tx))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Drops all cached data
    pub fn reset(&self) {
        self.update(Transaction::clear);
        debug!("cache reset");
    }
}
