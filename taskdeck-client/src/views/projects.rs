/// Project list view

use async_trait::async_trait;
use std::fmt::Write as _;
use taskdeck_shared::models::{OrgScope, Project};

use super::{render_pending, View, ViewState};
use crate::cache::{CacheEvent, CacheKey, CacheState};
use crate::client::DataClient;

/// Projects of one organization, in server order
#[derive(Debug, Clone)]
pub struct ProjectListView {
    org: OrgScope,
}

impl ProjectListView {
    pub fn new(org: OrgScope) -> Self {
        Self { org }
    }

    pub fn org(&self) -> &OrgScope {
        &self.org
    }
}

#[async_trait]
impl View for ProjectListView {
    type Data = Vec<Project>;

    async fn load(&self, client: &DataClient) -> ViewState<Vec<Project>> {
        ViewState::from_result(client.projects(&self.org).await)
    }

    fn read(&self, cache: &CacheState) -> ViewState<Vec<Project>> {
        match cache.projects(&self.org) {
            Some(projects) => ViewState::Ready(projects),
            None => ViewState::Loading,
        }
    }

    fn is_stale(&self, event: &CacheEvent) -> bool {
        event.affects(&CacheKey::ProjectList(self.org.clone()))
            || event.keys.iter().any(|k| matches!(k, CacheKey::Project(_)))
    }

    fn render(&self, state: &ViewState<Vec<Project>>) -> String {
        if let Some(pending) = render_pending(state, "projects") {
            return pending;
        }
        let projects = state.data().map(Vec::as_slice).unwrap_or_default();

        let mut out = String::from("Projects\n");
        if projects.is_empty() {
            out.push_str("  No projects yet.\n");
            return out;
        }

        for project in projects {
            let due = project
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "No deadline".to_string());
            let _ = writeln!(
                out,
                "  [{}] {} ({})  {}  Due: {}",
                project.id,
                project.name,
                project.slug,
                project.status.label(),
                due
            );
            if let Some(description) = &project.description {
                let _ = writeln!(out, "      {}", description);
            }
        }
        out
    }
}
