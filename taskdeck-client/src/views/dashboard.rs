/// Project dashboard view
///
/// Shows every project of the organization with the task aggregates the
/// backend computes (`taskCount`, `completionRate`). The aggregates are not
/// recomputed locally; after task changes the dashboard reloads them.

use async_trait::async_trait;
use std::fmt::Write as _;
use taskdeck_shared::models::{OrgScope, Project, ProjectStatus};

use super::{render_pending, View, ViewState};
use crate::cache::{CacheEvent, CacheKey, CacheState};
use crate::client::DataClient;

/// Dashboard data derived from project summaries
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub projects: Vec<Project>,
    pub total_tasks: i64,
    pub by_status: Vec<(ProjectStatus, usize)>,
}

impl DashboardSummary {
    pub fn from_projects(projects: Vec<Project>) -> Self {
        let total_tasks = projects.iter().filter_map(|p| p.task_count).sum();
        let by_status = ProjectStatus::ALL
            .iter()
            .map(|status| (*status, projects.iter().filter(|p| p.status == *status).count()))
            .collect();

        Self {
            projects,
            total_tasks,
            by_status,
        }
    }

    /// Completion across all projects, weighted by task count
    pub fn overall_completion(&self) -> f64 {
        let (done, total) = self
            .projects
            .iter()
            .filter_map(|p| Some((p.task_count?, p.completion_rate?)))
            .fold((0.0, 0i64), |(done, total), (count, rate)| {
                (done + count as f64 * rate / 100.0, total + count)
            });

        if total == 0 {
            0.0
        } else {
            done / total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    org: OrgScope,
}

impl DashboardView {
    pub fn new(org: OrgScope) -> Self {
        Self { org }
    }
}

#[async_trait]
impl View for DashboardView {
    type Data = DashboardSummary;

    async fn load(&self, client: &DataClient) -> ViewState<DashboardSummary> {
        ViewState::from_result(client.project_summaries(&self.org).await)
            .map(DashboardSummary::from_projects)
    }

    fn read(&self, cache: &CacheState) -> ViewState<DashboardSummary> {
        match cache.projects(&self.org) {
            Some(projects) => ViewState::Ready(DashboardSummary::from_projects(projects)),
            None => ViewState::Loading,
        }
    }

    fn is_stale(&self, event: &CacheEvent) -> bool {
        event.affects(&CacheKey::ProjectList(self.org.clone()))
            || event
                .keys
                .iter()
                .any(|k| matches!(k, CacheKey::Project(_) | CacheKey::TaskList(_) | CacheKey::Task(_)))
    }

    fn render(&self, state: &ViewState<DashboardSummary>) -> String {
        if let Some(pending) = render_pending(state, "dashboard") {
            return pending;
        }
        let Some(summary) = state.data() else {
            return String::new();
        };

        let mut out = String::from("Dashboard\n");
        let counts: Vec<String> = summary
            .by_status
            .iter()
            .map(|(status, n)| format!("{}: {}", status.label(), n))
            .collect();
        let _ = writeln!(
            out,
            "  {} projects ({})  {} tasks  {:.0}% complete",
            summary.projects.len(),
            counts.join(", "),
            summary.total_tasks,
            summary.overall_completion()
        );

        for project in &summary.projects {
            let tasks = project
                .task_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            let rate = project
                .completion_rate
                .map(|r| format!("{:.0}%", r))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "  {:<24} {:<10} tasks: {:<4} done: {}",
                project.name,
                project.status.label(),
                tasks,
                rate
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summaries() -> Vec<Project> {
        serde_json::from_value(json!([
            { "id": "1", "slug": "a", "name": "Website", "status": "ACTIVE",
              "taskCount": 4, "completionRate": 50.0 },
            { "id": "2", "slug": "b", "name": "Mobile", "status": "ON_HOLD",
              "taskCount": 0, "completionRate": 0 },
            { "id": "3", "slug": "c", "name": "Docs", "status": "ACTIVE",
              "taskCount": 1, "completionRate": 100.0 }
        ]))
        .unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let summary = DashboardSummary::from_projects(summaries());
        assert_eq!(summary.total_tasks, 5);
        assert_eq!(
            summary.by_status,
            vec![
                (ProjectStatus::Active, 2),
                (ProjectStatus::Completed, 0),
                (ProjectStatus::OnHold, 1)
            ]
        );
        // 2 of 4 plus 1 of 1
        assert!((summary.overall_completion() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_tasks_is_zero_percent() {
        let summary = DashboardSummary::from_projects(vec![]);
        assert_eq!(summary.overall_completion(), 0.0);
    }

    #[test]
    fn test_render_shows_aggregates() {
        let view = DashboardView::new(OrgScope::new("acme"));
        let text = view.render(&ViewState::Ready(DashboardSummary::from_projects(summaries())));

        assert!(text.contains("3 projects (Active: 2, Completed: 0, On Hold: 1)  5 tasks  60% complete"));
        assert!(text.contains("Website"));
        assert!(text.contains("done: 50%"));
    }

    #[test]
    fn test_render_without_aggregates() {
        let project: Project =
            serde_json::from_value(json!({ "id": "1", "name": "Website" })).unwrap();
        let view = DashboardView::new(OrgScope::new("acme"));
        let text = view.render(&ViewState::Ready(DashboardSummary::from_projects(vec![project])));
        assert!(text.contains("tasks: -"));
    }
}
