/// Interactive shell
///
/// Each input line is split into words (quotes group words) and parsed with
/// `clap`. Navigation goes through the [`RouteGuard`]; data commands go
/// through the form controllers so local validation applies exactly as it
/// would in a form.
///
/// ```text
/// taskdeck> login kp121 secret
/// taskdeck> board website
/// taskdeck> task-new "Draft brief" --status todo
/// taskdeck> task-move 12 done
/// taskdeck> task-edit 12 --title "Final brief" --assignee kp@example.com
/// taskdeck> comment 12 "Looks good"
/// ```

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use std::fmt::Write as _;
use taskdeck_shared::models::{EntityId, OrgScope, Project, ProjectScope, ProjectStatus, TaskStatus};
use taskdeck_shared::validation::{
    CommentInput, LoginInput, ProjectInput, SignupInput, TaskInput,
};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::forms::{CommentForm, LoginForm, ProjectForm, SignupForm, TaskForm};
use crate::routes::{Navigation, Route, RouteGuard};
use crate::session::{AuthState, SessionStore};
use crate::views::{DashboardView, ProjectListView, TaskBoardView, View};

const NO_BOARD: &str = "No board open. Use: board <project-slug>";

/// One shell input line
#[derive(Parser, Debug)]
#[command(
    name = "taskdeck",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Log in
    Login { username: String, password: String },

    /// Create an account and organization
    Signup {
        username: String,
        password: String,
        /// Organization name; quote it if it has spaces
        organization: String,
    },

    /// End the session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Navigate to a path, e.g. /projects/website/tasks
    Go { path: String },

    /// List projects
    Projects,

    /// Project dashboard with task counts and completion rates
    Dashboard,

    /// Open a project's task board
    Board { project_slug: String },

    /// Create a project
    ProjectNew {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatus>,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Edit a project, by id or slug
    ProjectEdit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Delete a project, by id or slug
    ProjectDelete { id: String },

    /// Create a task on the open board
    TaskNew {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        assignee: Option<String>,
        /// Due date, YYYY-MM-DD or RFC 3339
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
    },

    /// Edit a task on the open board; omitted fields keep their values
    TaskEdit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        assignee: Option<String>,
        /// Due date, YYYY-MM-DD or RFC 3339
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
    },

    /// Move a task to another column
    TaskMove { id: String, status: TaskStatus },

    /// Delete a task on the open board
    TaskDelete { id: String },

    /// Comment on a task on the open board
    Comment { task_id: String, content: String },

    /// Show commands
    Help,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

fn parse_due(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| "invalid date".to_string())?;
    Ok(Utc.from_utc_datetime(&midnight))
}

/// Splits a line into words; single or double quotes group words
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Result of one input line
#[derive(Debug, Clone, PartialEq)]
pub enum ShellOutcome {
    Continue(String),
    Quit,
}

/// Shell state: the session and the current route
pub struct Shell {
    session: SessionStore,
    route: Route,
}

impl Shell {
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            route: Route::Projects,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Resolves the session and shows the landing view
    pub async fn start(&mut self) -> String {
        self.session.refresh().await;
        self.navigate(Route::Projects).await
    }

    pub fn help() -> String {
        ShellLine::command().render_help().to_string()
    }

    /// Parses and runs one line
    pub async fn execute_line(&mut self, line: &str) -> ShellOutcome {
        let words = match split_words(line) {
            Ok(words) if words.is_empty() => return ShellOutcome::Continue(String::new()),
            Ok(words) => words,
            Err(e) => return ShellOutcome::Continue(format!("error: {}", e)),
        };

        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => return ShellOutcome::Continue(e.to_string()),
        };

        if command == ShellCommand::Quit {
            return ShellOutcome::Quit;
        }

        debug!(?command, "shell command");
        match self.run(command).await {
            Ok(output) => ShellOutcome::Continue(output),
            Err(err) => ShellOutcome::Continue(describe(&err)),
        }
    }

    async fn run(&mut self, command: ShellCommand) -> ClientResult<String> {
        match command {
            ShellCommand::Login { username, password } => {
                let form = LoginForm::with_input(LoginInput { username, password });
                let user = form.submit_login(&self.session).await?;
                let view = self.navigate(Route::Projects).await;
                Ok(format!("Welcome, {}.\n{}", user.username, view))
            }
            ShellCommand::Signup {
                username,
                password,
                organization,
            } => {
                let form = SignupForm::with_input(SignupInput {
                    username,
                    password,
                    organization_name: organization,
                });
                let payload = form.submit_signup(&self.session).await?;
                Ok(format!(
                    "User {} signed up for {}. Log in to continue.",
                    payload.user, payload.organization
                ))
            }
            ShellCommand::Logout => {
                let result = self.session.logout().await;
                self.route = Route::Login;
                result.map(|_| "Logged out.".to_string())
            }
            ShellCommand::Whoami => Ok(match self.session.state() {
                AuthState::Authenticated(user) => {
                    let org = user
                        .organization
                        .as_ref()
                        .map(|o| o.name.as_str())
                        .unwrap_or("no organization");
                    format!("{} <{}> ({})", user.username, user.email, org)
                }
                AuthState::Unknown => "Session not resolved yet.".to_string(),
                AuthState::Unauthenticated => "Not logged in.".to_string(),
            }),
            ShellCommand::Go { path } => {
                let route = path
                    .parse::<Route>()
                    .map_err(|e| ClientError::NotFound(e.0))?;
                Ok(self.navigate(route).await)
            }
            ShellCommand::Projects => Ok(self.navigate(Route::Projects).await),
            ShellCommand::Dashboard => Ok(self.navigate(Route::Dashboard).await),
            ShellCommand::Board { project_slug } => {
                Ok(self.navigate(Route::TaskBoard { project_slug }).await)
            }
            ShellCommand::ProjectNew {
                name,
                description,
                status,
                due,
            } => {
                let org = self.session.org_scope()?;
                let form = ProjectForm::with_input(ProjectInput {
                    name,
                    description,
                    status: status.or(Some(ProjectStatus::Active)),
                    due_date: due,
                });
                let project = form.submit_project(self.session.client(), &org, None).await?;
                Ok(format!("Created project {} ({}).", project.name, project.slug))
            }
            ShellCommand::ProjectEdit {
                id,
                name,
                description,
                status,
                due,
            } => {
                let org = self.session.org_scope()?;
                let current = self
                    .cached_project(&org, &id)
                    .ok_or_else(|| ClientError::NotFound(format!("Project {}", id)))?;

                let mut input = ProjectInput::from_project(&current);
                if let Some(name) = name {
                    input.name = name;
                }
                if description.is_some() {
                    input.description = description;
                }
                if status.is_some() {
                    input.status = status;
                }
                if due.is_some() {
                    input.due_date = due;
                }

                let form = ProjectForm::with_input(input);
                let project = form
                    .submit_project(self.session.client(), &org, Some(&current.id))
                    .await?;
                Ok(format!("Updated project {}.", project.name))
            }
            ShellCommand::ProjectDelete { id } => {
                let org = self.session.org_scope()?;
                let id = self
                    .cached_project(&org, &id)
                    .map_or_else(|| EntityId::from(id), |p| p.id);
                self.session.client().delete_project(&org, &id).await?;
                Ok("Project deleted.".to_string())
            }
            ShellCommand::TaskNew {
                title,
                description,
                status,
                assignee,
                due,
            } => {
                let Some(scope) = self.board_scope()? else {
                    return Ok(NO_BOARD.to_string());
                };
                let creator = self.session.user().map(|u| u.email).unwrap_or_default();
                let form = TaskForm::with_input(TaskInput {
                    title,
                    description,
                    status: status.or(Some(TaskStatus::Todo)),
                    assignee_email: assignee,
                    due_date: due,
                });
                let task = form
                    .submit_task(self.session.client(), &scope, &creator)
                    .await?;
                Ok(format!("Created task {}.\n{}", task.id, self.board_from_cache(&scope)))
            }
            ShellCommand::TaskEdit {
                id,
                title,
                description,
                status,
                assignee,
                due,
            } => {
                let Some(scope) = self.board_scope()? else {
                    return Ok(NO_BOARD.to_string());
                };
                let id = EntityId::from(id);
                let current = self
                    .session
                    .client()
                    .cache()
                    .snapshot()
                    .task(&id)
                    .cloned()
                    .ok_or_else(|| ClientError::NotFound(format!("Task {}", id)))?;

                let mut input = TaskInput::from_task(&current);
                if let Some(title) = title {
                    input.title = title;
                }
                if description.is_some() {
                    input.description = description;
                }
                if status.is_some() {
                    input.status = status;
                }
                if assignee.is_some() {
                    input.assignee_email = assignee;
                }
                if due.is_some() {
                    input.due_date = due;
                }

                let form = TaskForm::with_input(input);
                let task = form
                    .submit_task_edit(self.session.client(), &scope, &id)
                    .await?;
                Ok(format!("Updated task {}.\n{}", task.id, self.board_from_cache(&scope)))
            }
            ShellCommand::TaskMove { id, status } => {
                let Some(scope) = self.board_scope()? else {
                    return Ok(NO_BOARD.to_string());
                };
                self.session
                    .client()
                    .move_task(&scope, &EntityId::from(id), status)
                    .await?;
                Ok(self.board_from_cache(&scope))
            }
            ShellCommand::TaskDelete { id } => {
                let Some(scope) = self.board_scope()? else {
                    return Ok(NO_BOARD.to_string());
                };
                self.session
                    .client()
                    .delete_task(&scope, &EntityId::from(id))
                    .await?;
                Ok(self.board_from_cache(&scope))
            }
            ShellCommand::Comment { task_id, content } => {
                let Some(scope) = self.board_scope()? else {
                    return Ok(NO_BOARD.to_string());
                };
                let author = self
                    .session
                    .user()
                    .map(|u| u.email)
                    .ok_or(ClientError::NotAuthenticated)?;
                let form = CommentForm::with_input(CommentInput { content });
                form.submit_comment(
                    self.session.client(),
                    &scope,
                    &EntityId::from(task_id),
                    &author,
                )
                .await?;
                Ok(self.board_from_cache(&scope))
            }
            ShellCommand::Help => Ok(Self::help()),
            ShellCommand::Quit => Ok(String::new()),
        }
    }

    /// Cached project matching `key` as an id, or else as a slug in `org`
    fn cached_project(&self, org: &OrgScope, key: &str) -> Option<Project> {
        let snapshot = self.session.client().cache().snapshot();
        snapshot
            .project(&EntityId::from(key))
            .or_else(|| snapshot.project_by_slug(org, key))
            .cloned()
    }

    /// Scope of the open task board, if one is open
    fn board_scope(&self) -> ClientResult<Option<ProjectScope>> {
        let org = self.session.org_scope()?;
        Ok(match &self.route {
            Route::TaskBoard { project_slug } => Some(org.project(project_slug.clone())),
            _ => None,
        })
    }

    fn board_from_cache(&self, scope: &ProjectScope) -> String {
        let view = TaskBoardView::new(scope.clone());
        let snapshot = self.session.client().cache().snapshot();
        view.render(&view.read(&snapshot))
    }

    /// Applies the route guard and renders the resulting view
    pub async fn navigate(&mut self, route: Route) -> String {
        let mut requested = route;
        let mut out = String::new();

        loop {
            match RouteGuard::resolve(requested.clone(), &self.session.state()) {
                Navigation::Render(route) => {
                    self.route = route.clone();
                    out.push_str(&self.render(&route).await);
                    return out;
                }
                Navigation::Loading => {
                    // resolves to Authenticated or Unauthenticated, never Unknown
                    self.session.refresh().await;
                }
                Navigation::Redirect(target) => {
                    let _ = writeln!(out, "{} requires login, redirecting to {}.", requested, target);
                    requested = target;
                }
            }
        }
    }

    async fn render(&self, route: &Route) -> String {
        let client = self.session.client();
        match route {
            Route::Login => "Log in with: login <username> <password>\n\
                             No account? signup <username> <password> <organization>"
                .to_string(),
            Route::Signup => "Sign up with: signup <username> <password> <organization>".to_string(),
            Route::Projects | Route::Dashboard | Route::TaskBoard { .. } => {
                let org = match self.session.org_scope() {
                    Ok(org) => org,
                    Err(err) => return describe(&err),
                };
                match route {
                    Route::Projects => {
                        let view = ProjectListView::new(org);
                        let state = view.load(client).await;
                        view.render(&state)
                    }
                    Route::Dashboard => {
                        let view = DashboardView::new(org);
                        let state = view.load(client).await;
                        view.render(&state)
                    }
                    Route::TaskBoard { project_slug } => {
                        let scope = org.project(project_slug.clone());
                        let project = match client.project(&scope).await {
                            Ok(project) => project,
                            Err(err) => return describe(&err),
                        };
                        let view = TaskBoardView::new(scope);
                        let state = view.load(client).await;
                        format!(
                            "{} ({})\n{}",
                            project.name,
                            project.status.label(),
                            view.render(&state)
                        )
                    }
                    Route::Login | Route::Signup => String::new(),
                }
            }
        }
    }
}

/// User-facing text for an error, listing field errors one per line
pub fn describe(err: &ClientError) -> String {
    match err.field_errors() {
        Some(errors) => {
            let mut out = String::from("Please fix the following:");
            for (field, message) in errors.iter() {
                let _ = write!(out, "\n  {}: {}", field, message);
            }
            out
        }
        None => format!("Error: {}", err.user_message()),
    }
}
