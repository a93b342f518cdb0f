/// View models
///
/// Each view loads its data through the [`DataClient`], exposes it as a
/// [`ViewState`] and renders it as plain text. Views also know which cache
/// keys they read, so a caller holding a cache subscription can tell when a
/// view is stale.
///
/// # Views
///
/// - `projects`: organization project list
/// - `dashboard`: project summaries with task counts and completion rates
/// - `board`: three-column task board with comments

pub mod board;
pub mod dashboard;
pub mod projects;

use async_trait::async_trait;

use crate::cache::{CacheEvent, CacheState};
use crate::client::DataClient;
use crate::error::ClientResult;

pub use board::{BoardColumn, TaskBoard, TaskBoardView};
pub use dashboard::{DashboardSummary, DashboardView};
pub use projects::ProjectListView;

/// What a view has to show
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Data not available yet
    Loading,

    /// The last load failed; carries a user-facing message
    Error(String),

    /// Data available
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn from_result(result: ClientResult<T>) -> Self {
        match result {
            Ok(data) => ViewState::Ready(data),
            Err(err) => ViewState::Error(err.user_message()),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ViewState<U> {
        match self {
            ViewState::Loading => ViewState::Loading,
            ViewState::Error(message) => ViewState::Error(message),
            ViewState::Ready(data) => ViewState::Ready(f(data)),
        }
    }
}

/// Shared behaviour of the views
#[async_trait]
pub trait View: Send + Sync {
    type Data: Send;

    /// Fetches fresh data and returns the resulting state
    async fn load(&self, client: &DataClient) -> ViewState<Self::Data>;

    /// Builds the state from cached data only; `Loading` if never fetched
    fn read(&self, cache: &CacheState) -> ViewState<Self::Data>;

    /// True if a commit touched data this view reads
    fn is_stale(&self, event: &CacheEvent) -> bool;

    /// Plain-text rendering of a state
    fn render(&self, state: &ViewState<Self::Data>) -> String;
}

/// Renders the non-ready states shared by every view
fn render_pending<T>(state: &ViewState<T>, what: &str) -> Option<String> {
    match state {
        ViewState::Loading => Some(format!("Loading {}...", what)),
        ViewState::Error(message) => Some(format!("Error: {}", message)),
        ViewState::Ready(_) => None,
    }
}
