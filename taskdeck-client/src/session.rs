/// Session store
///
/// Holds the authenticated identity as reported by the backend's `me` query
/// and publishes every transition on a `watch` channel.
///
/// # State Machine
///
/// ```text
///            refresh: me = user
/// Unknown ─────────────────────────► Authenticated(User)
///    │                                   ▲        │
///    │ refresh: me = null / failure      │ login  │ logout
///    ▼                                   │        ▼
/// Unauthenticated ◄───────────────────────────────┘
/// ```
///
/// The session credential itself is a cookie held by the transport; this
/// store only mirrors who the backend thinks we are.

use std::sync::Arc;
use taskdeck_shared::graphql::operations::{
    Login, LoginVariables, Me, NoVariables, Signup, SignupPayload, SignupVariables,
};
use taskdeck_shared::models::{OrgScope, User};
use taskdeck_shared::validation::{LoginInput, SignupInput};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::client::DataClient;
use crate::error::{ClientError, ClientResult};

/// Who the backend thinks the current user is
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Session query not answered yet
    #[default]
    Unknown,

    /// Backend returned a user
    Authenticated(User),

    /// Backend returned no user, or the query failed
    Unauthenticated,
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// False only while the first session query is outstanding
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthState::Unknown)
    }
}

/// Shared handle to the current session
#[derive(Clone)]
pub struct SessionStore {
    client: DataClient,
    state: Arc<watch::Sender<AuthState>>,
}

impl SessionStore {
    pub fn new(client: DataClient) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            client,
            state: Arc::new(state),
        }
    }

    pub fn client(&self) -> &DataClient {
        &self.client
    }

    /// Current state
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receives every state transition
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Organization scope of the signed-in user
    pub fn org_scope(&self) -> ClientResult<OrgScope> {
        self.user()
            .and_then(|user| user.org_scope())
            .ok_or(ClientError::NotAuthenticated)
    }

    fn transition(&self, next: AuthState) {
        let user = next.user().cloned();
        let previous = self.state.send_replace(next);

        if previous.user() != user.as_ref() || !previous.is_resolved() {
            match &user {
                Some(u) => info!(username = %u.username, "session authenticated"),
                None => info!("session unauthenticated"),
            }
        }
        self.client.cache().update(|tx| tx.set_user(user));
    }

    /// Asks the backend who we are
    ///
    /// Never fails: an error answer is an unauthenticated session. There is
    /// no automatic retry.
    pub async fn refresh(&self) -> AuthState {
        let next = match self.client.execute::<Me>(&NoVariables {}).await {
            Ok(data) => match data.me {
                Some(user) => AuthState::Authenticated(user),
                None => AuthState::Unauthenticated,
            },
            Err(err) => {
                warn!(error = %err, "session query failed");
                AuthState::Unauthenticated
            }
        };
        self.transition(next.clone());
        next
    }

    /// Logs in with a checked input and re-reads the session
    ///
    /// On failure the state is left as it was and the server message is
    /// returned verbatim.
    pub async fn login(&self, input: &LoginInput) -> ClientResult<User> {
        let variables = LoginVariables {
            username: input.username.clone(),
            password: input.password.clone(),
        };
        let returned = self.client.execute::<Login>(&variables).await?.login.user;

        match self.refresh().await {
            AuthState::Authenticated(user) => Ok(user),
            _ => match returned {
                // cookie accepted but `me` not readable yet
                Some(user) => {
                    self.transition(AuthState::Authenticated(user.clone()));
                    Ok(user)
                }
                None => Err(ClientError::NotAuthenticated),
            },
        }
    }

    /// Creates an account and organization
    ///
    /// The backend does not log the new user in; the session is unchanged.
    pub async fn signup(&self, input: &SignupInput) -> ClientResult<SignupPayload> {
        let variables = SignupVariables {
            username: input.username.clone(),
            password: input.password.clone(),
            organization_name: input.organization_name.clone(),
        };
        let payload = self.client.execute::<Signup>(&variables).await?.signup;
        info!(username = %payload.user, organization = %payload.organization, "account created");
        Ok(payload)
    }

    /// Ends the server session and drops everything cached for it
    ///
    /// The local session is cleared even when the logout request fails; the
    /// error is still returned so it can be shown.
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self.client.transport().logout().await;

        self.client.cache().reset();
        self.transition(AuthState::Unauthenticated);

        result.map_err(|e| {
            warn!(error = %e, "logout request failed");
            ClientError::from(e)
        })
    }
}
