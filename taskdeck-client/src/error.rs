/// Error handling for the client
///
/// Every fallible client operation returns `ClientResult<T>`. Errors are scoped
/// to the view or action that triggered them; none of them is fatal to the
/// process.
///
/// # Taxonomy
///
/// - validation: local, blocks submission, never reaches the network
/// - network: transport failures, surfaced with a generic message
/// - server: GraphQL `errors[]`, first message surfaced verbatim
/// - local guards: missing session, provisional targets, double submit
///
/// # Example
///
/// ```
/// use taskdeck_client::error::ClientError;
///
/// let err = ClientError::Network("connection refused".to_string());
/// assert_eq!(err.user_message(), "Unable to reach the server. Please try again.");
///
/// let err = ClientError::Server("Project not found.".to_string());
/// assert_eq!(err.user_message(), "Project not found.");
/// ```

use taskdeck_shared::graphql::ContractError;
use taskdeck_shared::validation::FieldErrors;

use crate::transport::TransportError;

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// Generic message for transport failures
pub const NETWORK_MESSAGE: &str = "Unable to reach the server. Please try again.";

/// Unified client error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Form input failed local validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Transport or HTTP failure
    #[error("Network error: {0}")]
    Network(String),

    /// Error reported by the GraphQL server
    #[error("{0}")]
    Server(String),

    /// Response did not match the expected contract
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Scoped operation attempted without a session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Mutation targeted an entity the server has not confirmed yet
    #[error("{0} is still being saved")]
    PendingEntity(String),

    /// Form is already waiting on a previous submission
    #[error("Submission already in progress")]
    SubmitInFlight,

    /// Entity not present in the local cache
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(errors) => errors.to_string(),
            ClientError::Network(_) | ClientError::MalformedResponse(_) => {
                NETWORK_MESSAGE.to_string()
            }
            ClientError::Server(message) => message.clone(),
            ClientError::NotAuthenticated => "You must be logged in.".to_string(),
            ClientError::PendingEntity(what) => {
                format!("{} is still being saved. Try again in a moment.", what)
            }
            ClientError::SubmitInFlight => "Already submitting, please wait.".to_string(),
            ClientError::NotFound(what) => format!("{} not found.", what),
            ClientError::Config(message) => message.clone(),
        }
    }

    /// Field errors, when this is a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        ClientError::Validation(errors)
    }
}

impl From<ContractError> for ClientError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::Server(message) => ClientError::Server(message),
            other => ClientError::MalformedResponse(other.to_string()),
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Decode(message) => ClientError::MalformedResponse(message),
            other => ClientError::Network(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}
