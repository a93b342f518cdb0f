/// Transport layer
///
/// A transport moves GraphQL envelopes to the backend and back. It knows
/// nothing about operations or the cache; the data client on top of it does.
///
/// # Transport Contract
///
/// All transports must:
/// 1. Send every request with the session credential established by login
/// 2. Return the decoded response envelope, including server-reported errors
/// 3. Report transport failures (connection, HTTP status, decoding) as
///    `TransportError`
/// 4. Perform logout as a state-changing non-GraphQL call carrying the
///    anti-forgery token
///
/// # Transport Types
///
/// - **Http**: `reqwest` client with a cookie jar
/// - **Mock**: scripted replies for tests and offline demos

pub mod http;
pub mod mock;

use async_trait::async_trait;
use taskdeck_shared::graphql::{GraphQLRequest, GraphQLResponse};

pub use http::HttpTransport;
pub use mock::{MockReply, MockTransport};

/// Transport error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// Could not connect or the request failed mid-flight
    #[error("request failed: {0}")]
    Request(String),

    /// Server answered with a non-success HTTP status
    #[error("server responded with HTTP {0}")]
    Status(u16),

    /// Response body was not a GraphQL envelope
    #[error("cannot decode response: {0}")]
    Decode(String),
}

/// Transport result type alias
pub type TransportResult<T> = Result<T, TransportError>;

/// Moves GraphQL requests to the backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging
    fn name(&self) -> &str;

    /// Sends one GraphQL request and returns the response envelope
    async fn execute(&self, request: GraphQLRequest) -> TransportResult<GraphQLResponse>;

    /// Ends the server session
    async fn logout(&self) -> TransportResult<()>;
}
