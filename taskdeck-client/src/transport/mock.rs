/// Mock transport for testing and demos
///
/// Replies are scripted per operation name and consumed in FIFO order. Every
/// request is recorded so tests can assert on what reached (or did not reach)
/// the network.
///
/// A reply can be gated: the request is recorded immediately but the reply is
/// held back until the returned [`Notify`] is signalled. This makes the
/// window between an optimistic write and the server answer observable.
///
/// # Example
///
/// ```
/// use taskdeck_client::transport::{MockReply, MockTransport, Transport};
/// use taskdeck_shared::graphql::operations::{Me, NoVariables};
/// use taskdeck_shared::graphql::Operation;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = MockTransport::new();
/// transport.reply("Me", MockReply::data(json!({ "me": null })));
///
/// let response = transport.execute(Me::request(&NoVariables {})?).await?;
/// assert!(response.data.is_some());
/// assert_eq!(transport.request_count(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use taskdeck_shared::graphql::{GraphQLErrorEntry, GraphQLRequest, GraphQLResponse};
use tokio::sync::Notify;
use tracing::debug;

use super::{Transport, TransportError, TransportResult};

/// Scripted outcome of one request
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful response with this `data`
    Data(JsonValue),

    /// Response carrying server-reported errors
    Errors(Vec<String>),

    /// Transport failure
    Failure(TransportError),
}

impl MockReply {
    pub fn data(data: JsonValue) -> Self {
        MockReply::Data(data)
    }

    pub fn error(message: impl Into<String>) -> Self {
        MockReply::Errors(vec![message.into()])
    }

    pub fn network(message: impl Into<String>) -> Self {
        MockReply::Failure(TransportError::Request(message.into()))
    }

    fn into_result(self) -> TransportResult<GraphQLResponse> {
        match self {
            MockReply::Data(data) => Ok(GraphQLResponse::data(data)),
            MockReply::Errors(messages) => Ok(GraphQLResponse {
                data: None,
                errors: messages
                    .into_iter()
                    .map(|message| GraphQLErrorEntry { message, path: None })
                    .collect(),
            }),
            MockReply::Failure(err) => Err(err),
        }
    }
}

struct Scripted {
    reply: MockReply,
    gate: Option<Arc<Notify>>,
}

/// Transport answering from a script
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<GraphQLRequest>>,
    logouts: Mutex<usize>,
    logout_failure: Mutex<Option<TransportError>>,
}

impl MockTransport {
    /// Creates a mock with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next request of `operation`
    pub fn reply(&self, operation: &str, reply: MockReply) -> &Self {
        self.push(operation, reply, None);
        self
    }

    /// Queues a reply that is held until the returned gate is notified
    pub fn reply_gated(&self, operation: &str, reply: MockReply) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(operation, reply, Some(gate.clone()));
        gate
    }

    /// Makes the next logout fail with `err`
    pub fn fail_logout(&self, err: TransportError) {
        *self.logout_failure.lock() = Some(err);
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<GraphQLRequest> {
        self.requests.lock().clone()
    }

    /// Requests received for one operation
    pub fn requests_for(&self, operation: &str) -> Vec<GraphQLRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.operation_name == operation)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn logout_count(&self) -> usize {
        *self.logouts.lock()
    }

    fn push(&self, operation: &str, reply: MockReply, gate: Option<Arc<Notify>>) {
        self.replies
            .lock()
            .entry(operation.to_string())
            .or_default()
            .push_back(Scripted { reply, gate });
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, request: GraphQLRequest) -> TransportResult<GraphQLResponse> {
        let operation = request.operation_name.clone();
        self.requests.lock().push(request);

        let scripted = self
            .replies
            .lock()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);

        let Some(scripted) = scripted else {
            return Err(TransportError::Request(format!(
                "no scripted reply for {}",
                operation
            )));
        };

        if let Some(gate) = scripted.gate {
            debug!(operation = %operation, "holding reply until released");
            gate.notified().await;
        }

        scripted.reply.into_result()
    }

    async fn logout(&self) -> TransportResult<()> {
        *self.logouts.lock() += 1;
        match self.logout_failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskdeck_shared::graphql::operations::{Me, NoVariables};
    use taskdeck_shared::graphql::Operation;

    fn me_request() -> GraphQLRequest {
        Me::request(&NoVariables {}).unwrap()
    }

    #[tokio::test]
    async fn test_replies_are_fifo() {
        let transport = MockTransport::new();
        transport
            .reply("Me", MockReply::data(json!({ "me": null })))
            .reply("Me", MockReply::error("Not logged in"));

        let first = transport.execute(me_request()).await.unwrap();
        assert!(first.errors.is_empty());

        let second = transport.execute(me_request()).await.unwrap();
        assert_eq!(second.first_error(), Some("Not logged in"));
    }

    #[tokio::test]
    async fn test_unscripted_operation_fails() {
        let transport = MockTransport::new();
        let err = transport.execute(me_request()).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
        assert_eq!(transport.requests_for("Me").len(), 1);
    }

    #[tokio::test]
    async fn test_gated_reply_waits_for_release() {
        let transport = Arc::new(MockTransport::new());
        let gate = transport.reply_gated("Me", MockReply::data(json!({ "me": null })));

        let pending = {
            let transport = transport.clone();
            tokio::spawn(async move { transport.execute(me_request()).await })
        };

        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        gate.notify_one();
        assert!(pending.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_logout_failure_is_one_shot() {
        let transport = MockTransport::new();
        transport.fail_logout(TransportError::Status(403));

        assert_eq!(transport.logout().await, Err(TransportError::Status(403)));
        assert_eq!(transport.logout().await, Ok(()));
        assert_eq!(transport.logout_count(), 2);
    }
}
