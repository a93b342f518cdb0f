/// HTTP transport
///
/// Posts GraphQL envelopes to the configured endpoint with `reqwest`. A shared
/// cookie jar carries the session credential set by login/signup, so every
/// later request is authenticated without the caller doing anything.
///
/// Logout is not a GraphQL call: it is `POST /logout/` with the value of the
/// `csrftoken` cookie echoed in the `X-CSRFToken` header.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use std::sync::Arc;
use taskdeck_shared::graphql::{GraphQLRequest, GraphQLResponse};
use tracing::{debug, warn};

use super::{Transport, TransportError, TransportResult};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// `reqwest`-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
    graphql_url: Url,
    logout_url: Url,
    csrf_cookie: String,
    csrf_header: String,
}

impl HttpTransport {
    /// Builds a transport from configuration
    ///
    /// No request timeout is configured: failures surface only on transport
    /// or server errors.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let graphql_url = config.graphql_url()?;
        let logout_url = config.logout_url()?;
        let jar = Arc::new(Jar::default());

        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .user_agent(config.http.user_agent.clone())
            .build()
            .map_err(|e| ClientError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            jar,
            graphql_url,
            logout_url,
            csrf_cookie: config.api.csrf_cookie.clone(),
            csrf_header: config.api.csrf_header.clone(),
        })
    }

    /// Cookie jar shared by all requests
    pub fn cookie_jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    /// Current anti-forgery token, read from the cookie jar
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.logout_url)?;
        let cookies = header.to_str().ok()?;
        cookie_value(cookies, &self.csrf_cookie)
    }
}

/// Extracts a cookie value from a `Cookie` header string
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn execute(&self, request: GraphQLRequest) -> TransportResult<GraphQLResponse> {
        debug!(operation = %request.operation_name, url = %self.graphql_url, "sending GraphQL request");

        let response = self
            .client
            .post(self.graphql_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        // graphene answers invalid documents with HTTP 400 and an errors list
        match serde_json::from_slice::<GraphQLResponse>(&body) {
            Ok(envelope) if status.is_success() || !envelope.errors.is_empty() => {
                debug!(
                    operation = %request.operation_name,
                    status = status.as_u16(),
                    errors = envelope.errors.len(),
                    "GraphQL response received"
                );
                Ok(envelope)
            }
            _ if !status.is_success() => {
                warn!(operation = %request.operation_name, status = status.as_u16(), "GraphQL request failed");
                Err(TransportError::Status(status.as_u16()))
            }
            Ok(envelope) => Ok(envelope),
            Err(e) => Err(TransportError::Decode(e.to_string())),
        }
    }

    async fn logout(&self) -> TransportResult<()> {
        let mut request = self.client.post(self.logout_url.clone());
        match self.csrf_token() {
            Some(token) => request = request.header(self.csrf_header.as_str(), token),
            None => debug!("no anti-forgery cookie present, sending logout without token"),
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        debug!("logout acknowledged");
        Ok(())
    }
}
