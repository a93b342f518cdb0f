/// GraphQL request/response contracts
///
/// Every query and mutation the client issues is an [`Operation`]: a document,
/// typed variables and a typed response payload. Responses are validated at
/// the boundary by [`GraphQLResponse::into_data`], so callers never handle
/// untyped JSON.
///
/// # Wire format
///
/// ```text
/// POST /graphql/
/// { "query": "...", "operationName": "Tasks", "variables": { ... } }
///
/// 200 OK
/// { "data": { ... }, "errors": [ { "message": "..." } ] }
/// ```

pub mod operations;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Query or mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A typed GraphQL operation
pub trait Operation {
    /// Operation name sent as `operationName`
    const NAME: &'static str;

    /// GraphQL document
    const DOCUMENT: &'static str;

    /// Whether the operation changes server state
    const KIND: OperationKind;

    /// Variables sent with the request
    type Variables: Serialize;

    /// Shape of the `data` member on success
    type Data: DeserializeOwned;

    /// Builds the request envelope for these variables
    fn request(variables: &Self::Variables) -> Result<GraphQLRequest, ContractError> {
        let variables = serde_json::to_value(variables).map_err(|e| ContractError::Variables {
            operation: Self::NAME,
            message: e.to_string(),
        })?;

        Ok(GraphQLRequest {
            query: Self::DOCUMENT.to_string(),
            operation_name: Self::NAME.to_string(),
            variables,
        })
    }
}

/// Contract violations at the client boundary
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    /// The server reported errors; carries the first message verbatim
    #[error("{0}")]
    Server(String),

    /// Neither `data` nor `errors` present
    #[error("response for {operation} carried no data")]
    MissingData { operation: &'static str },

    /// `data` did not match the expected shape
    #[error("unexpected response shape for {operation}: {message}")]
    Shape {
        operation: &'static str,
        message: String,
    },

    /// Variables could not be encoded
    #[error("cannot encode variables for {operation}: {message}")]
    Variables {
        operation: &'static str,
        message: String,
    },
}

/// Request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    pub operation_name: String,
    pub variables: JsonValue,
}

/// A single entry of the `errors` member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLErrorEntry {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<JsonValue>>,
}

/// Response envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<JsonValue>,

    #[serde(default, deserialize_with = "crate::models::nullable_list")]
    pub errors: Vec<GraphQLErrorEntry>,
}

impl GraphQLResponse {
    /// Successful response carrying `data`
    pub fn data(data: JsonValue) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Error response with a single message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![GraphQLErrorEntry {
                message: message.into(),
                path: None,
            }],
        }
    }

    /// Message of the first reported error, if any
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }

    /// Validates the response against the operation's data shape
    ///
    /// Server-reported errors win over partial data: graphene answers a
    /// failed resolver with both `errors` and a `null` field in `data`.
    pub fn into_data<O: Operation>(self) -> Result<O::Data, ContractError> {
        if let Some(message) = self.first_error() {
            return Err(ContractError::Server(message.to_string()));
        }

        let data = self
            .data
            .ok_or(ContractError::MissingData { operation: O::NAME })?;

        serde_json::from_value(data).map_err(|e| ContractError::Shape {
            operation: O::NAME,
            message: e.to_string(),
        })
    }
}
