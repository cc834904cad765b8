//! `application/json` request bodies.

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use super::EncodedBody;
use crate::error::{ClientError, Result};
use crate::graphql::GraphQLRequest;

/// Content type of JSON-encoded requests.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// The `{query, variables}` object shared by both encodings.
#[derive(Serialize)]
pub(crate) struct Operations<'a> {
    pub(crate) query: &'a str,
    pub(crate) variables: &'a Map<String, Value>,
}

impl Operations<'_> {
    pub(crate) fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            ClientError::Encoding(format!("Failed to serialize GraphQL operations: {e}"))
        })
    }
}

/// Encode a request without files as `{"query": ..., "variables": {...}}`.
///
/// Fails if the request carries files or if a variable could not be
/// serialized.
pub fn encode_json(request: &GraphQLRequest) -> Result<EncodedBody> {
    if request.has_files() {
        return Err(ClientError::Encoding(
            "Requests with file uploads must be sent as multipart/form-data".into(),
        ));
    }
    request.check_variables()?;

    let body = Operations {
        query: request.query(),
        variables: request.variables(),
    }
    .to_vec()?;

    tracing::debug!(
        target: "graphql_http::graphql",
        body_len = body.len(),
        "Encoded JSON request"
    );

    Ok(EncodedBody {
        content_type: JSON_CONTENT_TYPE.to_string(),
        body: Bytes::from(body),
    })
}
