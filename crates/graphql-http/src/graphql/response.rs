//! GraphQL response types and decoding.

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Treat an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A GraphQL error returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// Locations in the document where the error occurred.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub locations: Vec<GraphQLLocation>,

    /// Path to the field that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,

    /// Additional error metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    /// An error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graphql: {}", self.message)?;
        if let Some(ref path) = self.path {
            write!(f, " (at ")?;
            for (i, segment) in path.iter().enumerate() {
                match segment {
                    PathSegment::Field(name) if i > 0 => write!(f, ".{name}")?,
                    PathSegment::Field(name) => write!(f, "{name}")?,
                    PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphQLError {}

/// A location in a GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLLocation {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

/// A segment in an error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A field name.
    Field(String),
    /// An array index.
    Index(usize),
}

/// The `{data, errors}` envelope of a GraphQL response.
///
/// `data` is bound to `T`; `errors` is always present, empty when the server
/// reported none. Errors do not make decoding fail: a response may carry
/// partial data together with errors, and the caller decides what to do with
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLResponse<T = Value> {
    /// The data returned by the operation.
    #[serde(default = "Option::default")]
    pub data: Option<T>,

    /// Errors that occurred during execution, in server order.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<GraphQLError>,

    /// Additional response metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl<T> GraphQLResponse<T> {
    /// Check if the response contains errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the response was successful (has data and no errors).
    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.errors.is_empty()
    }

    /// Get the first error, if any.
    pub fn first_error(&self) -> Option<&GraphQLError> {
        self.errors.first()
    }

    /// Get all errors as a combined message.
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(
                self.errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        }
    }

    /// Split into data and errors.
    pub fn into_parts(self) -> (Option<T>, Vec<GraphQLError>) {
        (self.data, self.errors)
    }

    /// Treat any reported error as a failure of the whole operation.
    ///
    /// Returns `Ok(self)` if there are no errors.
    pub fn into_result(self) -> Result<Self> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(ClientError::GraphQL(self.errors))
        }
    }

    /// The data, failing on reported errors or when no data was returned.
    pub fn into_data(self) -> Result<T> {
        self.into_result()?
            .data
            .ok_or_else(|| ClientError::Decoding("No data in GraphQL response".into()))
    }
}

impl GraphQLResponse<Value> {
    /// Bind the untyped data to `U`.
    pub fn data_as<U: DeserializeOwned>(&self) -> Result<U> {
        match &self.data {
            Some(data) => serde_json::from_value(data.clone()).map_err(|e| {
                ClientError::Decoding(format!("Failed to deserialize GraphQL response: {e}"))
            }),
            None => Err(ClientError::Decoding("No data in GraphQL response".into())),
        }
    }

    /// Parse a specific top-level field from the data.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // For a response like: { "data": { "user": { "id": "1", "name": "John" } } }
    /// let user: User = response.field("user")?;
    /// ```
    pub fn field<U: DeserializeOwned>(&self, field: &str) -> Result<U> {
        match &self.data {
            Some(Value::Object(data)) => {
                let field_value = data.get(field).ok_or_else(|| {
                    ClientError::Decoding(format!("Field '{field}' not found in response"))
                })?;
                serde_json::from_value(field_value.clone()).map_err(|e| {
                    ClientError::Decoding(format!("Failed to deserialize field '{field}': {e}"))
                })
            }
            Some(_) => Err(ClientError::Decoding("Response data is not an object".into())),
            None => Err(ClientError::Decoding("No data in GraphQL response".into())),
        }
    }
}

/// Decode a response body, binding `data` to `T`.
///
/// Fails when the body is not a JSON object or `data` does not fit `T`.
/// Server-reported errors are returned in the envelope, not as a failure.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<GraphQLResponse<T>> {
    let envelope: Value = serde_json::from_slice(body).map_err(|e| {
        ClientError::Decoding(format!("Error decoding GraphQL response body: {e}"))
    })?;
    from_envelope(envelope)
}

/// Like [`decode`], reading the body from `reader`.
pub fn decode_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<GraphQLResponse<T>> {
    let envelope: Value = serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            ClientError::Io(format!("Error reading GraphQL response body: {e}"))
        } else {
            ClientError::Decoding(format!("Error decoding GraphQL response body: {e}"))
        }
    })?;
    from_envelope(envelope)
}

fn from_envelope<T: DeserializeOwned>(envelope: Value) -> Result<GraphQLResponse<T>> {
    if !envelope.is_object() {
        return Err(ClientError::Decoding(
            "GraphQL response body is not a JSON object".into(),
        ));
    }
    let response: GraphQLResponse<T> = serde_json::from_value(envelope).map_err(|e| {
        ClientError::Decoding(format!("Error decoding GraphQL response body: {e}"))
    })?;
    log_decoded(&response);
    Ok(response)
}

/// Decode a response body into an existing value.
///
/// `data` is bound onto `target` in place: fields present in the response
/// overwrite the target's, nested objects are merged, and fields the
/// response omits keep their current value. A missing or `null` `data`
/// leaves the target untouched. Returns the reported errors.
pub fn decode_into<T>(body: &[u8], target: &mut T) -> Result<Vec<GraphQLError>>
where
    T: Serialize + DeserializeOwned,
{
    let (data, errors) = decode::<Value>(body)?.into_parts();
    if let Some(data) = data {
        let mut merged = serde_json::to_value(&*target).map_err(|e| {
            ClientError::Decoding(format!("Failed to read the current decode target: {e}"))
        })?;
        merge(&mut merged, data);
        *target = serde_json::from_value(merged).map_err(|e| {
            ClientError::Decoding(format!("Failed to deserialize GraphQL response: {e}"))
        })?;
    }
    Ok(errors)
}

/// Overlay `patch` onto `base`, recursing into objects. Anything else in
/// `patch` replaces the value in `base`.
fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

fn log_decoded<T>(response: &GraphQLResponse<T>) {
    tracing::debug!(
        target: "graphql_http::graphql",
        has_data = response.data.is_some(),
        errors = response.errors.len(),
        "Decoded GraphQL response"
    );
}
