//! Error types for the GraphQL client.

use thiserror::Error;

use crate::graphql::GraphQLError;

/// Errors produced while encoding, sending, or decoding a GraphQL operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be turned into a wire body.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The response body is not valid JSON or does not fit the target type.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// The server answered with a non-empty `errors` list.
    #[error("GraphQL error: {}", join_messages(.0))]
    GraphQL(Vec<GraphQLError>),

    /// The client is missing something the operation needs.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP request failed.
    #[error("HTTP request error: {0}")]
    Request(String),

    /// Connection refused or failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Request was cancelled.
    #[error("Request was cancelled")]
    Cancelled,

    /// HTTP error status (4xx or 5xx).
    #[error("HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Optional error message from the response body.
        message: Option<String>,
    },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    /// Whether the request failed before anything was sent.
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }

    /// Whether the response body could not be decoded.
    pub fn is_decoding(&self) -> bool {
        matches!(self, Self::Decoding(_))
    }

    /// Whether the server reported GraphQL-level errors.
    pub fn is_graphql(&self) -> bool {
        matches!(self, Self::GraphQL(_))
    }

    /// Whether the failure happened in the HTTP exchange itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Request(_)
                | Self::Connection(_)
                | Self::Timeout
                | Self::Cancelled
                | Self::HttpStatus { .. }
                | Self::Io(_)
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for ClientError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for ClientError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// A specialized Result type for GraphQL client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
