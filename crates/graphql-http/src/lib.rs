//! GraphQL over HTTP, with file uploads.
//!
//! This crate sends GraphQL operations to an HTTP endpoint and decodes the
//! `{data, errors}` envelope of the response:
//!
//! - **Requests**: query text, variables, headers, and file attachments
//! - **JSON encoding**: `{"query": ..., "variables": {...}}` for plain operations
//! - **Multipart encoding**: the GraphQL multipart request convention
//!   (`operations`, `map`, one part per file) for uploads
//! - **Responses**: `data` bound to your own types, `errors` kept alongside
//!
//! # Example
//!
//! ```ignore
//! use graphql_http::{GraphQLClient, GraphQLRequest};
//!
//! #[derive(serde::Deserialize)]
//! struct Upload {
//!     #[serde(rename = "singleUpload")]
//!     single_upload: File,
//! }
//!
//! let client = GraphQLClient::new("https://api.example.com/graphql")
//!     .bearer_auth("my-token")
//!     .cookies()
//!     .build()?;
//!
//! let request = GraphQLRequest::new("mutation ($file: Upload!) { singleUpload(file: $file) { id } }")
//!     .file("file", "a.txt", "Alpha file content.\n")
//!     .header("X-Request-Id", "42");
//!
//! let response = client.run::<Upload>(&request).await?;
//! match response.first_error() {
//!     Some(error) => eprintln!("{error}"),
//!     None => println!("uploaded {}", response.data.unwrap().single_upload.id),
//! }
//! ```
//!
//! # Encoding without sending
//!
//! The encoders are plain functions of the request and can be used on their
//! own:
//!
//! ```ignore
//! use graphql_http::graphql::{MultipartEncoder, encode_json};
//!
//! let body = encode_json(&request)?;
//! let upload = MultipartEncoder::new().encode(&request_with_files)?;
//! assert!(upload.content_type.starts_with("multipart/form-data; boundary="));
//! ```
//!
//! # Errors
//!
//! Failures are reported as [`ClientError`]: encoding, transport
//! (connection, timeout, cancellation, non-2xx status), decoding, and
//! configuration problems. Errors reported by the server inside a decoded
//! response are not failures unless you ask for them to be, through
//! [`GraphQLResponse::into_data`] or [`GraphQLClient::run_data`].

mod cancel;
mod error;
pub mod graphql;
pub mod http;

pub use cancel::CancellationToken;
pub use error::{ClientError, Result};

// Re-export commonly used types at the crate root
pub use self::graphql::{
    FileSource, GraphQLClient, GraphQLClientBuilder, GraphQLError, GraphQLRequest,
    GraphQLResponse,
};
pub use self::http::{HttpClient, HttpClientBuilder};
