//! GraphQL over HTTP: requests, wire encodings, responses, and the client.
//!
//! # Example
//!
//! ```ignore
//! use graphql_http::graphql::{GraphQLClient, GraphQLRequest};
//!
//! let client = GraphQLClient::new("https://api.example.com/graphql").build()?;
//!
//! // Plain query, sent as JSON
//! let request = GraphQLRequest::new(r#"
//!     query GetUser($id: ID!) {
//!         user(id: $id) { id name }
//!     }
//! "#)
//! .variable("id", "123");
//!
//! let user: UserData = client.run_data(&request).await?;
//!
//! // Upload, sent as multipart/form-data
//! let upload = GraphQLRequest::new(r#"
//!     mutation ($files: [Upload!]!) {
//!         multipleUpload(files: $files) { id }
//!     }
//! "#)
//! .file("files", "a.txt", "Alpha")
//! .file("files", "b.txt", "Bravo");
//!
//! let response = client.execute(&upload).await?;
//! for error in &response.errors {
//!     eprintln!("{error}");
//! }
//! ```

mod client;
pub mod encode;
mod request;
mod response;

pub use client::{GraphQLClient, GraphQLClientBuilder};
pub use encode::{EncodedBody, Encoding, MultipartEncoder, RequestEncoder, encode_json};
pub use request::{FileSource, FileUpload, GraphQLRequest};
pub use response::{
    GraphQLError, GraphQLLocation, GraphQLResponse, PathSegment, decode, decode_into,
    decode_reader,
};
