//! HTTP plumbing underneath the GraphQL client.
//!
//! A small wrapper over `reqwest`: POST requests with a raw
//! body, per-request headers and timeouts, and an optional resettable cookie
//! jar shared across calls.
//!
//! # Example
//!
//! ```ignore
//! use graphql_http::http::HttpClient;
//!
//! let client = HttpClient::builder().cookies().build()?;
//!
//! let response = client
//!     .post("https://api.example.com/graphql")
//!     .header("Content-Type", "application/json")
//!     .bytes(r#"{"query":"{ me { id } }","variables":{}}"#)
//!     .send()
//!     .await?;
//! println!("Status: {}", response.status());
//! ```

mod client;
mod cookies;
mod request;
mod response;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use cookies::CookieJar;
pub use request::{HttpRequest, HttpRequestBuilder};
pub use response::HttpResponse;
