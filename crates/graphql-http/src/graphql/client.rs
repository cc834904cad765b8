//! GraphQL client implementation.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::encode::{Encoding, MimeLookup, MultipartEncoder, RequestEncoder};
use super::request::GraphQLRequest;
use super::response::{self, GraphQLResponse};
use crate::cancel::CancellationToken;
use crate::error::{ClientError, Result};
use crate::http::{CookieJar, HttpClient, HttpClientBuilder};

/// Builder for creating a GraphQL client.
pub struct GraphQLClientBuilder {
    url: String,
    http_client: Option<HttpClient>,
    http_client_builder: Option<HttpClientBuilder>,
    default_headers: http::HeaderMap,
    request_timeout: Option<Duration>,
    cookies: bool,
    always_multipart: bool,
    multipart: MultipartEncoder,
}

impl GraphQLClientBuilder {
    /// Create a new builder with the specified GraphQL endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_client: None,
            http_client_builder: None,
            default_headers: http::HeaderMap::new(),
            request_timeout: None,
            cookies: false,
            always_multipart: false,
            multipart: MultipartEncoder::new(),
        }
    }

    /// Use an existing HTTP client.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use a custom HTTP client builder.
    pub fn http_client_builder(mut self, builder: HttpClientBuilder) -> Self {
        self.http_client_builder = Some(builder);
        self
    }

    /// Add a default header to all requests.
    ///
    /// Invalid names or values are dropped with a warning.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        match (name.try_into(), value.try_into()) {
            (Ok(name), Ok(value)) => {
                self.default_headers.insert(name, value);
            }
            _ => {
                tracing::warn!(target: "graphql_http::graphql", "Dropping invalid default header");
            }
        }
        self
    }

    /// Set bearer token authentication.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header(http::header::AUTHORIZATION, value)
    }

    /// Set the request timeout for HTTP operations.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Keep cookies across requests.
    ///
    /// Only applies when the builder creates the HTTP client itself.
    pub fn cookies(mut self) -> Self {
        self.cookies = true;
        self
    }

    /// Send every request as `multipart/form-data`, even without files.
    pub fn use_multipart(mut self) -> Self {
        self.always_multipart = true;
        self
    }

    /// Use a fixed multipart boundary instead of a random one.
    pub fn multipart_boundary(mut self, boundary: impl Into<String>) -> Result<Self> {
        self.multipart = self.multipart.with_boundary(boundary)?;
        Ok(self)
    }

    /// Use a custom extension to MIME type table for uploaded files.
    pub fn mime_lookup(mut self, lookup: MimeLookup) -> Self {
        self.multipart = self.multipart.mime_lookup(lookup);
        self
    }

    /// Build the GraphQL client.
    pub fn build(self) -> Result<GraphQLClient> {
        let endpoint = url::Url::parse(&self.url)?;

        let http_client = if let Some(client) = self.http_client {
            client
        } else {
            let mut builder = self.http_client_builder.unwrap_or_default();
            if let Some(timeout) = self.request_timeout {
                builder = builder.timeout(timeout);
            }
            if self.cookies {
                builder = builder.cookies();
            }
            builder.build()?
        };

        let encoder = RequestEncoder::new()
            .always_multipart(self.always_multipart)
            .multipart(self.multipart);

        Ok(GraphQLClient {
            inner: Arc::new(GraphQLClientInner {
                http_client,
                url: self.url,
                endpoint,
                default_headers: self.default_headers,
                encoder,
            }),
        })
    }
}

struct GraphQLClientInner {
    http_client: HttpClient,
    url: String,
    endpoint: url::Url,
    default_headers: http::HeaderMap,
    encoder: RequestEncoder,
}

/// A GraphQL client for queries and mutations, with file upload support.
///
/// Requests without files are sent as JSON; requests with files are sent as
/// `multipart/form-data`. Responses are returned with their data and errors
/// together. Use [`GraphQLResponse::into_data`] or [`GraphQLClient::run_data`]
/// to treat reported errors as failures.
///
/// # Example
///
/// ```ignore
/// use graphql_http::{GraphQLClient, GraphQLRequest};
///
/// let client = GraphQLClient::new("https://api.example.com/graphql")
///     .bearer_auth("my-token")
///     .build()?;
///
/// let request = GraphQLRequest::new("mutation ($file: Upload!) { singleUpload(file: $file) { id } }")
///     .file("file", "a.txt", "Alpha file content.\n");
///
/// let response = client.run::<serde_json::Value>(&request).await?;
/// if let Some(error) = response.first_error() {
///     eprintln!("{error}");
/// }
/// ```
#[derive(Clone)]
pub struct GraphQLClient {
    inner: Arc<GraphQLClientInner>,
}

impl GraphQLClient {
    /// Create a new GraphQL client with the specified endpoint URL.
    pub fn new(url: impl Into<String>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(url)
    }

    /// Create a new builder for configuring a GraphQL client.
    pub fn builder(url: impl Into<String>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(url)
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// The encoding `request` would be sent with.
    pub fn encoding_for(&self, request: &GraphQLRequest) -> Encoding {
        self.inner.encoder.encoding_for(request)
    }

    /// Send a request and decode the response, binding `data` to `T`.
    ///
    /// Server-reported errors are returned in the response. Encoding,
    /// transport, non-2xx statuses, and decoding failures are returned as
    /// errors.
    ///
    /// Headers set on the request replace client defaults of the same name,
    /// including `Accept`. `Content-Type` always comes from the encoder.
    pub async fn run<T: DeserializeOwned>(
        &self,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse<T>> {
        let encoded = self.inner.encoder.encode(request)?;

        let req = self
            .inner
            .http_client
            .post(&self.inner.url)
            .headers(&self.inner.default_headers)
            .header(http::header::ACCEPT, "application/json")
            .headers(request.headers())
            .header(http::header::CONTENT_TYPE, encoded.content_type.as_str())
            .bytes(encoded.body);

        tracing::debug!(
            target: "graphql_http::graphql",
            url = %self.inner.url,
            encoding = ?self.encoding_for(request),
            files = request.files().len(),
            "Sending GraphQL request"
        );

        let response = req.send().await?.error_for_status_with_body().await?;
        let body = response.bytes().await?;
        tracing::trace!(
            target: "graphql_http::graphql",
            body = %String::from_utf8_lossy(&body),
            "GraphQL response body"
        );

        response::decode(&body)
    }

    /// Like [`Self::run`], aborting if `token` is cancelled.
    ///
    /// The token is checked before the exchange starts and raced against it
    /// while it is in flight.
    pub async fn run_with_cancel<T: DeserializeOwned>(
        &self,
        request: &GraphQLRequest,
        token: &CancellationToken,
    ) -> Result<GraphQLResponse<T>> {
        if token.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(target: "graphql_http::graphql", "GraphQL request cancelled");
                Err(ClientError::Cancelled)
            }
            result = self.run(request) => result,
        }
    }

    /// Send a request and return its data, failing on any reported error.
    pub async fn run_data<T: DeserializeOwned>(&self, request: &GraphQLRequest) -> Result<T> {
        self.run::<T>(request).await?.into_data()
    }

    /// Execute a query without variables and return its data.
    pub async fn query<T: DeserializeOwned>(&self, query: impl Into<String>) -> Result<T> {
        self.run_data(&GraphQLRequest::new(query)).await
    }

    /// Send a request with untyped data.
    pub async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse<Value>> {
        self.run(request).await
    }

    fn cookie_jar(&self) -> Result<&CookieJar> {
        self.inner.http_client.cookie_jar().ok_or_else(|| {
            ClientError::Configuration(
                "Cookie operation requested on a client with no cookie store configured".into(),
            )
        })
    }

    /// Store a cookie to be sent to the endpoint.
    pub fn add_cookie(&self, name: &str, value: &str) -> Result<()> {
        self.cookie_jar()?
            .add_cookie(name, value, &self.inner.endpoint);
        Ok(())
    }

    /// The `Cookie` header currently sent to the endpoint, if any.
    pub fn cookie_header(&self) -> Result<Option<String>> {
        Ok(self.cookie_jar()?.cookie_header(&self.inner.endpoint))
    }

    /// Remove every stored cookie.
    pub fn clear_cookies(&self) -> Result<()> {
        self.cookie_jar()?.clear();
        Ok(())
    }
}

impl std::fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("url", &self.inner.url)
            .field("encoder", &self.inner.encoder)
            .finish()
    }
}
