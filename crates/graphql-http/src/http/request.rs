//! HTTP request builder.

use std::time::Duration;

use bytes::Bytes;

use super::client::HttpClient;
use super::response::HttpResponse;
use crate::error::Result;

/// A built HTTP POST request ready to be sent.
#[derive(Debug)]
pub struct HttpRequest {
    /// The request URL.
    pub url: String,
    /// Request headers.
    pub headers: http::HeaderMap,
    /// Request body.
    pub body: Bytes,
    /// Request timeout override.
    pub timeout: Option<Duration>,
}

/// Builder for constructing HTTP POST requests.
pub struct HttpRequestBuilder {
    client: HttpClient,
    url: String,
    headers: http::HeaderMap,
    body: Bytes,
    timeout: Option<Duration>,
}

impl HttpRequestBuilder {
    /// Create a new request builder.
    pub(crate) fn new(client: HttpClient, url: String) -> Self {
        Self {
            client,
            url,
            headers: http::HeaderMap::new(),
            body: Bytes::new(),
            timeout: None,
        }
    }

    /// Set a header, replacing any previous values under the same name.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        match (name.try_into(), value.try_into()) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                tracing::warn!(target: "graphql_http::http", "Dropping invalid header");
            }
        }
        self
    }

    /// Set headers from another map.
    ///
    /// Each name in `headers` replaces the values already set under it; all
    /// of its values in `headers` are kept.
    pub fn headers(mut self, headers: &http::HeaderMap) -> Self {
        for name in headers.keys() {
            self.headers.remove(name);
        }
        for (name, value) in headers {
            self.headers.append(name.clone(), value.clone());
        }
        self
    }

    /// Set a raw binary body.
    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a timeout for this specific request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the request without sending it.
    pub fn build(self) -> HttpRequest {
        HttpRequest {
            url: self.url,
            headers: self.headers,
            body: self.body,
            timeout: self.timeout,
        }
    }

    /// Send the request and wait for the response headers.
    pub async fn send(self) -> Result<HttpResponse> {
        let client = self.client.clone();
        let request = self.build();

        let url = url::Url::parse(&request.url)?;

        let mut req_builder = client
            .reqwest_client()
            .post(url)
            .headers(request.headers);

        if let Some(timeout) = request.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        tracing::trace!(
            target: "graphql_http::http",
            url = %request.url,
            body_len = request.body.len(),
            "Sending POST"
        );

        let response = req_builder.body(request.body).send().await?;
        Ok(HttpResponse::from_reqwest(response))
    }
}
