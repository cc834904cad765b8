//! HTTP response wrapper.

use bytes::Bytes;

use crate::error::{ClientError, Result};

/// An HTTP response from a request.
pub struct HttpResponse {
    inner: reqwest::Response,
}

impl HttpResponse {
    /// Create from a reqwest response.
    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        Self { inner: response }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    /// Get the Content-Type header value.
    pub fn content_type(&self) -> Option<&str> {
        self.inner
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        Ok(self.inner.text().await?)
    }

    /// Get the response body as raw bytes.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.inner.bytes().await?)
    }

    /// Check if the status code indicates success, consuming the body for the error message.
    pub async fn error_for_status_with_body(self) -> Result<Self> {
        let status = self.status();
        if self.is_success() {
            Ok(self)
        } else {
            let message = self.text().await.ok().filter(|body| !body.is_empty());
            Err(ClientError::HttpStatus { status, message })
        }
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status())
            .field("url", &self.inner.url().as_str())
            .finish()
    }
}
