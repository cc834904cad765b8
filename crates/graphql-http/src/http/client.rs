//! HTTP client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::redirect::Policy;

use super::cookies::CookieJar;
use super::request::HttpRequestBuilder;
use crate::error::{ClientError, Result};

/// Configuration for the HTTP client.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Whether to follow redirects.
    pub follow_redirects: bool,
    /// Maximum number of redirects to follow.
    pub max_redirects: usize,
    /// Whether to keep cookies between requests.
    pub cookies_enabled: bool,
    /// Default user agent.
    pub user_agent: Option<String>,
    /// Proxy URL.
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            follow_redirects: true,
            max_redirects: 10,
            cookies_enabled: false,
            user_agent: Some(format!("graphql-http/{} (Rust)", env!("CARGO_PKG_VERSION"))),
            proxy: None,
        }
    }
}

/// Builder for creating an HTTP client with custom configuration.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    default_headers: http::HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            default_headers: http::HeaderMap::new(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Disable redirect following.
    pub fn no_redirects(mut self) -> Self {
        self.config.follow_redirects = false;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Keep cookies set by the server and send them on later requests.
    pub fn cookies(mut self) -> Self {
        self.config.cookies_enabled = true;
        self
    }

    /// Disable cookie storage.
    pub fn no_cookies(mut self) -> Self {
        self.config.cookies_enabled = false;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Set a proxy URL.
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy_url.into());
        self
    }

    /// Add a default header that will be sent with every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| ClientError::InvalidHeader("Invalid header name".to_string()))?;
        let value = value
            .try_into()
            .map_err(|_| ClientError::InvalidHeader("Invalid header value".to_string()))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the HTTP client.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if self.config.follow_redirects {
            builder = builder.redirect(Policy::limited(self.config.max_redirects));
        } else {
            builder = builder.redirect(Policy::none());
        }

        let cookie_jar = if self.config.cookies_enabled {
            let jar = Arc::new(CookieJar::new());
            builder = builder.cookie_provider(jar.clone());
            Some(jar)
        } else {
            None
        };

        if let Some(ref ua) = self.config.user_agent {
            builder = builder.user_agent(ua);
        }

        if let Some(ref proxy_url) = self.config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ClientError::Configuration(format!("Invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        builder = builder.default_headers(self.default_headers);

        let client = builder
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        tracing::debug!(
            target: "graphql_http::http",
            cookies = cookie_jar.is_some(),
            "HTTP client built"
        );

        Ok(HttpClient {
            inner: Arc::new(HttpClientInner {
                client,
                config: self.config,
                cookie_jar,
            }),
        })
    }
}

/// Internal state for the HTTP client.
struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
    cookie_jar: Option<Arc<CookieJar>>,
}

/// A thin HTTP client used to carry GraphQL requests.
///
/// The client is cheaply cloneable and thread-safe. Clones share the same
/// connection pool, configuration, and cookie jar.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl HttpClient {
    /// Create a builder for configuring a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Get the client's configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// The cookie jar, when cookies are enabled.
    pub fn cookie_jar(&self) -> Option<&CookieJar> {
        self.inner.cookie_jar.as_deref()
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl AsRef<str>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(self.clone(), url.as_ref().to_string())
    }

    /// Get a reference to the underlying reqwest client.
    pub(crate) fn reqwest_client(&self) -> &reqwest::Client {
        &self.inner.client
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .finish()
    }
}
