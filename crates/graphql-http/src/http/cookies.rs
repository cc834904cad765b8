//! Resettable cookie storage shared with the HTTP client.

use std::sync::Arc;

use http::HeaderValue;
use parking_lot::RwLock;
use reqwest::cookie::{CookieStore, Jar};
use url::Url;

/// A cookie store that can be emptied without rebuilding the HTTP client.
///
/// `reqwest::cookie::Jar` has no way to remove cookies, so the jar lives
/// behind a lock and clearing swaps in a fresh one.
#[derive(Debug, Default)]
pub struct CookieJar {
    inner: RwLock<Arc<Jar>>,
}

impl CookieJar {
    /// Create an empty cookie jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a simple `name=value` cookie for `url`.
    pub fn add_cookie(&self, name: &str, value: &str, url: &Url) {
        self.inner
            .read()
            .add_cookie_str(&format!("{name}={value}"), url);
    }

    /// Drop every stored cookie.
    pub fn clear(&self) {
        *self.inner.write() = Arc::new(Jar::default());
    }

    /// The `Cookie` header value that would be sent to `url`, if any.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }
}

impl CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.inner.read().set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.inner.read().cookies(url)
    }
}
