//! Tools for fetching data from a URL.
//!
//! This module is subdivided into several modules, each responsible for fetching a specific type of data:
//! the play-options metadata, the master playlist, and the thumbnail.
//! The HTTP transport itself sits behind the [`Transport`] trait.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;

pub mod manifest;
pub mod metadata;
pub mod thumbnail;

/// The browser-like user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Firefox/91.0";

/// The status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The status code.
    pub status: u16,
    /// The raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response from a status and a textual body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is `200 OK`.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// The body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs single GET requests.
///
/// A response with any status is a success here; only failures to reach the
/// server at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET request to `url` with the given headers.
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse>;
}

/// Builds the headers shared by every request.
pub fn base_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(USER_AGENT, value);
    headers
}

/// The [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl fmt::Display for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpFetcher")
    }
}

impl HttpFetcher {
    /// Creates a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpFetcher {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse> {
        log::trace!("GET {}", url);

        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport used by the unit tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers from a fixed table; unknown URLs get a 404.
    #[derive(Default)]
    pub struct FakeTransport {
        routes: HashMap<String, HttpResponse>,
        pub requests: Mutex<Vec<(String, HeaderMap)>>,
    }

    impl FakeTransport {
        pub fn route(mut self, url: &str, status: u16, body: &str) -> Self {
            self.routes
                .insert(url.to_string(), HttpResponse::new(status, body));
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _)| url.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), headers));
            Ok(self
                .routes
                .get(url)
                .cloned()
                .unwrap_or_else(|| HttpResponse::new(404, "")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_headers_carry_user_agent() {
        let headers = base_headers("agent/1.0");
        assert_eq!(headers[USER_AGENT], "agent/1.0");
    }

    #[test]
    fn invalid_user_agent_falls_back_to_default() {
        let headers = base_headers("bad\nagent");
        assert_eq!(headers[USER_AGENT], DEFAULT_USER_AGENT);
    }

    #[test]
    fn response_text_is_lossy() {
        let response = HttpResponse::new(200, vec![b'o', b'k', 0xff]);
        assert!(response.is_ok());
        assert_eq!(response.text(), "ok\u{fffd}");
    }
}
