//! `reqwest`-backed transport
//!
//! This module handles the real network side of the crawler:
//! - Building the HTTP client with a descriptive user agent
//! - Applying per-request timeouts
//! - Reading bodies only for accepted 2xx responses
//! - Enforcing the response body size limit while streaming
//! - Classifying `reqwest` failures into [`TransportError`]

use crate::config::UserAgentConfig;
use crate::transport::{Accept, HttpResponse, HttpTransport, TransportError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use web_census::config::UserAgentConfig;
/// use web_census::transport::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Transport that performs real HTTP requests
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    max_body_bytes: usize,
}

impl ReqwestTransport {
    /// Wraps an existing client
    ///
    /// # Arguments
    ///
    /// * `client` - The client to send requests with
    /// * `max_body_bytes` - Responses larger than this are rejected
    pub fn new(client: Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    /// Builds a client from the user agent configuration and wraps it
    pub fn from_config(
        config: &UserAgentConfig,
        max_body_bytes: usize,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, max_body_bytes))
    }

    fn too_large(&self) -> TransportError {
        TransportError::BodyTooLarge {
            limit: self.max_body_bytes,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
        accept: Accept,
    ) -> Result<HttpResponse, TransportError> {
        let mut response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Status and content type decide before any size check
        if !accept.wants_body(status, content_type.as_deref()) {
            return Ok(HttpResponse {
                status,
                content_type,
                body: Vec::new(),
            });
        }

        // Reject early when the server announces an oversized body
        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(self.too_large());
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify_error)? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Maps a `reqwest` error onto the transport taxonomy
fn classify_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}
