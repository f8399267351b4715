//! HTTP transport abstraction
//!
//! The crawler never talks to `reqwest` directly. Every outbound GET goes
//! through [`HttpTransport`], which keeps the robots engine and the page
//! fetcher testable against in-memory sites.
//!
//! Bodies are read only for 2xx responses whose content type the caller
//! accepts. Error pages and unwanted content types come back with their
//! status and `Content-Type` and an empty body, so the size limit never
//! hides an HTTP status.

mod client;

pub use client::{build_http_client, ReqwestTransport};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A fully buffered HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Raw `Content-Type` header value, if present
    pub content_type: Option<String>,

    /// Response body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a 200 response with an HTML content type
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into().into_bytes(),
        }
    }

    /// Creates a 200 plain-text response
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("text/plain".to_string()),
            body: body.into().into_bytes(),
        }
    }

    /// Creates an empty response with the given status
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Checks whether a `Content-Type` value denotes an HTML document
///
/// # Examples
///
/// ```
/// use web_census::crawler::is_html_content_type;
///
/// assert!(is_html_content_type("text/html; charset=utf-8"));
/// assert!(is_html_content_type("application/xhtml+xml"));
/// assert!(!is_html_content_type("application/pdf"));
/// ```
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Which successful responses get their body read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    /// Every content type
    Any,

    /// HTML only; a missing `Content-Type` counts as HTML
    Html,
}

impl Accept {
    /// Returns true if a body with this content type should be read
    pub fn admits(&self, content_type: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Html => content_type.map_or(true, is_html_content_type),
        }
    }

    /// Returns true if the body of a response with this head should be read
    pub fn wants_body(&self, status: u16, content_type: Option<&str>) -> bool {
        (200..300).contains(&status) && self.admits(content_type)
    }
}

/// Transport-level failures, before any HTTP status is known
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("transport error: {0}")]
    Other(String),
}

/// Performs HTTP GET requests on behalf of the crawler
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetches `url`, giving up after `timeout`
    /// GETs `url` within `timeout`
    ///
    /// The body is read, under the size limit, only when
    /// [`Accept::wants_body`] holds. Otherwise it is returned empty.
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
        accept: Accept,
    ) -> Result<HttpResponse, TransportError>;
}
