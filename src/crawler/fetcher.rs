//! Page fetcher
//!
//! This module performs one politeness-checked page fetch:
//! - Bounding simultaneous fetches with a semaphore
//! - Waiting the configured per-request delay
//! - Consulting robots.txt
//! - Applying the status and content-type policy
//! - Classifying failures

use crate::config::RunLimits;
use crate::robots::RobotsPolicy;
use crate::state::JobOutcome;
use crate::transport::{is_html_content_type, Accept, HttpTransport, TransportError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

/// Why a page could not be turned into document text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("disallowed by robots.txt")]
    RobotsDenied,

    #[error("HTTP {status}")]
    HttpError { status: u16 },

    #[error("unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns true if the failure is recorded as a broken page
    ///
    /// Policy skips (robots.txt, content type, size) are not broken pages.
    pub fn counts_as_broken(&self) -> bool {
        matches!(
            self,
            Self::HttpError { .. } | Self::Timeout | Self::Network(_) | Self::InvalidUrl(_)
        )
    }

    /// Maps the failure onto the job outcome it produces
    pub fn outcome(&self) -> JobOutcome {
        match self {
            Self::RobotsDenied => JobOutcome::RobotsDenied,
            Self::UnsupportedContentType { .. } | Self::BodyTooLarge { .. } => {
                JobOutcome::PolicySkip
            }
            _ => JobOutcome::Broken,
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout => Self::Timeout,
            TransportError::BodyTooLarge { limit } => Self::BodyTooLarge { limit },
            TransportError::Connect(message) | TransportError::Other(message) => {
                Self::Network(message)
            }
        }
    }
}

/// Fetches pages on behalf of crawl workers
pub struct PageFetcher {
    transport: Arc<dyn HttpTransport>,
    robots: Arc<RobotsPolicy>,
    limiter: Arc<Semaphore>,
    delay: Duration,
    timeout: Duration,
    robots_agent: String,
}

impl PageFetcher {
    /// Creates a fetcher whose limiter admits `limits.concurrency()` fetches
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        robots: Arc<RobotsPolicy>,
        limits: &RunLimits,
    ) -> Self {
        Self {
            transport,
            robots,
            limiter: Arc::new(Semaphore::new(limits.concurrency())),
            delay: limits.request_delay(),
            timeout: limits.page_timeout(),
            robots_agent: limits.robots_agent().to_string(),
        }
    }

    /// Shares the robots policy, e.g. for reporting
    pub fn robots(&self) -> &Arc<RobotsPolicy> {
        &self.robots
    }

    /// Fetches `url` and returns its body as text
    ///
    /// # Request Flow
    ///
    /// 1. Acquire a limiter permit (held until the body is read)
    /// 2. Sleep the per-request delay
    /// 3. robots.txt denies -> `RobotsDenied`
    /// 4. GET with the page timeout; the body is only read for 2xx HTML
    /// 5. Non-2xx -> `HttpError`, whatever the body size
    /// 6. Non-HTML `Content-Type` -> `UnsupportedContentType`
    ///    (a missing header is treated as HTML)
    /// 7. Decode the body, replacing invalid UTF-8
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| FetchError::Network("fetch limiter closed".to_string()))?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if !self.robots.allowed_url(url, &self.robots_agent).await {
            return Err(FetchError::RobotsDenied);
        }

        let response = self
            .transport
            .get(url.as_str(), self.timeout, Accept::Html)
            .await?;

        if !response.is_success() {
            return Err(FetchError::HttpError {
                status: response.status,
            });
        }

        if let Some(content_type) = &response.content_type {
            if !is_html_content_type(content_type) {
                return Err(FetchError::UnsupportedContentType {
                    content_type: content_type.clone(),
                });
            }
        }

        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }
}
