//! Output sink traits and errors

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives the extracted text of every fetched page
///
/// Sinks are shared by all workers, so implementations must serialize their
/// own writes. A failing sink never stops the crawl; the caller logs the
/// error and moves on.
#[async_trait]
pub trait PageTextSink: Send + Sync {
    /// Records the text of one page
    async fn write_page(&self, url: &str, text: &str) -> OutputResult<()>;

    /// Flushes buffered output
    async fn flush(&self) -> OutputResult<()> {
        Ok(())
    }
}
