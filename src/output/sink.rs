//! Page text sinks
//!
//! `FileTextSink` appends one framed record per page:
//!
//! ```text
//! URL: https://example.edu/
//! Text:
//! <page text>
//! --------------------------------------------------------------------------------
//! ```

use crate::output::traits::{OutputResult, PageTextSink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Width of the separator line between records
const SEPARATOR_WIDTH: usize = 80;

/// Formats one sink record
pub fn format_record(url: &str, text: &str) -> String {
    format!(
        "URL: {}\nText:\n{}\n{}\n",
        url,
        text,
        "-".repeat(SEPARATOR_WIDTH)
    )
}

/// Appends page text to a file
pub struct FileTextSink {
    path: PathBuf,
    file: tokio::sync::Mutex<File>,
}

impl FileTextSink {
    /// Opens `path` for appending, creating it if needed
    pub async fn open(path: impl AsRef<Path>) -> OutputResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PageTextSink for FileTextSink {
    async fn write_page(&self, url: &str, text: &str) -> OutputResult<()> {
        let record = format_record(url, text);
        // One write per record keeps records whole under concurrent workers
        let mut file = self.file.lock().await;
        file.write_all(record.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> OutputResult<()> {
        let mut file = self.file.lock().await;
        file.flush().await?;
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl PageTextSink for NullSink {
    async fn write_page(&self, _url: &str, _text: &str) -> OutputResult<()> {
        Ok(())
    }
}

/// Keeps records in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every `(url, text)` record written so far
    pub fn records(&self) -> Vec<(String, String)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PageTextSink for MemorySink {
    async fn write_page(&self, url: &str, text: &str) -> OutputResult<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url.to_string(), text.to_string()));
        Ok(())
    }
}
