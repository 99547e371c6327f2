//! File parts for multipart uploads

use crate::error::{ClientError, Result};
use reqwest::multipart::Part;
use std::path::Path;

const FALLBACK_MIME: &str = "application/octet-stream";

/// One file to upload: audio for a new entry or replacement cover art
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl Upload {
    /// Wrap in-memory bytes; the MIME type is sniffed from their header
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime = infer::get(&bytes).map(|kind| kind.mime_type().to_string());
        Self {
            file_name: file_name.into(),
            bytes,
            mime,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Read a file from disk
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn mime(&self) -> &str {
        self.mime.as_deref().unwrap_or(FALLBACK_MIME)
    }

    pub(crate) fn into_part(self) -> Result<Part> {
        let mime = self.mime().to_string();
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&mime)
            .map_err(|e| {
                ClientError::Common(bw_common::Error::InvalidInput(format!(
                    "Invalid MIME type '{}': {}",
                    mime, e
                )))
            })
    }
}
