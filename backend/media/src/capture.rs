//! File-based capture surface: turns a scanned or photographed document on
//! disk into an [`ImagePayload`].

use std::path::{Path, PathBuf};

use bytes::Bytes;
use govsync_core::ImagePayload;
use thiserror::Error;
use tracing::{debug, info};

use crate::mime_detect::{detect_mime_type, is_supported_image, sniff_mime_type};

/// Upper bound on an inline image request.
pub use govsync_config::defaults::DEFAULT_MAX_IMAGE_BYTES;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is empty")]
    Empty(PathBuf),

    #[error("{path} is {size} bytes; the limit is {limit} bytes")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{path} is {mime}, which cannot be analyzed (use JPEG, PNG, WebP or HEIC)")]
    UnsupportedType { path: PathBuf, mime: String },
}

/// Reads captured documents from the filesystem.
#[derive(Debug, Clone)]
pub struct FileCapture {
    max_bytes: u64,
}

impl FileCapture {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Read and classify the image at `path`.
    pub async fn capture(&self, path: &Path) -> Result<ImagePayload, CaptureError> {
        let io_err = |source| CaptureError::Io {
            path: path.to_path_buf(),
            source,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
        let size = metadata.len();
        if size == 0 {
            return Err(CaptureError::Empty(path.to_path_buf()));
        }
        if size > self.max_bytes {
            return Err(CaptureError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_bytes,
            });
        }

        let data = tokio::fs::read(path).await.map_err(io_err)?;
        let mime = sniff_mime_type(&data).unwrap_or_else(|| detect_mime_type(path));
        debug!(path = %path.display(), mime, size, "Classified captured file");

        if !is_supported_image(mime) {
            return Err(CaptureError::UnsupportedType {
                path: path.to_path_buf(),
                mime: mime.to_string(),
            });
        }

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        info!(source = %source, mime, size, "Captured document image");
        Ok(ImagePayload::new(source, mime, Bytes::from(data)))
    }
}

impl Default for FileCapture {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_BYTES)
    }
}
