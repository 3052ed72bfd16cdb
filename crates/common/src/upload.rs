//! Content-hosting upload seam.
//!
//! An [`Uploader`] takes file bytes and hands back a stable retrieval URL.
//! The registry treats that URL as an opaque string to register on the
//! ledger; the pinning protocol behind it is not our concern.

use std::fmt::Debug;

use async_trait::async_trait;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Nothing to upload
    #[error("no file selected")]
    NoFile,
    /// The uploader is missing credentials or other configuration
    #[error("uploader not configured: {0}")]
    NotConfigured(String),
    /// The upload service failed; the reason is informational only
    #[error("upload failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Uploader: Send + Sync + Debug + 'static {
    /// Upload `data` under the display name `name` and return its URL.
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<String, UploadError>;
}

#[async_trait]
impl<T: Uploader + ?Sized> Uploader for std::sync::Arc<T> {
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<String, UploadError> {
        (**self).upload(name, data).await
    }
}
