use crate::identity::IdentitySnapshot;
use crate::ledger::{LedgerError, LedgerTransport};
use crate::upload::{UploadError, Uploader};

use super::{Refreshed, Registry, RegistryError};

/// A file registered on the ledger, together with the listing fetched
/// right after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAdded {
    pub url: String,
    /// The own-files refresh that followed the mutation
    pub files: Result<Refreshed<Vec<String>>, LedgerError>,
}

impl<T: LedgerTransport> Registry<T> {
    /// Register `url` as a file owned by the active identity, then
    /// resynchronize the own-files slot.
    ///
    /// If the mutation fails the cache is left untouched and the error is
    /// returned; no refresh is issued.
    pub async fn add_file(&self, url: &str) -> Result<FileAdded, LedgerError> {
        let snapshot = self.connected_snapshot()?;
        self.add_file_for(&snapshot, url).await
    }

    /// Upload `data` through `uploader` and register the resulting URL.
    ///
    /// Preconditions are checked before the upload so nothing is pinned for
    /// a caller who could not register it anyway. The file is registered
    /// for the identity that started the upload; if the identity changed
    /// while the upload was in flight nothing is registered and
    /// `Refreshed::Superseded` is returned.
    pub async fn upload_and_add<U: Uploader + ?Sized>(
        &self,
        uploader: &U,
        name: &str,
        data: Vec<u8>,
    ) -> Result<Refreshed<FileAdded>, RegistryError> {
        let snapshot = self.connected_snapshot()?;
        if data.is_empty() {
            return Err(UploadError::NoFile.into());
        }

        let url = uploader.upload(name, data).await.map_err(|e| {
            tracing::warn!(name, "upload failed: {}", e);
            e
        })?;
        tracing::info!(name, url = %url, "uploaded file");

        if self.snapshot().epoch != snapshot.epoch {
            tracing::warn!(
                identity = %snapshot.identity,
                url = %url,
                "identity changed during upload; not registering"
            );
            return Ok(Refreshed::Superseded);
        }

        Ok(Refreshed::Updated(self.add_file_for(&snapshot, &url).await?))
    }

    async fn add_file_for(
        &self,
        snapshot: &IdentitySnapshot,
        url: &str,
    ) -> Result<FileAdded, LedgerError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(LedgerError::InvalidInput("url"));
        }

        self.gateway
            .register_file(&snapshot.identity, &snapshot.identity, url)
            .await?;
        tracing::info!(owner = %snapshot.identity, url, "file saved to ledger");

        let files = self.refresh_own_files_for(snapshot).await;
        Ok(FileAdded {
            url: url.to_string(),
            files,
        })
    }
}
