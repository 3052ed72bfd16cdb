//! Pinata-backed [`Uploader`].
//!
//! Files are pinned with `pinFileToIPFS` and addressed through the public
//! gateway, so the URL registered on the ledger is `{gateway}/ipfs/{cid}`.

use async_trait::async_trait;
use common::upload::{UploadError, Uploader};
use reqwest::{multipart, Client};
use serde::Deserialize;
use url::Url;

use crate::state::{AppConfig, StateError};

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Clone)]
pub struct PinataUploader {
    client: Client,
    endpoint: Url,
    gateway: Url,
    jwt: Option<String>,
}

impl PinataUploader {
    pub fn new(endpoint: Url, gateway: Url, jwt: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            gateway,
            jwt,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, StateError> {
        Ok(Self::new(
            Url::parse(&config.pinata_endpoint)?,
            Url::parse(&config.pinata_gateway)?,
            config.pinata_jwt(),
        ))
    }

    /// Retrieval URL for a pinned content hash
    pub fn gateway_url(&self, hash: &str) -> String {
        format!("{}/ipfs/{}", self.gateway.as_str().trim_end_matches('/'), hash)
    }
}

#[async_trait]
impl Uploader for PinataUploader {
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<String, UploadError> {
        let jwt = self
            .jwt
            .as_deref()
            .filter(|jwt| !jwt.trim().is_empty())
            .ok_or_else(|| UploadError::NotConfigured("missing pinata jwt".to_string()))?;

        let mime_type = mime_guess::from_path(name).first_or_octet_stream().to_string();
        let size = data.len();
        let part = multipart::Part::bytes(data)
            .file_name(name.to_string())
            .mime_str(&mime_type)
            .map_err(|e| UploadError::Failed(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        tracing::debug!(name, size, %mime_type, "pinning file");
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Failed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Failed(format!("HTTP status {}: {}", status, body)));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Failed(e.to_string()))?;

        let url = self.gateway_url(&pinned.ipfs_hash);
        tracing::info!(name, %url, "file pinned");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploader(jwt: Option<&str>) -> PinataUploader {
        PinataUploader::new(
            Url::parse("http://127.0.0.1:1/pin").unwrap(),
            Url::parse("https://gateway.pinata.cloud/").unwrap(),
            jwt.map(str::to_string),
        )
    }

    #[test]
    fn test_gateway_url() {
        assert_eq!(
            uploader(None).gateway_url("QmHash"),
            "https://gateway.pinata.cloud/ipfs/QmHash"
        );
    }

    #[tokio::test]
    async fn test_missing_jwt_fails_before_request() {
        let err = uploader(None).upload("a.txt", b"hi".to_vec()).await.unwrap_err();
        assert!(matches!(err, UploadError::NotConfigured(_)));

        let err = uploader(Some("  ")).upload("a.txt", b"hi".to_vec()).await.unwrap_err();
        assert!(matches!(err, UploadError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_opaque_failure() {
        let err = uploader(Some("jwt")).upload("a.txt", b"hi".to_vec()).await.unwrap_err();
        assert!(matches!(err, UploadError::Failed(_)));
    }

    #[test]
    fn test_from_config_defaults() {
        let uploader = PinataUploader::from_config(&AppConfig::default()).unwrap();
        assert_eq!(uploader.endpoint.as_str(), crate::state::DEFAULT_PINATA_ENDPOINT);
    }
}
