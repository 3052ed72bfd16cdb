use async_trait::async_trait;
use common::identity::Identity;
use common::ledger::{AccessGrant, LedgerError, LedgerTransport};
use reqwest::{header::HeaderMap, header::HeaderValue, Client};
use url::Url;

use super::error::ApiError;
use super::ApiRequest;
use crate::ledger_api::v0::{AddRequest, AllowRequest, DisallowRequest, DisplayRequest, ShareAccessRequest};
use crate::ledger_api::CALLER_HEADER;

/// [`LedgerTransport`] over the ledger HTTP API.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    pub remote: Url,
    client: Client,
}

impl HttpLedger {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&self, caller: &Identity, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request
            .build_request(&self.remote, &self.client)?
            .header(CALLER_HEADER, caller.as_str());
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(response.status(), response.text().await?))
        }
    }
}

#[async_trait]
impl LedgerTransport for HttpLedger {
    async fn display(&self, caller: &Identity, owner: &Identity) -> Result<Vec<String>, LedgerError> {
        let request = DisplayRequest {
            owner: owner.clone(),
        };
        self.call(caller, request)
            .await
            .map(|r| r.files)
            .map_err(|e| e.into_ledger_error(Some(owner)))
    }

    async fn share_access(&self, caller: &Identity) -> Result<Vec<AccessGrant>, LedgerError> {
        self.call(caller, ShareAccessRequest::default())
            .await
            .map(|r| r.grants)
            .map_err(|e| e.into_ledger_error(None))
    }

    async fn add(&self, caller: &Identity, owner: &Identity, url: &str) -> Result<(), LedgerError> {
        let request = AddRequest {
            owner: owner.clone(),
            url: url.to_string(),
        };
        self.call(caller, request)
            .await
            .map(|_| ())
            .map_err(|e| e.into_ledger_error(Some(owner)))
    }

    async fn allow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError> {
        let request = AllowRequest { user: user.clone() };
        self.call(caller, request)
            .await
            .map(|_| ())
            .map_err(|e| e.into_ledger_error(None))
    }

    async fn disallow(&self, caller: &Identity, user: &Identity) -> Result<(), LedgerError> {
        let request = DisallowRequest { user: user.clone() };
        self.call(caller, request)
            .await
            .map(|_| ())
            .map_err(|e| e.into_ledger_error(None))
    }
}
