use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::HttpLedger;
pub use error::ApiError;

/// A typed request against the ledger API.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError>;
}
