use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use common::identity::Identity;
use common::ledger::LedgerError;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::ledger_api::client::ApiRequest;
use crate::ledger_api::{caller, ApiLedgerError, LedgerState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayRequest {
    pub owner: Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRequest {
    pub owner: Identity,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddResponse {
    pub owner: Identity,
    pub url: String,
}

pub async fn display_handler(
    State(state): State<LedgerState>,
    headers: HeaderMap,
    Json(req): Json<DisplayRequest>,
) -> Result<impl IntoResponse, ApiLedgerError> {
    let caller = caller(&headers)?;
    if req.owner.is_empty() {
        return Err(LedgerError::InvalidInput("owner").into());
    }

    let files = state.ledger().display(&caller, &req.owner).await?;

    Ok((http::StatusCode::OK, Json(DisplayResponse { files })))
}

pub async fn add_handler(
    State(state): State<LedgerState>,
    headers: HeaderMap,
    Json(req): Json<AddRequest>,
) -> Result<impl IntoResponse, ApiLedgerError> {
    let caller = caller(&headers)?;
    if req.owner.is_empty() {
        return Err(LedgerError::InvalidInput("owner").into());
    }
    if req.url.trim().is_empty() {
        return Err(LedgerError::InvalidInput("url").into());
    }

    state.ledger().add(&caller, &req.owner, &req.url).await?;
    tracing::info!(%caller, owner = %req.owner, url = %req.url, "file added");

    Ok((
        http::StatusCode::OK,
        Json(AddResponse {
            owner: req.owner,
            url: req.url,
        }),
    ))
}

impl ApiRequest for DisplayRequest {
    type Response = DisplayResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/files/display")?;
        Ok(client.post(full_url).json(&self))
    }
}

impl ApiRequest for AddRequest {
    type Response = AddResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/files/add")?;
        Ok(client.post(full_url).json(&self))
    }
}
