use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use common::identity::Identity;
use common::ledger::{AccessGrant, LedgerError};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::ledger_api::client::ApiRequest;
use crate::ledger_api::{caller, ApiLedgerError, LedgerState};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareAccessRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareAccessResponse {
    pub grants: Vec<AccessGrant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowRequest {
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisallowRequest {
    pub user: Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessResponse {
    pub user: Identity,
    pub access: bool,
}

pub async fn list_handler(
    State(state): State<LedgerState>,
    headers: HeaderMap,
    Json(_req): Json<ShareAccessRequest>,
) -> Result<impl IntoResponse, ApiLedgerError> {
    let caller = caller(&headers)?;
    let grants = state.ledger().share_access(&caller).await?;

    Ok((http::StatusCode::OK, Json(ShareAccessResponse { grants })))
}

pub async fn allow_handler(
    State(state): State<LedgerState>,
    headers: HeaderMap,
    Json(req): Json<AllowRequest>,
) -> Result<impl IntoResponse, ApiLedgerError> {
    let caller = caller(&headers)?;
    if req.user.is_empty() {
        return Err(LedgerError::InvalidInput("user").into());
    }

    state.ledger().allow(&caller, &req.user).await?;
    tracing::info!(%caller, user = %req.user, "access allowed");

    Ok((
        http::StatusCode::OK,
        Json(AccessResponse {
            user: req.user,
            access: true,
        }),
    ))
}

pub async fn disallow_handler(
    State(state): State<LedgerState>,
    headers: HeaderMap,
    Json(req): Json<DisallowRequest>,
) -> Result<impl IntoResponse, ApiLedgerError> {
    let caller = caller(&headers)?;
    if req.user.is_empty() {
        return Err(LedgerError::InvalidInput("user").into());
    }

    state.ledger().disallow(&caller, &req.user).await?;
    tracing::info!(%caller, user = %req.user, "access removed");

    Ok((
        http::StatusCode::OK,
        Json(AccessResponse {
            user: req.user,
            access: false,
        }),
    ))
}

impl ApiRequest for ShareAccessRequest {
    type Response = ShareAccessResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/access/list")?;
        Ok(client.post(full_url).json(&self))
    }
}

impl ApiRequest for AllowRequest {
    type Response = AccessResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/access/allow")?;
        Ok(client.post(full_url).json(&self))
    }
}

impl ApiRequest for DisallowRequest {
    type Response = AccessResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/api/v0/access/disallow")?;
        Ok(client.post(full_url).json(&self))
    }
}
