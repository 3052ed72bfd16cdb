//! HTTP face of the ledger.
//!
//! The server half exposes any [`LedgerTransport`] (in practice a
//! [`MemoryLedger`](common::ledger::MemoryLedger) for local development)
//! as JSON endpoints. The client half, [`HttpLedger`], implements
//! [`LedgerTransport`] over those endpoints so the registry can run against
//! a ledger in another process.
//!
//! The calling identity travels in the [`CALLER_HEADER`] header, playing
//! the part of the signing account.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use common::identity::Identity;
use common::ledger::{LedgerError, LedgerTransport};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;

pub mod client;
mod handlers;
pub mod v0;

pub use client::{ApiRequest, HttpLedger};

pub const CALLER_HEADER: &str = "x-ledger-caller";

const API_PREFIX: &str = "/api";
const STATUS_PREFIX: &str = "/_status";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: tracing::Level,
}

/// Shared state for the ledger handlers.
#[derive(Debug, Clone)]
pub struct LedgerState {
    ledger: Arc<dyn LedgerTransport>,
}

impl LedgerState {
    pub fn new(ledger: impl LedgerTransport) -> Self {
        Self {
            ledger: Arc::new(ledger),
        }
    }

    pub fn ledger(&self) -> &dyn LedgerTransport {
        self.ledger.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerServerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire form of a ledger failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A [`LedgerError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiLedgerError(pub LedgerError);

impl From<LedgerError> for ApiLedgerError {
    fn from(e: LedgerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiLedgerError {
    fn into_response(self) -> Response {
        let (status, kind, field) = match &self.0 {
            LedgerError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated", None),
            LedgerError::InvalidInput(field) => {
                (StatusCode::BAD_REQUEST, "invalid_input", Some(field.to_string()))
            }
            LedgerError::AccessDenied { .. } => (StatusCode::FORBIDDEN, "access_denied", None),
            LedgerError::Rejected(_) => (StatusCode::CONFLICT, "rejected", None),
            LedgerError::Unreachable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unreachable", None),
        };
        let message = match &self.0 {
            LedgerError::Rejected(reason) | LedgerError::Unreachable(reason) => reason.clone(),
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                kind: kind.to_string(),
                message,
                field,
            }),
        )
            .into_response()
    }
}

/// Pull the calling identity out of the request headers.
pub fn caller(headers: &http::HeaderMap) -> Result<Identity, ApiLedgerError> {
    let caller = headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| Identity::new(v.trim()))
        .unwrap_or_default();

    if caller.is_empty() {
        return Err(LedgerError::Unauthenticated.into());
    }
    Ok(caller)
}

pub fn router(state: LedgerState, log_level: tracing::Level) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    // API CORS (POST only)
    let api_cors = CorsLayer::new()
        .allow_methods(vec![Method::POST])
        .allow_headers(vec![
            ACCEPT,
            CONTENT_TYPE,
            ORIGIN,
            HeaderName::from_static(CALLER_HEADER),
        ])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .nest(
            STATUS_PREFIX,
            Router::new().route("/livez", get(handlers::livez_handler)),
        )
        .nest(API_PREFIX, v0::router(state.clone()).layer(api_cors))
        .fallback(handlers::not_found_handler)
        .with_state(state)
        .layer(trace_layer)
}

/// Serve the ledger API until `shutdown_rx` fires.
pub async fn run(
    config: Config,
    state: LedgerState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), LedgerServerError> {
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    serve(listener, config.log_level, state, async move {
        let _ = shutdown_rx.changed().await;
    })
    .await
}

/// Serve the ledger API on an already bound listener.
pub async fn serve(
    listener: tokio::net::TcpListener,
    log_level: tracing::Level,
    state: LedgerState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), LedgerServerError> {
    tracing::info!(addr = ?listener.local_addr()?, "ledger API listening");

    axum::serve(listener, router(state, log_level))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
