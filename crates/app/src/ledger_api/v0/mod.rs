use axum::routing::post;
use axum::Router;

use super::LedgerState;

pub mod access;
pub mod files;

pub use access::{AllowRequest, DisallowRequest, ShareAccessRequest};
pub use files::{AddRequest, DisplayRequest};

pub fn router(state: LedgerState) -> Router<LedgerState> {
    Router::new()
        .route("/v0/files/display", post(files::display_handler))
        .route("/v0/files/add", post(files::add_handler))
        .route("/v0/access/list", post(access::list_handler))
        .route("/v0/access/allow", post(access::allow_handler))
        .route("/v0/access/disallow", post(access::disallow_handler))
        .with_state(state)
}
