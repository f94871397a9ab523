//! Route definitions for bid requests and bid responses addressed by their
//! own ids.

use axum::routing::post;
use axum::Router;

use crate::handlers::bid;
use crate::state::AppState;

/// ```text
/// POST   /bid-requests/{id}/response   -> submit_response
/// POST   /bid-requests/{id}/withdraw   -> withdraw
/// POST   /bid-responses/{id}/accept    -> accept
/// POST   /bid-responses/{id}/reject    -> reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bid-requests/{id}/response", post(bid::submit_response))
        .route("/bid-requests/{id}/withdraw", post(bid::withdraw))
        .route("/bid-responses/{id}/accept", post(bid::accept))
        .route("/bid-responses/{id}/reject", post(bid::reject))
}
