//! Route definitions for the `/projects` resource and everything scoped to
//! a project.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{assignment, bid, project, quote};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// POST   /{id}/transition           -> transition
/// PUT    /{id}/management-type      -> set_management_type
/// GET    /{id}/team                 -> team
/// GET    /{id}/assignments          -> list
/// POST   /{id}/assignments          -> assign
/// GET    /{id}/bids                 -> list_for_project
/// POST   /{id}/bids                 -> send
/// GET    /{id}/quote                -> get
/// POST   /{id}/quote                -> submit
/// PUT    /{id}/quote                -> update
/// POST   /{id}/quote/accept         -> accept
/// POST   /{id}/quote/reject         -> reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(project::create))
        .route("/{id}", get(project::get_by_id))
        .route("/{id}/transition", post(project::transition))
        .route("/{id}/management-type", put(project::set_management_type))
        .route("/{id}/team", get(assignment::team))
        .route(
            "/{id}/assignments",
            get(assignment::list).post(assignment::assign),
        )
        .route("/{id}/bids", get(bid::list_for_project).post(bid::send))
        .route(
            "/{id}/quote",
            get(quote::get).post(quote::submit).put(quote::update),
        )
        .route("/{id}/quote/accept", post(quote::accept))
        .route("/{id}/quote/reject", post(quote::reject))
}
