pub mod bid;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /projects                                      create (client)
/// /projects/{id}                                 get
/// /projects/{id}/transition                      status change (POST)
/// /projects/{id}/management-type                 set management type (PUT)
/// /projects/{id}/team                            team view (GET)
/// /projects/{id}/assignments                     list, assign (admin)
/// /projects/{id}/bids                            list, send (admin)
/// /projects/{id}/quote                           get, submit (POST), update (PUT)
/// /projects/{id}/quote/accept                    accept (client)
/// /projects/{id}/quote/reject                    reject (client)
///
/// /bid-requests/{id}/response                    submit response (specialist)
/// /bid-requests/{id}/withdraw                    withdraw (admin)
/// /bid-responses/{id}/accept                     accept with markup (admin)
/// /bid-responses/{id}/reject                     reject (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .merge(bid::router())
}
