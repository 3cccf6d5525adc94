//! Route definitions for flow documents.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::flows;
use crate::state::AppState;

/// Flow routes mounted at `/flows`.
///
/// ```text
/// GET    /                -> list_flows
/// POST   /                -> save_flow
/// POST   /canvas/apply    -> apply_canvas_ops
/// GET    /{id}            -> get_flow
/// DELETE /{id}            -> delete_flow
/// PUT    /{id}/active     -> set_active
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(flows::list_flows).post(flows::save_flow))
        .route("/canvas/apply", post(flows::apply_canvas_ops))
        .route("/{id}", get(flows::get_flow).delete(flows::delete_flow))
        .route("/{id}/active", put(flows::set_active))
}
