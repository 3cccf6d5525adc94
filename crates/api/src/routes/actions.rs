//! Action handler routes: one POST endpoint per handler, dispatching on the
//! body's `action` field.

use axum::routing::post;
use axum::Router;

use crate::handlers::actions::{meta_ads, whatsapp};
use crate::state::AppState;

/// Action routes mounted at `/actions`.
///
/// ```text
/// POST /whatsapp    -> whatsapp::handle
/// POST /meta_ads    -> meta_ads::handle
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/whatsapp", post(whatsapp::handle))
        .route("/meta_ads", post(meta_ads::handle))
}
