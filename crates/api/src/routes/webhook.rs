use axum::routing::get;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Meta webhook routes mounted at `/webhooks` (no bearer auth; POSTs are
/// authenticated by signature).
///
/// ```text
/// GET  /whatsapp    -> verify
/// POST /whatsapp    -> receive
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/whatsapp", get(webhook::verify).post(webhook::receive))
}
