use axum::routing::{get, post};
use axum::Router;

use crate::handlers::conversations;
use crate::state::AppState;

/// Conversation routes mounted at `/conversations`.
///
/// ```text
/// GET  /              -> list_conversations
/// GET  /{id}          -> get_conversation
/// POST /{id}/read     -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(conversations::list_conversations))
        .route("/{id}", get(conversations::get_conversation))
        .route("/{id}/read", post(conversations::mark_read))
}
