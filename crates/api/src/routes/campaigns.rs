use axum::routing::get;
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Campaign routes mounted at `/campaigns`.
///
/// ```text
/// GET    /        -> list_campaigns (?kind=broadcast|ad)
/// POST   /        -> create_broadcast
/// GET    /{id}    -> get_campaign
/// DELETE /{id}    -> delete_campaign
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(campaigns::list_campaigns).post(campaigns::create_broadcast),
        )
        .route(
            "/{id}",
            get(campaigns::get_campaign).delete(campaigns::delete_campaign),
        )
}
