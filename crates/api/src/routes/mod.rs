pub mod actions;
pub mod campaigns;
pub mod contacts;
pub mod conversations;
pub mod flows;
pub mod health;
pub mod settings;
pub mod templates;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /flows                               list, save (GET, POST)
/// /flows/canvas/apply                  apply editor ops, unsaved (POST)
/// /flows/{id}                          get, delete
/// /flows/{id}/active                   toggle active (PUT)
///
/// /contacts                            list, create
/// /contacts/{id}                       get, update, delete
///
/// /conversations                       inbox (GET)
/// /conversations/{id}                  conversation + messages (GET)
/// /conversations/{id}/read             reset unread count (POST)
///
/// /templates                           list, create draft
/// /templates/{id}                      get, update, delete
///
/// /campaigns                           list (?kind=), create broadcast
/// /campaigns/{id}                      get, delete
///
/// /settings                            get, update, disconnect
///
/// /actions/whatsapp                    { action, ...params } (POST)
/// /actions/meta_ads                    { action, ...params } (POST)
/// ```
///
/// Mounted separately at the root: `/health` and `/webhooks/whatsapp`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/flows", flows::router())
        .nest("/contacts", contacts::router())
        .nest("/conversations", conversations::router())
        .nest("/templates", templates::router())
        .nest("/campaigns", campaigns::router())
        .nest("/settings", settings::router())
        .nest("/actions", actions::router())
}
