//! Handlers for the WABA connection settings.
//!
//! The access token is written only by the `connect_account` action and is
//! never returned; responses carry `has_access_token` instead.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use wabiz_db::models::settings::{SettingsView, UpsertSettings};
use wabiz_db::repositories::SettingsRepo;

use crate::error::AppResult;
use crate::middleware::auth::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/settings
pub async fn get_settings(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::find_by_owner(&state.pool, user.owner_id).await?;
    Ok(Json(DataResponse {
        data: SettingsView::from(settings),
    }))
}

/// PUT /api/v1/settings
pub async fn update_settings(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<UpsertSettings>,
) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::upsert(&state.pool, user.owner_id, &input).await?;
    tracing::info!(owner_id = %user.owner_id, "Settings updated");
    Ok(Json(DataResponse {
        data: SettingsView::from(Some(settings)),
    }))
}

/// DELETE /api/v1/settings
///
/// Forget the connection (token and ids). Idempotent.
pub async fn disconnect(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    let removed = SettingsRepo::delete(&state.pool, user.owner_id).await?;
    tracing::info!(owner_id = %user.owner_id, removed, "WhatsApp account disconnected");
    Ok(StatusCode::NO_CONTENT)
}
