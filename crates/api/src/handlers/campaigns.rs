//! Handlers for campaigns.
//!
//! Broadcasts are created here as drafts and sent with the `whatsapp`
//! action `send_broadcast`. Ad campaigns are created through the
//! `meta_ads` action and only listed here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;
use wabiz_core::error::CoreError;
use wabiz_core::messaging::campaign_kinds;
use wabiz_core::types::DbId;
use wabiz_db::models::campaign::CreateBroadcast;
use wabiz_db::repositories::{CampaignRepo, TemplateRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAuth;
use crate::query::CampaignListParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Campaign",
        id,
    })
}

/// GET /api/v1/campaigns
pub async fn list_campaigns(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<CampaignListParams>,
) -> AppResult<impl IntoResponse> {
    let kind = match params.kind.as_deref() {
        None | Some("") => None,
        Some(k @ (campaign_kinds::BROADCAST | campaign_kinds::AD)) => Some(k),
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unknown campaign kind '{other}'"
            )))
        }
    };
    let campaigns = CampaignRepo::list(&state.pool, user.owner_id, kind).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_campaign(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let campaign = CampaignRepo::find_by_id(&state.pool, user.owner_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: campaign }))
}

/// POST /api/v1/campaigns
pub async fn create_broadcast(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateBroadcast>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    TemplateRepo::find_by_id(&state.pool, user.owner_id, input.template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id: input.template_id,
        }))?;

    let campaign = CampaignRepo::create_broadcast(&state.pool, user.owner_id, &input).await?;
    tracing::info!(
        owner_id = %user.owner_id,
        campaign_id = campaign.id,
        template_id = input.template_id,
        "Broadcast campaign created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

/// DELETE /api/v1/campaigns/{id}
pub async fn delete_campaign(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CampaignRepo::delete(&state.pool, user.owner_id, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
