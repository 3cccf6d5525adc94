//! `POST /api/v1/actions/meta_ads`: Meta ad campaigns on the connected ad
//! account.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use wabiz_core::action::ActionRequest;
use wabiz_core::error::CoreError;
use wabiz_db::models::campaign::CreateAdCampaign;
use wabiz_db::repositories::CampaignRepo;
use wabiz_meta::ads::{ad_statuses, NewAdCampaign};

use super::{parse_request, unknown_action, Connection};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, RequireAuth};
use crate::response::ActionResponse;
use crate::state::AppState;

/// Dispatch a Meta ads action.
pub async fn handle(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let req = parse_request(body)?;
    tracing::debug!(owner_id = %user.owner_id, action = %req.action, "Meta ads action");

    let data = match req.action.as_str() {
        "list_campaigns" => list_campaigns(&state, &user).await?,
        "create_campaign" => create_campaign(&state, &user, &req).await?,
        "update_campaign_status" => update_campaign_status(&state, &user, &req).await?,
        "get_insights" => get_insights(&state, &user, &req).await?,
        other => return Err(unknown_action("meta_ads", other)),
    };

    Ok(Json(ActionResponse::ok(data)))
}

fn validate_status(status: &str) -> AppResult<()> {
    if ad_statuses::ALL.contains(&status) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Invalid campaign status '{status}'. Must be one of: {}",
            ad_statuses::ALL.join(", ")
        ))))
    }
}

async fn list_campaigns(state: &AppState, user: &AuthUser) -> AppResult<Value> {
    let conn = Connection::load(&state.pool, user.owner_id).await?;
    let campaigns = state
        .meta
        .list_ad_campaigns(&conn.access_token, conn.ad_account_id()?)
        .await?;
    serde_json::to_value(campaigns).map_err(|e| AppError::InternalError(e.to_string()))
}

/// Create the campaign on Meta, then keep a local `ad` campaign row with
/// its Meta id so the dashboard lists it next to broadcasts.
async fn create_campaign(
    state: &AppState,
    user: &AuthUser,
    req: &ActionRequest,
) -> AppResult<Value> {
    let name = req.require_str("name")?;
    let objective = req.require_str("objective")?;
    let daily_budget = match req.optional_value("daily_budget") {
        Some(_) => Some(req.require_i64("daily_budget")?),
        None => None,
    };
    if daily_budget.is_some_and(|b| b <= 0) {
        return Err(AppError::Core(CoreError::Validation(
            "daily_budget must be positive".into(),
        )));
    }
    // New campaigns stay paused until someone activates them.
    let status = req.optional_str("status").unwrap_or(ad_statuses::PAUSED);
    validate_status(status)?;

    let conn = Connection::load(&state.pool, user.owner_id).await?;
    let created = state
        .meta
        .create_ad_campaign(
            &conn.access_token,
            conn.ad_account_id()?,
            &NewAdCampaign {
                name,
                objective,
                daily_budget,
                status,
            },
        )
        .await?;

    let campaign = CampaignRepo::create_ad(
        &state.pool,
        user.owner_id,
        &CreateAdCampaign {
            name: name.to_string(),
            meta_campaign_id: created.id.clone(),
            objective: objective.to_string(),
            daily_budget,
            status: status.to_string(),
        },
    )
    .await?;

    tracing::info!(
        owner_id = %user.owner_id,
        campaign_id = campaign.id,
        meta_campaign_id = %created.id,
        "Ad campaign created",
    );
    serde_json::to_value(campaign).map_err(|e| AppError::InternalError(e.to_string()))
}

async fn update_campaign_status(
    state: &AppState,
    user: &AuthUser,
    req: &ActionRequest,
) -> AppResult<Value> {
    let campaign_id = req.require_str("campaign_id")?;
    let status = req.require_str("status")?;
    validate_status(status)?;

    let conn = Connection::load(&state.pool, user.owner_id).await?;
    let ack = state
        .meta
        .update_ad_campaign_status(&conn.access_token, campaign_id, status)
        .await?;

    let mirrored =
        CampaignRepo::update_status_by_meta_id(&state.pool, user.owner_id, campaign_id, status)
            .await?;

    tracing::info!(
        owner_id = %user.owner_id,
        meta_campaign_id = campaign_id,
        status,
        mirrored,
        "Ad campaign status updated",
    );
    Ok(json!({ "updated": ack.success, "status": status }))
}

async fn get_insights(state: &AppState, user: &AuthUser, req: &ActionRequest) -> AppResult<Value> {
    let campaign_id = req.require_str("campaign_id")?;
    let conn = Connection::load(&state.pool, user.owner_id).await?;
    let insights = state
        .meta
        .get_ad_insights(&conn.access_token, campaign_id)
        .await?;
    Ok(Value::Array(insights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn known_statuses_pass() {
        assert!(validate_status("ACTIVE").is_ok());
        assert!(validate_status("PAUSED").is_ok());
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        assert_matches!(
            validate_status("ARCHIVED"),
            Err(AppError::Core(CoreError::Validation(msg))) if msg.contains("ACTIVE, PAUSED")
        );
    }
}
