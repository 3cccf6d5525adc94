//! Handlers for flow documents authored on the canvas.
//!
//! Saving always writes the whole document. The apply endpoint runs editor
//! operations against a posted document without persisting anything; the
//! client saves the result explicitly.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use wabiz_core::error::CoreError;
use wabiz_core::flow::{CanvasOp, FlowCanvas, FlowDraft};
use wabiz_core::types::DbId;
use wabiz_db::models::flow::SaveOutcome;
use wabiz_db::repositories::FlowRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /flows/{id}/active`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Request body for `POST /flows/canvas/apply`.
#[derive(Debug, Deserialize)]
pub struct ApplyCanvasRequest {
    pub document: FlowDraft,
    #[serde(default)]
    pub ops: Vec<CanvasOp>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Flow", id })
}

/// GET /api/v1/flows
pub async fn list_flows(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let flows = FlowRepo::list_by_owner(&state.pool, user.owner_id).await?;
    Ok(Json(DataResponse { data: flows }))
}

/// GET /api/v1/flows/{id}
pub async fn get_flow(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let flow = FlowRepo::find_by_id(&state.pool, user.owner_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: flow }))
}

/// POST /api/v1/flows
///
/// Persist a whole document. Responds 201 when a new row was created
/// (including the disambiguated-name fallback) and 200 on update.
pub async fn save_flow(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(draft): Json<FlowDraft>,
) -> AppResult<impl IntoResponse> {
    // Normalises and validates the name the same way the editor does.
    let draft = FlowCanvas::from_draft(draft).save()?;

    let saved = FlowRepo::save(&state.pool, user.owner_id, &draft, Utc::now())
        .await
        .map_err(|err| match (err, draft.id) {
            (sqlx::Error::RowNotFound, Some(id)) => not_found(id),
            (err, _) => AppError::Database(err),
        })?;

    tracing::info!(
        owner_id = %user.owner_id,
        flow_id = saved.flow.id,
        outcome = ?saved.outcome,
        nodes = saved.flow.nodes.0.len(),
        "Flow saved",
    );

    let status = match saved.outcome {
        SaveOutcome::Updated => StatusCode::OK,
        SaveOutcome::Created | SaveOutcome::Renamed => StatusCode::CREATED,
    };
    Ok((status, Json(DataResponse { data: saved })))
}

/// POST /api/v1/flows/canvas/apply
///
/// Apply editor operations in order and return the resulting document.
/// Does not persist.
pub async fn apply_canvas_ops(
    RequireAuth(_user): RequireAuth,
    Json(input): Json<ApplyCanvasRequest>,
) -> AppResult<impl IntoResponse> {
    let mut canvas = FlowCanvas::from_draft(input.document);
    for op in input.ops {
        canvas.apply(op)?;
    }
    Ok(Json(DataResponse {
        data: canvas.snapshot(),
    }))
}

/// PUT /api/v1/flows/{id}/active
pub async fn set_active(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetActiveRequest>,
) -> AppResult<impl IntoResponse> {
    let flow = FlowRepo::set_active(&state.pool, user.owner_id, id, input.is_active)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(flow_id = id, is_active = flow.is_active, "Flow active flag changed");
    Ok(Json(DataResponse { data: flow }))
}

/// DELETE /api/v1/flows/{id}
pub async fn delete_flow(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !FlowRepo::delete(&state.pool, user.owner_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(owner_id = %user.owner_id, flow_id = id, "Flow deleted");
    Ok(StatusCode::NO_CONTENT)
}
