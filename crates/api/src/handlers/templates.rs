//! Handlers for local message template drafts.
//!
//! Submission to Meta and status sync go through the `whatsapp` action
//! handler (`submit_template`, `sync_templates`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use wabiz_core::error::CoreError;
use wabiz_core::template::{normalize_category, statuses, validate_template_name};
use wabiz_core::types::DbId;
use wabiz_db::models::template::{CreateTemplate, UpdateTemplate};
use wabiz_db::repositories::TemplateRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Template",
        id,
    })
}

/// GET /api/v1/templates
pub async fn list_templates(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let templates = TemplateRepo::list(&state.pool, user.owner_id).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// GET /api/v1/templates/{id}
pub async fn get_template(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::find_by_id(&state.pool, user.owner_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: template }))
}

/// POST /api/v1/templates
pub async fn create_template(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(mut input): Json<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    validate_template_name(&input.name)?;
    input.category = normalize_category(&input.category)?.to_string();

    let template = TemplateRepo::create(&state.pool, user.owner_id, &input).await?;
    tracing::info!(
        owner_id = %user.owner_id,
        template_id = template.id,
        name = %template.name,
        "Template draft created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// PUT /api/v1/templates/{id}
///
/// Only drafts and rejected templates can be edited; anything Meta is
/// reviewing or has approved is frozen.
pub async fn update_template(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    let existing = TemplateRepo::find_by_id(&state.pool, user.owner_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if existing.status != statuses::DRAFT && existing.status != statuses::REJECTED {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Template '{}' is {} and can no longer be edited",
            existing.name, existing.status
        ))));
    }

    if let Some(name) = input.name.as_deref() {
        validate_template_name(name)?;
    }
    if let Some(category) = input.category.as_deref() {
        input.category = Some(normalize_category(category)?.to_string());
    }

    let template = TemplateRepo::update(&state.pool, user.owner_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/templates/{id}
///
/// Removes the local copy only; templates already on Meta stay there.
pub async fn delete_template(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TemplateRepo::delete(&state.pool, user.owner_id, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
