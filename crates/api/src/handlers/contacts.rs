//! Handlers for the contact book.
//!
//! Phone numbers are normalised to E.164 on the way in; the unique
//! `(owner_id, phone)` constraint surfaces as 409.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use validator::Validate;
use wabiz_core::error::CoreError;
use wabiz_core::phone;
use wabiz_core::search::{clamp_limit, clamp_offset, ilike_pattern, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use wabiz_core::types::DbId;
use wabiz_db::models::contact::{Contact, ContactFilter, CreateContact, UpdateContact};
use wabiz_db::repositories::ContactRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAuth;
use crate::query::ContactListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// One page of contacts plus the total matching the filter.
#[derive(Debug, Serialize)]
pub struct ContactPage {
    pub items: Vec<Contact>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Contact",
        id,
    })
}

/// GET /api/v1/contacts
pub async fn list_contacts(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ContactListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = ContactFilter {
        pattern: ilike_pattern(params.search.as_deref()),
        tag: params.tag.filter(|t| !t.trim().is_empty()),
        limit: clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT),
        offset: clamp_offset(params.offset),
    };

    let items = ContactRepo::list(&state.pool, user.owner_id, &filter).await?;
    let total = ContactRepo::count(&state.pool, user.owner_id, &filter).await?;

    Ok(Json(DataResponse {
        data: ContactPage {
            items,
            total,
            limit: filter.limit,
            offset: filter.offset,
        },
    }))
}

/// GET /api/v1/contacts/{id}
pub async fn get_contact(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let contact = ContactRepo::find_by_id(&state.pool, user.owner_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: contact }))
}

/// POST /api/v1/contacts
pub async fn create_contact(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(mut input): Json<CreateContact>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    input.phone = phone::normalize(&input.phone)?;

    let contact = ContactRepo::create(&state.pool, user.owner_id, &input).await?;
    tracing::info!(owner_id = %user.owner_id, contact_id = contact.id, "Contact created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: contact })))
}

/// PUT /api/v1/contacts/{id}
pub async fn update_contact(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateContact>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(raw) = input.phone.as_deref() {
        input.phone = Some(phone::normalize(raw)?);
    }

    let contact = ContactRepo::update(&state.pool, user.owner_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: contact }))
}

/// DELETE /api/v1/contacts/{id}
pub async fn delete_contact(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ContactRepo::delete(&state.pool, user.owner_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(owner_id = %user.owner_id, contact_id = id, "Contact deleted");
    Ok(StatusCode::NO_CONTENT)
}
