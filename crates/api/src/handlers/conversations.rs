//! Handlers for the shared inbox.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use wabiz_core::error::CoreError;
use wabiz_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use wabiz_core::types::DbId;
use wabiz_db::models::conversation::Conversation;
use wabiz_db::models::message::Message;
use wabiz_db::repositories::{ConversationRepo, MessageRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAuth;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A conversation with one page of its messages (oldest first).
#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Conversation",
        id,
    })
}

/// GET /api/v1/conversations
pub async fn list_conversations(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let items = ConversationRepo::list_with_contacts(
        &state.pool,
        user.owner_id,
        clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/conversations/{id}
pub async fn get_conversation(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let conversation = ConversationRepo::find_by_id(&state.pool, user.owner_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let messages = MessageRepo::list_for_conversation(
        &state.pool,
        user.owner_id,
        id,
        clamp_limit(params.limit, MAX_LIST_LIMIT, MAX_LIST_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse {
        data: ConversationDetail {
            conversation,
            messages,
        },
    }))
}

/// POST /api/v1/conversations/{id}/read
pub async fn mark_read(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let conversation = ConversationRepo::mark_read(&state.pool, user.owner_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: conversation }))
}
