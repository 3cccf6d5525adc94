//! Message models and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use wabiz_core::types::{DbId, OwnerId, Timestamp};

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub conversation_id: DbId,
    pub direction: String,
    pub message_type: String,
    pub body: Option<String>,
    pub wa_message_id: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a message.
#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub conversation_id: DbId,
    pub direction: &'static str,
    pub message_type: &'static str,
    pub body: Option<String>,
    pub wa_message_id: Option<String>,
    pub status: &'static str,
    pub error_message: Option<String>,
}
