//! Conversation models.
//!
//! One conversation per `(owner, contact)`; it carries the latest message
//! preview and an unread counter for the inbox list.

use serde::Serialize;
use sqlx::FromRow;
use wabiz_core::types::{DbId, OwnerId, Timestamp};

/// A row from the `conversations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Conversation {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub contact_id: DbId,
    pub last_message: Option<String>,
    pub last_message_at: Option<Timestamp>,
    pub unread_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Inbox row: a conversation joined with its contact.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationWithContact {
    pub id: DbId,
    pub contact_id: DbId,
    pub contact_name: String,
    pub contact_phone: String,
    pub last_message: Option<String>,
    pub last_message_at: Option<Timestamp>,
    pub unread_count: i32,
}
