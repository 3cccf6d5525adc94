//! Repository for the `messages` table.

use sqlx::PgPool;
use wabiz_core::types::{DbId, OwnerId};

use crate::models::message::{CreateMessage, Message};

/// Column list for `messages` queries.
const COLUMNS: &str = "\
    id, owner_id, conversation_id, direction, message_type, body, \
    wa_message_id, status, error_message, created_at, updated_at";

/// Provides data access for messages.
pub struct MessageRepo;

impl MessageRepo {
    /// Messages of one conversation, oldest first.
    pub async fn list_for_conversation(
        pool: &PgPool,
        owner_id: OwnerId,
        conversation_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE conversation_id = $1 AND owner_id = $2 \
             ORDER BY created_at, id \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        owner_id: OwnerId,
        dto: &CreateMessage,
    ) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages \
                 (owner_id, conversation_id, direction, message_type, body, \
                  wa_message_id, status, error_message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(owner_id)
            .bind(dto.conversation_id)
            .bind(dto.direction)
            .bind(dto.message_type)
            .bind(&dto.body)
            .bind(&dto.wa_message_id)
            .bind(dto.status)
            .bind(&dto.error_message)
            .fetch_one(pool)
            .await
    }

    /// Look up a message by its WhatsApp id (webhook status callbacks).
    pub async fn find_by_wa_message_id(
        pool: &PgPool,
        wa_message_id: &str,
    ) -> Result<Option<Message>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE wa_message_id = $1");
        sqlx::query_as::<_, Message>(&query)
            .bind(wa_message_id)
            .fetch_optional(pool)
            .await
    }

    /// Set the delivery status (and optional error) of a message.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        error_message: Option<&str>,
    ) -> Result<Option<Message>, sqlx::Error> {
        let query = format!(
            "UPDATE messages SET status = $2, error_message = COALESCE($3, error_message) \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .bind(status)
            .bind(error_message)
            .fetch_optional(pool)
            .await
    }
}
