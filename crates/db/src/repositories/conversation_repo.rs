//! Repository for the `conversations` table.

use sqlx::PgPool;
use wabiz_core::types::{DbId, OwnerId};

use crate::models::conversation::{Conversation, ConversationWithContact};

/// Column list for `conversations` queries.
const COLUMNS: &str = "\
    id, owner_id, contact_id, last_message, last_message_at, unread_count, \
    created_at, updated_at";

/// Longest preview kept in `last_message`.
const PREVIEW_CHARS: usize = 120;

/// Provides data access for conversations.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Inbox listing, most recent activity first.
    pub async fn list_with_contacts(
        pool: &PgPool,
        owner_id: OwnerId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationWithContact>, sqlx::Error> {
        sqlx::query_as::<_, ConversationWithContact>(
            "SELECT c.id, c.contact_id, ct.name AS contact_name, ct.phone AS contact_phone, \
                    c.last_message, c.last_message_at, c.unread_count \
             FROM conversations c \
             JOIN contacts ct ON ct.id = c.contact_id \
             WHERE c.owner_id = $1 \
             ORDER BY c.last_message_at DESC NULLS LAST, c.id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM conversations WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Record activity on the contact's conversation, creating it on first
    /// contact. Inbound messages bump the unread counter.
    pub async fn touch(
        pool: &PgPool,
        owner_id: OwnerId,
        contact_id: DbId,
        preview: &str,
        inbound: bool,
    ) -> Result<Conversation, sqlx::Error> {
        let query = format!(
            "INSERT INTO conversations (owner_id, contact_id, last_message, last_message_at, unread_count) \
             VALUES ($1, $2, $3, NOW(), $4) \
             ON CONFLICT ON CONSTRAINT uq_conversations_owner_contact DO UPDATE SET \
                 last_message    = EXCLUDED.last_message, \
                 last_message_at = EXCLUDED.last_message_at, \
                 unread_count    = conversations.unread_count + EXCLUDED.unread_count \
             RETURNING {COLUMNS}"
        );
        let preview: String = preview.chars().take(PREVIEW_CHARS).collect();
        sqlx::query_as::<_, Conversation>(&query)
            .bind(owner_id)
            .bind(contact_id)
            .bind(preview)
            .bind(i32::from(inbound))
            .fetch_one(pool)
            .await
    }

    /// Reset the unread counter.
    pub async fn mark_read(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!(
            "UPDATE conversations SET unread_count = 0 \
             WHERE id = $1 AND owner_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }
}
