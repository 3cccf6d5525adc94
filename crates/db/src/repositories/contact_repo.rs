//! Repository for the `contacts` table.

use sqlx::PgPool;
use wabiz_core::types::{DbId, OwnerId};

use crate::models::contact::{Contact, ContactFilter, CreateContact, UpdateContact};

/// Column list for `contacts` queries.
const COLUMNS: &str = "\
    id, owner_id, name, phone, email, tags, opted_in, created_at, updated_at";

/// Unique constraint on `(owner_id, phone)`.
pub const PHONE_CONSTRAINT: &str = "uq_contacts_owner_phone";

/// Provides data access for contacts.
pub struct ContactRepo;

impl ContactRepo {
    /// List contacts matching the filter, alphabetically.
    pub async fn list(
        pool: &PgPool,
        owner_id: OwnerId,
        filter: &ContactFilter,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts \
             WHERE owner_id = $1 \
               AND ($2::TEXT IS NULL OR name ILIKE $2 OR phone ILIKE $2) \
               AND ($3::TEXT IS NULL OR $3 = ANY(tags)) \
             ORDER BY name, id \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(owner_id)
            .bind(&filter.pattern)
            .bind(&filter.tag)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Count contacts matching the filter (ignores limit/offset).
    pub async fn count(
        pool: &PgPool,
        owner_id: OwnerId,
        filter: &ContactFilter,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM contacts \
             WHERE owner_id = $1 \
               AND ($2::TEXT IS NULL OR name ILIKE $2 OR phone ILIKE $2) \
               AND ($3::TEXT IS NULL OR $3 = ANY(tags))",
        )
        .bind(owner_id)
        .bind(&filter.pattern)
        .bind(&filter.tag)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_phone(
        pool: &PgPool,
        owner_id: OwnerId,
        phone: &str,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE owner_id = $1 AND phone = $2");
        sqlx::query_as::<_, Contact>(&query)
            .bind(owner_id)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// Create a contact. Fails with a unique violation on
    /// [`PHONE_CONSTRAINT`] if the phone is already saved.
    pub async fn create(
        pool: &PgPool,
        owner_id: OwnerId,
        dto: &CreateContact,
    ) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (owner_id, name, phone, email, tags, opted_in) \
             VALUES ($1, $2, $3, $4, COALESCE($5, '{{}}'::TEXT[]), COALESCE($6, TRUE)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(owner_id)
            .bind(dto.name.trim())
            .bind(&dto.phone)
            .bind(&dto.email)
            .bind(&dto.tags)
            .bind(dto.opted_in)
            .fetch_one(pool)
            .await
    }

    /// Return the contact for `phone`, creating it if needed.
    ///
    /// An existing contact keeps its name unless it was blank.
    pub async fn find_or_create_by_phone(
        pool: &PgPool,
        owner_id: OwnerId,
        phone: &str,
        name: &str,
    ) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (owner_id, name, phone) VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT {PHONE_CONSTRAINT} DO UPDATE SET \
                 name = CASE WHEN contacts.name = '' THEN EXCLUDED.name ELSE contacts.name END \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(owner_id)
            .bind(name)
            .bind(phone)
            .fetch_one(pool)
            .await
    }

    /// Partially update a contact.
    ///
    /// Uses `COALESCE` so only provided fields are changed.
    pub async fn update(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
        dto: &UpdateContact,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!(
            "UPDATE contacts SET \
                 name     = COALESCE($3, name), \
                 phone    = COALESCE($4, phone), \
                 email    = COALESCE($5, email), \
                 tags     = COALESCE($6, tags), \
                 opted_in = COALESCE($7, opted_in) \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&dto.name)
            .bind(&dto.phone)
            .bind(&dto.email)
            .bind(&dto.tags)
            .bind(dto.opted_in)
            .fetch_optional(pool)
            .await
    }

    /// Delete a contact (its conversation and messages cascade).
    pub async fn delete(pool: &PgPool, owner_id: OwnerId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Opted-in recipients of a broadcast: all contacts, or those carrying
    /// `tag`.
    pub async fn list_broadcast_targets(
        pool: &PgPool,
        owner_id: OwnerId,
        tag: Option<&str>,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts \
             WHERE owner_id = $1 AND opted_in \
               AND ($2::TEXT IS NULL OR $2 = ANY(tags)) \
             ORDER BY id"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(owner_id)
            .bind(tag)
            .fetch_all(pool)
            .await
    }
}
