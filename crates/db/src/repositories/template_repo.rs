//! Repository for the `templates` table.

use sqlx::PgPool;
use wabiz_core::template::{statuses, DEFAULT_LANGUAGE};
use wabiz_core::types::{DbId, OwnerId};

use crate::models::template::{CreateTemplate, Template, UpdateTemplate};

/// Column list for `templates` queries.
const COLUMNS: &str = "\
    id, owner_id, name, language, category, components, status, \
    meta_template_id, rejection_reason, created_at, updated_at";

/// Provides data access for message templates.
pub struct TemplateRepo;

impl TemplateRepo {
    pub async fn list(pool: &PgPool, owner_id: OwnerId) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates WHERE owner_id = $1 ORDER BY name, language"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Create a local draft (`status = 'draft'`). `name` and `category` must
    /// already be validated.
    pub async fn create(
        pool: &PgPool,
        owner_id: OwnerId,
        dto: &CreateTemplate,
    ) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (owner_id, name, language, category, components, status) \
             VALUES ($1, $2, $3, $4, COALESCE($5, '[]'::jsonb), $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(owner_id)
            .bind(&dto.name)
            .bind(dto.language.as_deref().unwrap_or(DEFAULT_LANGUAGE))
            .bind(&dto.category)
            .bind(&dto.components)
            .bind(statuses::DRAFT)
            .fetch_one(pool)
            .await
    }

    /// Partially update a template.
    ///
    /// Uses `COALESCE` so only provided fields are changed.
    pub async fn update(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
        dto: &UpdateTemplate,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET \
                 name       = COALESCE($3, name), \
                 language   = COALESCE($4, language), \
                 category   = COALESCE($5, category), \
                 components = COALESCE($6, components) \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&dto.name)
            .bind(&dto.language)
            .bind(&dto.category)
            .bind(&dto.components)
            .fetch_optional(pool)
            .await
    }

    /// Store the Meta id and review status returned on submission.
    pub async fn mark_submitted(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
        meta_template_id: &str,
        status: &str,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET meta_template_id = $3, status = $4, rejection_reason = NULL \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(meta_template_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Mirror a review status from Meta onto the matching local template.
    ///
    /// Returns the number of rows changed (0 when Meta knows a template we
    /// never drafted locally).
    pub async fn update_status_by_name(
        pool: &PgPool,
        owner_id: OwnerId,
        name: &str,
        language: &str,
        status: &str,
        meta_template_id: Option<&str>,
        rejection_reason: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE templates SET \
                 status           = $4, \
                 meta_template_id = COALESCE($5, meta_template_id), \
                 rejection_reason = $6 \
             WHERE owner_id = $1 AND name = $2 AND language = $3",
        )
        .bind(owner_id)
        .bind(name)
        .bind(language)
        .bind(status)
        .bind(meta_template_id)
        .bind(rejection_reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, owner_id: OwnerId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
