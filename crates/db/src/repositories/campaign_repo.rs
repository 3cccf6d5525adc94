//! Repository for the `campaigns` table.

use sqlx::PgPool;
use wabiz_core::messaging::{campaign_kinds, campaign_statuses};
use wabiz_core::types::{DbId, OwnerId};

use crate::models::campaign::{Campaign, CreateAdCampaign, CreateBroadcast};

/// Column list for `campaigns` queries.
const COLUMNS: &str = "\
    id, owner_id, name, kind, template_id, target_tag, status, sent_count, \
    failed_count, meta_campaign_id, objective, daily_budget, started_at, \
    completed_at, created_at, updated_at";

/// Provides data access for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// List campaigns, newest first, optionally of one kind.
    pub async fn list(
        pool: &PgPool,
        owner_id: OwnerId,
        kind: Option<&str>,
    ) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns \
             WHERE owner_id = $1 AND ($2::TEXT IS NULL OR kind = $2) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(owner_id)
            .bind(kind)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create_broadcast(
        pool: &PgPool,
        owner_id: OwnerId,
        dto: &CreateBroadcast,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (owner_id, name, kind, template_id, target_tag, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(owner_id)
            .bind(dto.name.trim())
            .bind(campaign_kinds::BROADCAST)
            .bind(dto.template_id)
            .bind(&dto.target_tag)
            .bind(campaign_statuses::DRAFT)
            .fetch_one(pool)
            .await
    }

    pub async fn create_ad(
        pool: &PgPool,
        owner_id: OwnerId,
        dto: &CreateAdCampaign,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns \
                 (owner_id, name, kind, status, meta_campaign_id, objective, daily_budget) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(owner_id)
            .bind(&dto.name)
            .bind(campaign_kinds::AD)
            .bind(&dto.status)
            .bind(&dto.meta_campaign_id)
            .bind(&dto.objective)
            .bind(dto.daily_budget)
            .fetch_one(pool)
            .await
    }

    /// Claim a broadcast for sending.
    ///
    /// Returns `None` when the campaign is missing or already `sending` or
    /// `completed`, so at most one run holds the claim at a time.
    pub async fn start_sending(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET status = $3, started_at = NOW(), sent_count = 0, failed_count = 0 \
             WHERE id = $1 AND owner_id = $2 AND status NOT IN ($3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(campaign_statuses::SENDING)
            .bind(campaign_statuses::COMPLETED)
            .fetch_optional(pool)
            .await
    }

    /// Record the final counters and status of a broadcast run.
    pub async fn finish_sending(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
        sent_count: i32,
        failed_count: i32,
        status: &str,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET \
                 status = $3, sent_count = $4, failed_count = $5, completed_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(status)
            .bind(sent_count)
            .bind(failed_count)
            .fetch_optional(pool)
            .await
    }

    /// Mirror a status change (ad campaigns paused/activated on Meta).
    pub async fn update_status_by_meta_id(
        pool: &PgPool,
        owner_id: OwnerId,
        meta_campaign_id: &str,
        status: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns SET status = $3 WHERE owner_id = $1 AND meta_campaign_id = $2",
        )
        .bind(owner_id)
        .bind(meta_campaign_id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, owner_id: OwnerId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
