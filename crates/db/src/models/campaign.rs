//! Campaign models and DTOs.
//!
//! Two kinds share the table: template broadcasts sent from this service
//! (`broadcast`) and Meta ad campaigns mirrored after creation (`ad`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use wabiz_core::types::{DbId, OwnerId, Timestamp};

/// A row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub name: String,
    pub kind: String,
    pub template_id: Option<DbId>,
    pub target_tag: Option<String>,
    pub status: String,
    pub sent_count: i32,
    pub failed_count: i32,
    pub meta_campaign_id: Option<String>,
    pub objective: Option<String>,
    pub daily_budget: Option<i64>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a broadcast campaign.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBroadcast {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub template_id: DbId,
    /// Only contacts carrying this tag are targeted; all contacts when absent.
    pub target_tag: Option<String>,
}

/// Mirror of an ad campaign created on Meta.
#[derive(Debug, Clone)]
pub struct CreateAdCampaign {
    pub name: String,
    pub meta_campaign_id: String,
    pub objective: String,
    pub daily_budget: Option<i64>,
    pub status: String,
}
