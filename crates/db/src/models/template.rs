//! Message template models and DTOs.
//!
//! Templates are drafted locally, then submitted to Meta for review. The
//! review status is mirrored back on submission and on sync.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wabiz_core::types::{DbId, OwnerId, Timestamp};

/// A row from the `templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub name: String,
    pub language: String,
    pub category: String,
    pub components: serde_json::Value,
    pub status: String,
    pub meta_template_id: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a template draft.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub language: Option<String>,
    pub category: String,
    pub components: Option<serde_json::Value>,
}

/// DTO for partially updating a template draft.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub components: Option<serde_json::Value>,
}
