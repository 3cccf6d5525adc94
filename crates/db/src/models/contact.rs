//! Contact models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use wabiz_core::types::{DbId, OwnerId, Timestamp};

/// A row from the `contacts` table. `phone` is always E.164.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub tags: Vec<String>,
    pub opted_in: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a contact. The handler normalises `phone` first.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContact {
    #[serde(default)]
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub name: String,
    pub phone: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub tags: Option<Vec<String>>,
    pub opted_in: Option<bool>,
}

/// DTO for partially updating a contact.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContact {
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub tags: Option<Vec<String>>,
    pub opted_in: Option<bool>,
}

/// Filters for listing contacts.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// `ILIKE` pattern matched against name and phone.
    pub pattern: Option<String>,
    pub tag: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
