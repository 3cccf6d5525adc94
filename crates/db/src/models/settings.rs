//! WhatsApp Business Account connection settings (one row per owner).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wabiz_core::types::{DbId, OwnerId, Timestamp};

/// A row from the `settings` table.
///
/// `access_token` is never serialized; API responses go through
/// [`SettingsView`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Settings {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub waba_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub business_name: Option<String>,
    pub ad_account_id: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Client-facing view of [`Settings`].
#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub waba_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub business_name: Option<String>,
    pub ad_account_id: Option<String>,
    pub has_access_token: bool,
    pub updated_at: Option<Timestamp>,
}

impl From<Option<Settings>> for SettingsView {
    fn from(settings: Option<Settings>) -> Self {
        match settings {
            Some(s) => Self {
                has_access_token: s.access_token.as_deref().is_some_and(|t| !t.is_empty()),
                waba_id: s.waba_id,
                phone_number_id: s.phone_number_id,
                business_name: s.business_name,
                ad_account_id: s.ad_account_id,
                updated_at: Some(s.updated_at),
            },
            None => Self {
                waba_id: None,
                phone_number_id: None,
                business_name: None,
                ad_account_id: None,
                has_access_token: false,
                updated_at: None,
            },
        }
    }
}

/// DTO for editing connection settings. Only provided fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertSettings {
    pub waba_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub business_name: Option<String>,
    pub ad_account_id: Option<String>,
}
