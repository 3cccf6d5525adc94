//! Repository for the `settings` table.

use sqlx::PgPool;
use wabiz_core::types::OwnerId;

use crate::models::settings::{Settings, UpsertSettings};

/// Column list for `settings` queries.
const COLUMNS: &str = "\
    id, owner_id, waba_id, phone_number_id, business_name, ad_account_id, \
    access_token, created_at, updated_at";

/// Provides data access for account connection settings.
pub struct SettingsRepo;

impl SettingsRepo {
    pub async fn find_by_owner(
        pool: &PgPool,
        owner_id: OwnerId,
    ) -> Result<Option<Settings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE owner_id = $1");
        sqlx::query_as::<_, Settings>(&query)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the owning account of a webhook delivery.
    pub async fn find_by_phone_number_id(
        pool: &PgPool,
        phone_number_id: &str,
    ) -> Result<Option<Settings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE phone_number_id = $1 LIMIT 1");
        sqlx::query_as::<_, Settings>(&query)
            .bind(phone_number_id)
            .fetch_optional(pool)
            .await
    }

    /// Template review events carry only the WABA id.
    pub async fn find_by_waba_id(
        pool: &PgPool,
        waba_id: &str,
    ) -> Result<Option<Settings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE waba_id = $1 LIMIT 1");
        sqlx::query_as::<_, Settings>(&query)
            .bind(waba_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or partially update the owner's settings.
    pub async fn upsert(
        pool: &PgPool,
        owner_id: OwnerId,
        dto: &UpsertSettings,
    ) -> Result<Settings, sqlx::Error> {
        let query = format!(
            "INSERT INTO settings (owner_id, waba_id, phone_number_id, business_name, ad_account_id) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_settings_owner DO UPDATE SET \
                 waba_id         = COALESCE(EXCLUDED.waba_id, settings.waba_id), \
                 phone_number_id = COALESCE(EXCLUDED.phone_number_id, settings.phone_number_id), \
                 business_name   = COALESCE(EXCLUDED.business_name, settings.business_name), \
                 ad_account_id   = COALESCE(EXCLUDED.ad_account_id, settings.ad_account_id) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Settings>(&query)
            .bind(owner_id)
            .bind(&dto.waba_id)
            .bind(&dto.phone_number_id)
            .bind(&dto.business_name)
            .bind(&dto.ad_account_id)
            .fetch_one(pool)
            .await
    }

    /// Store the access token obtained from the OAuth handshake, together
    /// with any account ids supplied alongside it.
    pub async fn store_connection(
        pool: &PgPool,
        owner_id: OwnerId,
        access_token: &str,
        dto: &UpsertSettings,
    ) -> Result<Settings, sqlx::Error> {
        let query = format!(
            "INSERT INTO settings \
                 (owner_id, access_token, waba_id, phone_number_id, business_name, ad_account_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_settings_owner DO UPDATE SET \
                 access_token    = EXCLUDED.access_token, \
                 waba_id         = COALESCE(EXCLUDED.waba_id, settings.waba_id), \
                 phone_number_id = COALESCE(EXCLUDED.phone_number_id, settings.phone_number_id), \
                 business_name   = COALESCE(EXCLUDED.business_name, settings.business_name), \
                 ad_account_id   = COALESCE(EXCLUDED.ad_account_id, settings.ad_account_id) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Settings>(&query)
            .bind(owner_id)
            .bind(access_token)
            .bind(&dto.waba_id)
            .bind(&dto.phone_number_id)
            .bind(&dto.business_name)
            .bind(&dto.ad_account_id)
            .fetch_one(pool)
            .await
    }

    /// Forget the connection (disconnect account). Returns `true` if a row
    /// was deleted.
    pub async fn delete(pool: &PgPool, owner_id: OwnerId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM settings WHERE owner_id = $1")
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
