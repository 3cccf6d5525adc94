//! Serverless-style action handlers.
//!
//! Each handler is one `POST` endpoint taking `{ "action": ..., ...params }`.
//! Responses are `{ "success": true, "data": ... }`; failures use the usual
//! `{ "error", "code" }` body (401 for auth, 400 for unknown actions and
//! missing fields, 502 for Meta refusals).

pub mod meta_ads;
pub mod whatsapp;

use serde_json::Value;
use wabiz_core::action::ActionRequest;
use wabiz_core::error::CoreError;
use wabiz_core::types::OwnerId;
use wabiz_db::repositories::SettingsRepo;
use wabiz_db::DbPool;

use crate::error::{AppError, AppResult};

/// Parse the raw body into an [`ActionRequest`].
///
/// Taking `Value` first lets a missing `action` field report as 400 like
/// every other missing field.
pub(crate) fn parse_request(body: Value) -> AppResult<ActionRequest> {
    if !body.is_object() {
        return Err(AppError::BadRequest(
            "Request body must be a JSON object".into(),
        ));
    }
    serde_json::from_value(body)
        .map_err(|_| AppError::Core(CoreError::Validation("Missing required field: action".into())))
}

pub(crate) fn unknown_action(handler: &str, action: &str) -> AppError {
    AppError::BadRequest(format!("Unknown {handler} action: {action}"))
}

/// The owner's stored WABA connection.
#[derive(Debug, Clone)]
pub(crate) struct Connection {
    pub access_token: String,
    pub waba_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub ad_account_id: Option<String>,
}

impl Connection {
    /// Load the owner's connection. Fails with 400 when no access token
    /// has been stored yet.
    pub async fn load(pool: &DbPool, owner_id: OwnerId) -> AppResult<Self> {
        let settings = SettingsRepo::find_by_owner(pool, owner_id).await?;
        let Some(settings) = settings else {
            return Err(not_connected());
        };
        let Some(access_token) = settings.access_token.filter(|t| !t.is_empty()) else {
            return Err(not_connected());
        };
        Ok(Self {
            access_token,
            waba_id: settings.waba_id,
            phone_number_id: settings.phone_number_id,
            ad_account_id: settings.ad_account_id,
        })
    }

    pub fn phone_number_id(&self) -> AppResult<&str> {
        self.phone_number_id
            .as_deref()
            .ok_or_else(|| missing_setting("phone_number_id"))
    }

    pub fn waba_id(&self) -> AppResult<&str> {
        self.waba_id
            .as_deref()
            .ok_or_else(|| missing_setting("waba_id"))
    }

    pub fn ad_account_id(&self) -> AppResult<&str> {
        self.ad_account_id
            .as_deref()
            .ok_or_else(|| missing_setting("ad_account_id"))
    }
}

fn not_connected() -> AppError {
    AppError::BadRequest("WhatsApp Business account is not connected".into())
}

fn missing_setting(field: &str) -> AppError {
    AppError::BadRequest(format!("Account settings are missing {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn missing_action_is_a_validation_error() {
        assert_matches!(
            parse_request(json!({ "to": "+15550001111" })),
            Err(AppError::Core(CoreError::Validation(msg))) if msg == "Missing required field: action"
        );
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_matches!(parse_request(json!([1, 2])), Err(AppError::BadRequest(_)));
    }

    #[test]
    fn params_exclude_action() {
        let req = parse_request(json!({ "action": "list_campaigns", "limit": 5 })).unwrap();
        assert_eq!(req.action, "list_campaigns");
        assert!(req.params.contains_key("limit"));
    }
}
