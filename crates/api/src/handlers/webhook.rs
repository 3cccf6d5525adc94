//! Meta WhatsApp webhook: subscription handshake and event delivery.
//!
//! Deliveries are acknowledged with 200 once the signature checks out, even
//! when individual events cannot be stored, so Meta does not redeliver.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use wabiz_core::error::CoreError;
use wabiz_core::messaging::{
    classify_message_type, directions, message_statuses, should_advance_status,
};
use wabiz_core::phone;
use wabiz_core::signature::verify_webhook_signature;
use wabiz_core::template::DEFAULT_LANGUAGE;
use wabiz_core::types::OwnerId;
use wabiz_db::models::message::CreateMessage;
use wabiz_db::repositories::{
    ContactRepo, ConversationRepo, MessageRepo, SettingsRepo, TemplateRepo,
};
use wabiz_db::DbPool;
use wabiz_meta::webhook::{
    ChangeValue, InboundMessage, StatusUpdate, WebhookPayload, FIELD_MESSAGES,
    FIELD_TEMPLATE_STATUS,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Query string of the `GET` verification handshake.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// GET /webhooks/whatsapp
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> AppResult<impl IntoResponse> {
    let expected = state.config.meta.verify_token.as_deref();
    let accepted = params.mode.as_deref() == Some("subscribe")
        && expected.is_some()
        && params.verify_token.as_deref() == expected;

    if !accepted {
        tracing::warn!(mode = ?params.mode, "Webhook verification rejected");
        return Err(AppError::Core(CoreError::Forbidden(
            "Webhook verification failed".into(),
        )));
    }

    tracing::info!("Webhook subscription verified");
    Ok(params.challenge.unwrap_or_default())
}

/// POST /webhooks/whatsapp
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    if let Some(secret) = state.config.meta.app_secret.as_deref() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_webhook_signature(secret, &body, signature) {
            tracing::warn!("Webhook signature mismatch");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid webhook signature".into(),
            )));
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed webhook payload");
            return Ok(StatusCode::OK);
        }
    };

    for entry in &payload.entry {
        for change in &entry.changes {
            let result = match change.field.as_str() {
                FIELD_MESSAGES => process_messages(&state.pool, &change.value).await,
                FIELD_TEMPLATE_STATUS => {
                    process_template_status(&state.pool, &entry.id, &change.value).await
                }
                other => {
                    tracing::debug!(field = other, "Ignoring webhook change");
                    Ok(())
                }
            };
            if let Err(e) = result {
                tracing::error!(waba_id = %entry.id, field = %change.field, error = %e, "Failed to process webhook change");
            }
        }
    }

    Ok(StatusCode::OK)
}

async fn process_messages(pool: &DbPool, value: &ChangeValue) -> AppResult<()> {
    for status in &value.statuses {
        apply_status(pool, status).await?;
    }

    if value.messages.is_empty() {
        return Ok(());
    }
    let Some(phone_number_id) = value.phone_number_id() else {
        tracing::warn!("Inbound messages without metadata.phone_number_id");
        return Ok(());
    };
    let Some(settings) = SettingsRepo::find_by_phone_number_id(pool, phone_number_id).await? else {
        tracing::warn!(phone_number_id, "No account owns this phone number");
        return Ok(());
    };

    for message in &value.messages {
        let name = value.contact_name(&message.from).unwrap_or("");
        store_inbound(pool, settings.owner_id, message, name).await?;
    }
    Ok(())
}

async fn store_inbound(
    pool: &DbPool,
    owner_id: OwnerId,
    message: &InboundMessage,
    name: &str,
) -> AppResult<()> {
    // Meta redelivers on timeouts.
    if MessageRepo::find_by_wa_message_id(pool, &message.id)
        .await?
        .is_some()
    {
        tracing::debug!(wa_message_id = %message.id, "Duplicate inbound message");
        return Ok(());
    }

    let from = phone::normalize(&message.from)?;
    let message_type = classify_message_type(&message.kind);
    let body = message.body_text();
    let preview = body.clone().unwrap_or_else(|| format!("[{message_type}]"));

    let contact = ContactRepo::find_or_create_by_phone(pool, owner_id, &from, name).await?;
    let conversation = ConversationRepo::touch(pool, owner_id, contact.id, &preview, true).await?;
    let stored = MessageRepo::create(
        pool,
        owner_id,
        &CreateMessage {
            conversation_id: conversation.id,
            direction: directions::INBOUND,
            message_type,
            body,
            wa_message_id: Some(message.id.clone()),
            status: message_statuses::RECEIVED,
            error_message: None,
        },
    )
    .await?;

    tracing::info!(
        owner_id = %owner_id,
        conversation_id = conversation.id,
        message_id = stored.id,
        "Inbound message stored",
    );
    Ok(())
}

/// Delivery statuses only move forward; unknown message ids are ignored.
async fn apply_status(pool: &DbPool, update: &StatusUpdate) -> AppResult<()> {
    let Some(message) = MessageRepo::find_by_wa_message_id(pool, &update.id).await? else {
        tracing::debug!(wa_message_id = %update.id, "Status for unknown message");
        return Ok(());
    };
    if !should_advance_status(&message.status, &update.status) {
        return Ok(());
    }

    let error = update.error_message();
    MessageRepo::update_status(pool, message.id, &update.status, error.as_deref()).await?;
    tracing::debug!(message_id = message.id, status = %update.status, "Message status updated");
    Ok(())
}

async fn process_template_status(
    pool: &DbPool,
    waba_id: &str,
    value: &ChangeValue,
) -> AppResult<()> {
    let (Some(name), Some(event)) = (
        value.message_template_name.as_deref(),
        value.event.as_deref(),
    ) else {
        return Ok(());
    };
    let Some(settings) = SettingsRepo::find_by_waba_id(pool, waba_id).await? else {
        tracing::warn!(waba_id, "No account owns this WABA");
        return Ok(());
    };

    let language = value
        .message_template_language
        .as_deref()
        .unwrap_or(DEFAULT_LANGUAGE);
    let reason = value.reason.as_deref().filter(|r| *r != "NONE");
    let meta_id = value.template_id();

    let updated = TemplateRepo::update_status_by_name(
        pool,
        settings.owner_id,
        name,
        language,
        event,
        meta_id.as_deref(),
        reason,
    )
    .await?;

    tracing::info!(owner_id = %settings.owner_id, template = name, status = event, updated, "Template review status received");
    Ok(())
}
