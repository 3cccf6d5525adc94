//! `POST /api/v1/actions/whatsapp`: messaging, templates, business profile,
//! broadcasts and account connection.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use wabiz_core::action::ActionRequest;
use wabiz_core::error::CoreError;
use wabiz_core::messaging::{campaign_kinds, campaign_statuses, directions, message_statuses, message_types};
use wabiz_core::phone::{self, to_wa_id};
use wabiz_core::template::{statuses, validate_template_name, DEFAULT_LANGUAGE};
use wabiz_core::types::OwnerId;
use wabiz_db::models::contact::Contact;
use wabiz_db::models::message::{CreateMessage, Message};
use wabiz_db::models::settings::{SettingsView, UpsertSettings};
use wabiz_db::models::template::Template;
use wabiz_db::repositories::{
    CampaignRepo, ContactRepo, ConversationRepo, MessageRepo, SettingsRepo, TemplateRepo,
};
use wabiz_db::DbPool;
use wabiz_meta::whatsapp::{BusinessProfileUpdate, TemplateSubmission};

use super::{parse_request, unknown_action, Connection};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, RequireAuth};
use crate::response::ActionResponse;
use crate::state::AppState;

/// Meta reports this when a template was rejected without a reason.
const NO_REASON: &str = "NONE";

/// Summary of a template sync.
#[derive(Debug, Serialize)]
struct SyncSummary {
    remote: usize,
    updated: u64,
}

/// Dispatch a WhatsApp action.
pub async fn handle(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let req = parse_request(body)?;
    tracing::debug!(owner_id = %user.owner_id, action = %req.action, "WhatsApp action");

    let data = match req.action.as_str() {
        "send_message" => send_message(&state, &user, &req).await?,
        "send_template" => send_template(&state, &user, &req).await?,
        "submit_template" => submit_template(&state, &user, &req).await?,
        "sync_templates" => sync_templates(&state, &user).await?,
        "get_business_profile" => get_business_profile(&state, &user).await?,
        "update_business_profile" => update_business_profile(&state, &user, &req).await?,
        "list_phone_numbers" => list_phone_numbers(&state, &user).await?,
        "send_broadcast" => send_broadcast(&state, &user, &req).await?,
        "connect_account" => connect_account(&state, &user, &req).await?,
        other => return Err(unknown_action("whatsapp", other)),
    };

    Ok(Json(ActionResponse::ok(data)))
}

fn to_data<T: Serialize>(value: T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::InternalError(e.to_string()))
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

async fn send_message(state: &AppState, user: &AuthUser, req: &ActionRequest) -> AppResult<Value> {
    let to = phone::normalize(req.require_str("to")?)?;
    let text = req.require_str("text")?;
    let conn = Connection::load(&state.pool, user.owner_id).await?;

    let sent = state
        .meta
        .send_text(&conn.access_token, conn.phone_number_id()?, to_wa_id(&to), text)
        .await?;

    let message = record_outbound(
        &state.pool,
        user.owner_id,
        &to,
        Outbound {
            message_type: message_types::TEXT,
            body: text.to_string(),
            wa_message_id: sent.message_id().map(str::to_string),
            status: message_statuses::SENT,
            error_message: None,
        },
    )
    .await?;

    tracing::info!(owner_id = %user.owner_id, message_id = message.id, "Text message sent");
    to_data(message)
}

async fn send_template(state: &AppState, user: &AuthUser, req: &ActionRequest) -> AppResult<Value> {
    let to = phone::normalize(req.require_str("to")?)?;
    let template_name = req.require_str("template_name")?;
    let language = req.optional_str("language").unwrap_or(DEFAULT_LANGUAGE);
    let components = req.optional_value("components");
    let conn = Connection::load(&state.pool, user.owner_id).await?;

    let sent = state
        .meta
        .send_template(
            &conn.access_token,
            conn.phone_number_id()?,
            to_wa_id(&to),
            template_name,
            language,
            components,
        )
        .await?;

    let message = record_outbound(
        &state.pool,
        user.owner_id,
        &to,
        Outbound {
            message_type: message_types::TEMPLATE,
            body: template_name.to_string(),
            wa_message_id: sent.message_id().map(str::to_string),
            status: message_statuses::SENT,
            error_message: None,
        },
    )
    .await?;

    to_data(message)
}

struct Outbound {
    message_type: &'static str,
    body: String,
    wa_message_id: Option<String>,
    status: &'static str,
    error_message: Option<String>,
}

/// Store an outbound message, creating the contact and conversation on
/// first contact.
async fn record_outbound(
    pool: &DbPool,
    owner_id: OwnerId,
    to: &str,
    outbound: Outbound,
) -> AppResult<Message> {
    let preview = if outbound.message_type == message_types::TEMPLATE {
        format!("[template] {}", outbound.body)
    } else {
        outbound.body.clone()
    };
    let contact = ContactRepo::find_or_create_by_phone(pool, owner_id, to, "").await?;
    let conversation =
        ConversationRepo::touch(pool, owner_id, contact.id, &preview, false).await?;

    let message = MessageRepo::create(
        pool,
        owner_id,
        &CreateMessage {
            conversation_id: conversation.id,
            direction: directions::OUTBOUND,
            message_type: outbound.message_type,
            body: Some(outbound.body),
            wa_message_id: outbound.wa_message_id,
            status: outbound.status,
            error_message: outbound.error_message,
        },
    )
    .await?;
    Ok(message)
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

async fn submit_template(
    state: &AppState,
    user: &AuthUser,
    req: &ActionRequest,
) -> AppResult<Value> {
    let template_id = req.require_i64("template_id")?;
    let template = TemplateRepo::find_by_id(&state.pool, user.owner_id, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id: template_id,
        }))?;
    validate_template_name(&template.name)?;
    let conn = Connection::load(&state.pool, user.owner_id).await?;

    let submitted = state
        .meta
        .submit_template(
            &conn.access_token,
            conn.waba_id()?,
            &TemplateSubmission {
                name: &template.name,
                language: &template.language,
                category: &template.category,
                components: &template.components,
            },
        )
        .await?;

    let status = submitted.status.as_deref().unwrap_or(statuses::PENDING);
    let updated =
        TemplateRepo::mark_submitted(&state.pool, user.owner_id, template.id, &submitted.id, status)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Template",
                id: template.id,
            }))?;

    tracing::info!(
        owner_id = %user.owner_id,
        template_id = template.id,
        meta_template_id = %submitted.id,
        status,
        "Template submitted for review",
    );
    to_data(updated)
}

/// Mirror Meta's review status onto local templates matched by
/// `(name, language)`. Remote templates without a local copy are ignored.
async fn sync_templates(state: &AppState, user: &AuthUser) -> AppResult<Value> {
    let conn = Connection::load(&state.pool, user.owner_id).await?;
    let remote = state
        .meta
        .list_templates(&conn.access_token, conn.waba_id()?)
        .await?;

    let mut updated = 0;
    for template in &remote {
        let reason = template
            .rejected_reason
            .as_deref()
            .filter(|r| *r != NO_REASON);
        updated += TemplateRepo::update_status_by_name(
            &state.pool,
            user.owner_id,
            &template.name,
            &template.language,
            &template.status,
            Some(&template.id),
            reason,
        )
        .await?;
    }

    tracing::info!(owner_id = %user.owner_id, remote = remote.len(), updated, "Templates synced");
    to_data(SyncSummary {
        remote: remote.len(),
        updated,
    })
}

// ---------------------------------------------------------------------------
// Business profile and phone numbers
// ---------------------------------------------------------------------------

async fn get_business_profile(state: &AppState, user: &AuthUser) -> AppResult<Value> {
    let conn = Connection::load(&state.pool, user.owner_id).await?;
    let profile = state
        .meta
        .get_business_profile(&conn.access_token, conn.phone_number_id()?)
        .await?;
    Ok(profile)
}

async fn update_business_profile(
    state: &AppState,
    user: &AuthUser,
    req: &ActionRequest,
) -> AppResult<Value> {
    let update: BusinessProfileUpdate = req.params_as()?;
    if update.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No business profile fields to update".into(),
        )));
    }
    let conn = Connection::load(&state.pool, user.owner_id).await?;

    let ack = state
        .meta
        .update_business_profile(&conn.access_token, conn.phone_number_id()?, &update)
        .await?;
    Ok(json!({ "updated": ack.success }))
}

async fn list_phone_numbers(state: &AppState, user: &AuthUser) -> AppResult<Value> {
    let conn = Connection::load(&state.pool, user.owner_id).await?;
    let numbers = state
        .meta
        .list_phone_numbers(&conn.access_token, conn.waba_id()?)
        .await?;
    to_data(numbers)
}

// ---------------------------------------------------------------------------
// Broadcasts
// ---------------------------------------------------------------------------

/// Send a broadcast's template to every targeted, opted-in contact, one
/// after another. Per-recipient failures are counted, not retried.
///
/// A run that stops on a storage error still closes the campaign as
/// `failed`, so it can be sent again.
async fn send_broadcast(
    state: &AppState,
    user: &AuthUser,
    req: &ActionRequest,
) -> AppResult<Value> {
    let campaign_id = req.require_i64("campaign_id")?;
    let campaign = CampaignRepo::find_by_id(&state.pool, user.owner_id, campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        }))?;

    if campaign.kind != campaign_kinds::BROADCAST {
        return Err(AppError::BadRequest(format!(
            "Campaign {campaign_id} is not a broadcast"
        )));
    }
    let template_id = campaign.template_id.ok_or_else(|| {
        AppError::BadRequest(format!("Campaign {campaign_id} has no template"))
    })?;
    let template = TemplateRepo::find_by_id(&state.pool, user.owner_id, template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id: template_id,
        }))?;
    if template.status != statuses::APPROVED {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Template '{}' is {} and cannot be broadcast until approved",
            template.name, template.status
        ))));
    }

    let conn = Connection::load(&state.pool, user.owner_id).await?;
    let phone_number_id = conn.phone_number_id()?;
    let targets =
        ContactRepo::list_broadcast_targets(&state.pool, user.owner_id, campaign.target_tag.as_deref())
            .await?;

    // Conditional claim: a concurrent run sees `None` here.
    CampaignRepo::start_sending(&state.pool, user.owner_id, campaign_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Campaign {campaign_id} is already sending or completed"
            )))
        })?;
    tracing::info!(
        owner_id = %user.owner_id,
        campaign_id,
        recipients = targets.len(),
        "Broadcast started",
    );

    let mut counts = BroadcastCounts::default();
    let run = deliver_broadcast(
        state,
        user.owner_id,
        &conn,
        phone_number_id,
        &template,
        &targets,
        &mut counts,
    )
    .await;

    let final_status = match &run {
        Ok(()) if counts.sent > 0 => campaign_statuses::COMPLETED,
        _ => campaign_statuses::FAILED,
    };
    let finished = CampaignRepo::finish_sending(
        &state.pool,
        user.owner_id,
        campaign_id,
        counts.sent,
        counts.failed,
        final_status,
    )
    .await;

    if let Err(err) = run {
        if let Err(close_err) = &finished {
            tracing::error!(campaign_id, error = %close_err, "Failed to close aborted broadcast");
        }
        tracing::error!(
            campaign_id,
            sent = counts.sent,
            failed = counts.failed,
            error = %err,
            "Broadcast aborted",
        );
        return Err(err);
    }
    let campaign = finished?.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Campaign",
        id: campaign_id,
    }))?;

    tracing::info!(
        campaign_id,
        sent = counts.sent,
        failed = counts.failed,
        status = final_status,
        "Broadcast finished",
    );
    to_data(campaign)
}

#[derive(Debug, Default)]
struct BroadcastCounts {
    sent: i32,
    failed: i32,
}

/// Send to each target in order and record every attempt.
///
/// Graph failures are counted per recipient. A storage failure stops the run
/// with the counts reached so far left in `counts`.
async fn deliver_broadcast(
    state: &AppState,
    owner_id: OwnerId,
    conn: &Connection,
    phone_number_id: &str,
    template: &Template,
    targets: &[Contact],
    counts: &mut BroadcastCounts,
) -> AppResult<()> {
    for contact in targets {
        let result = state
            .meta
            .send_template(
                &conn.access_token,
                phone_number_id,
                to_wa_id(&contact.phone),
                &template.name,
                &template.language,
                None,
            )
            .await;

        let outbound = match result {
            Ok(response) => {
                counts.sent += 1;
                Outbound {
                    message_type: message_types::TEMPLATE,
                    body: template.name.clone(),
                    wa_message_id: response.message_id().map(str::to_string),
                    status: message_statuses::SENT,
                    error_message: None,
                }
            }
            Err(err) => {
                counts.failed += 1;
                tracing::warn!(contact_id = contact.id, error = %err, "Broadcast send failed");
                Outbound {
                    message_type: message_types::TEMPLATE,
                    body: template.name.clone(),
                    wa_message_id: None,
                    status: message_statuses::FAILED,
                    error_message: Some(err.to_string()),
                }
            }
        };
        record_outbound(&state.pool, owner_id, &contact.phone, outbound).await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Account connection
// ---------------------------------------------------------------------------

/// Exchange an embedded-signup code for a token and store the connection.
async fn connect_account(
    state: &AppState,
    user: &AuthUser,
    req: &ActionRequest,
) -> AppResult<Value> {
    let code = req.require_str("code")?;
    let redirect_uri = req.optional_str("redirect_uri");

    let token = state.meta.exchange_code(code, redirect_uri).await?;

    let settings = SettingsRepo::store_connection(
        &state.pool,
        user.owner_id,
        &token.access_token,
        &UpsertSettings {
            waba_id: req.optional_str("waba_id").map(str::to_string),
            phone_number_id: req.optional_str("phone_number_id").map(str::to_string),
            business_name: req.optional_str("business_name").map(str::to_string),
            ad_account_id: req.optional_str("ad_account_id").map(str::to_string),
        },
    )
    .await?;

    tracing::info!(owner_id = %user.owner_id, waba_id = ?settings.waba_id, "WhatsApp account connected");
    to_data(SettingsView::from(Some(settings)))
}
