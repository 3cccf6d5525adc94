//! HTTP-level tests for the Meta webhook endpoint.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{body_bytes, body_json, get, new_owner};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use sqlx::PgPool;
use wabiz_api::config::ServerConfig;
use wabiz_db::models::message::CreateMessage;
use wabiz_db::repositories::{ContactRepo, ConversationRepo, MessageRepo};

const APP_SECRET: &str = "webhook-app-secret";

fn sign(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(APP_SECRET.as_bytes()).unwrap();
    mac.update(body);
    let hex: String = mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("sha256={hex}")
}

fn signed_config() -> ServerConfig {
    let mut config = common::test_config();
    config.meta.app_secret = Some(APP_SECRET.to_string());
    config
}

async fn deliver(
    pool: &PgPool,
    config: ServerConfig,
    payload: &Value,
    signature: Option<String>,
) -> StatusCode {
    let body = payload.to_string();
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/webhooks/whatsapp")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        request = request.header("X-Hub-Signature-256", signature);
    }
    let request = request.body(Body::from(body)).unwrap();
    let app = common::build_test_app_with(pool.clone(), config);
    common::send(app, request).await.status()
}

fn inbound_payload(wamid: &str, text: &str) -> Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "waba-1",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": { "display_phone_number": "15550001111", "phone_number_id": "pn-1" },
                    "contacts": [{ "profile": { "name": "Dee" }, "wa_id": "14155550100" }],
                    "messages": [{
                        "from": "14155550100",
                        "id": wamid,
                        "timestamp": "1760000000",
                        "type": "text",
                        "text": { "body": text }
                    }]
                }
            }]
        }]
    })
}

fn status_payload(wamid: &str, status: &str) -> Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "waba-1",
            "changes": [{
                "field": "messages",
                "value": {
                    "metadata": { "phone_number_id": "pn-1" },
                    "statuses": [{ "id": wamid, "status": status, "recipient_id": "14155550100" }]
                }
            }]
        }]
    })
}

// ---------------------------------------------------------------------------
// Verification handshake
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn verification_echoes_the_challenge(pool: PgPool) {
    let app = common::build_test_app(pool);
    let uri = format!(
        "/webhooks/whatsapp?hub.mode=subscribe&hub.verify_token={}&hub.challenge=1158201444",
        common::VERIFY_TOKEN
    );
    let response = get(app, &uri, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"1158201444");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn verification_with_the_wrong_token_is_forbidden(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        "/webhooks/whatsapp?hub.mode=subscribe&hub.verify_token=guess&hub.challenge=1",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = get(app, "/webhooks/whatsapp", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unsigned_or_tampered_deliveries_are_rejected(pool: PgPool) {
    let payload = inbound_payload("wamid.A", "hello");

    let status = deliver(&pool, signed_config(), &payload, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let status = deliver(&pool, signed_config(), &payload, Some(sign(b"something else"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signed_deliveries_are_accepted(pool: PgPool) {
    let payload = inbound_payload("wamid.A", "hello");
    let signature = sign(payload.to_string().as_bytes());

    let status = deliver(&pool, signed_config(), &payload, Some(signature)).await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Event processing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn inbound_messages_create_contact_and_conversation(pool: PgPool) {
    let (owner, token) = new_owner();
    common::connect(&pool, owner).await;

    let status = deliver(&pool, common::test_config(), &inbound_payload("wamid.A", "hello"), None).await;
    assert_eq!(status, StatusCode::OK);
    // Redelivery of the same message is ignored.
    deliver(&pool, common::test_config(), &inbound_payload("wamid.A", "hello"), None).await;
    deliver(&pool, common::test_config(), &inbound_payload("wamid.B", "are you open?"), None).await;

    let contact = ContactRepo::find_by_phone(&pool, owner, "+14155550100")
        .await
        .unwrap()
        .expect("contact created from the webhook");
    assert_eq!(contact.name, "Dee");

    let app = common::build_test_app(pool.clone());
    let conversations = body_json(get(app, "/api/v1/conversations", Some(&token)).await).await;
    let conversation = &conversations["data"][0];
    assert_eq!(conversation["unread_count"], 2);
    assert_eq!(conversation["last_message"], "are you open?");

    let id = conversation["id"].as_i64().unwrap();
    let app = common::build_test_app(pool);
    let detail = body_json(get(app, &format!("/api/v1/conversations/{id}"), Some(&token)).await).await;
    let messages = detail["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["direction"], "inbound");
    assert_eq!(messages[0]["status"], "received");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deliveries_for_unknown_numbers_are_acknowledged(pool: PgPool) {
    let status = deliver(&pool, common::test_config(), &inbound_payload("wamid.X", "hi"), None).await;
    assert_eq!(status, StatusCode::OK);

    let status = deliver(&pool, common::test_config(), &json!({ "unexpected": true }), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delivery_statuses_only_move_forward(pool: PgPool) {
    let (owner, _) = new_owner();
    let contact = ContactRepo::find_or_create_by_phone(&pool, owner, "+14155550100", "")
        .await
        .unwrap();
    let conversation = ConversationRepo::touch(&pool, owner, contact.id, "Hi", false)
        .await
        .unwrap();
    let message = MessageRepo::create(
        &pool,
        owner,
        &CreateMessage {
            conversation_id: conversation.id,
            direction: "outbound",
            message_type: "text",
            body: Some("Hi".into()),
            wa_message_id: Some("wamid.OUT".into()),
            status: "sent",
            error_message: None,
        },
    )
    .await
    .unwrap();

    deliver(&pool, common::test_config(), &status_payload("wamid.OUT", "read"), None).await;
    deliver(&pool, common::test_config(), &status_payload("wamid.OUT", "delivered"), None).await;

    let stored = MessageRepo::find_by_wa_message_id(&pool, "wamid.OUT")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, message.id);
    assert_eq!(stored.status, "read");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn template_review_results_update_local_templates(pool: PgPool) {
    let (owner, token) = new_owner();
    common::connect(&pool, owner).await;
    let app = common::build_test_app(pool.clone());
    let created = body_json(
        common::post_json(
            app,
            "/api/v1/templates",
            Some(&token),
            json!({ "name": "order_shipped", "category": "UTILITY" }),
        )
        .await,
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let payload = json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "waba-1",
            "changes": [{
                "field": "message_template_status_update",
                "value": {
                    "event": "REJECTED",
                    "message_template_id": 594425479261596u64,
                    "message_template_name": "order_shipped",
                    "message_template_language": "en_US",
                    "reason": "INVALID_FORMAT"
                }
            }]
        }]
    });
    let status = deliver(&pool, common::test_config(), &payload, None).await;
    assert_eq!(status, StatusCode::OK);

    let template = wabiz_db::repositories::TemplateRepo::find_by_id(&pool, owner, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(template.status, "REJECTED");
    assert_eq!(template.rejection_reason.as_deref(), Some("INVALID_FORMAT"));
    assert_eq!(template.meta_template_id.as_deref(), Some("594425479261596"));
}
