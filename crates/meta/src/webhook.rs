//! WhatsApp Business webhook payloads.
//!
//! Meta posts `{ object, entry: [{ id, changes: [{ field, value }] }] }`.
//! Only the parts we store are modelled; unknown fields are ignored.

use serde::Deserialize;
use serde_json::Value;

/// `field` of a change carrying messages and delivery statuses.
pub const FIELD_MESSAGES: &str = "messages";

/// `field` of a change carrying template review results.
pub const FIELD_TEMPLATE_STATUS: &str = "message_template_status_update";

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    /// WABA id.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

/// The `value` of a change. Which fields are present depends on `field`.
#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub contacts: Vec<WaContact>,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub statuses: Vec<StatusUpdate>,

    // message_template_status_update
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub message_template_id: Option<Value>,
    #[serde(default)]
    pub message_template_name: Option<String>,
    #[serde(default)]
    pub message_template_language: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub display_phone_number: Option<String>,
    pub phone_number_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WaContact {
    pub wa_id: String,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub from: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub button: Option<ButtonReply>,
    #[serde(default)]
    pub interactive: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ButtonReply {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    /// The `wamid.*` of the outbound message.
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub errors: Vec<StatusError>,
}

#[derive(Debug, Deserialize)]
pub struct StatusError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChangeValue {
    pub fn phone_number_id(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.phone_number_id.as_str())
    }

    /// Profile name Meta reported for a sender, if any.
    pub fn contact_name(&self, wa_id: &str) -> Option<&str> {
        self.contacts
            .iter()
            .find(|c| c.wa_id == wa_id)
            .and_then(|c| c.profile.as_ref())
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty())
    }

    /// The template id as a string (Meta sends it as a number).
    pub fn template_id(&self) -> Option<String> {
        match self.message_template_id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl InboundMessage {
    /// Human-readable text of the message: the text body, the tapped
    /// button/list title, or an image caption.
    pub fn body_text(&self) -> Option<String> {
        if let Some(text) = &self.text {
            return Some(text.body.clone());
        }
        if let Some(button) = &self.button {
            return Some(button.text.clone());
        }
        if let Some(interactive) = &self.interactive {
            let title = interactive
                .pointer("/button_reply/title")
                .or_else(|| interactive.pointer("/list_reply/title"))
                .and_then(Value::as_str);
            if let Some(title) = title {
                return Some(title.to_string());
            }
        }
        self.image
            .as_ref()
            .and_then(|img| img.get("caption"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

impl StatusUpdate {
    /// First error description, for failed deliveries.
    pub fn error_message(&self) -> Option<String> {
        self.errors.first().and_then(|e| {
            e.message
                .clone()
                .or_else(|| e.title.clone())
                .or_else(|| e.code.map(|c| format!("error code {c}")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> WebhookPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn inbound_text_message_parses() {
        let payload = parse(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "waba-1",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": { "display_phone_number": "15550000000", "phone_number_id": "pn-1" },
                        "contacts": [{ "profile": { "name": "Ana" }, "wa_id": "15551112222" }],
                        "messages": [{
                            "from": "15551112222",
                            "id": "wamid.IN1",
                            "timestamp": "1700000000",
                            "type": "text",
                            "text": { "body": "hello" }
                        }]
                    }
                }]
            }]
        }));

        let value = &payload.entry[0].changes[0].value;
        assert_eq!(value.phone_number_id(), Some("pn-1"));
        assert_eq!(value.contact_name("15551112222"), Some("Ana"));
        assert_eq!(value.messages[0].kind, "text");
        assert_eq!(value.messages[0].body_text().as_deref(), Some("hello"));
    }

    #[test]
    fn interactive_reply_title_is_body() {
        let message: InboundMessage = serde_json::from_value(json!({
            "from": "1",
            "id": "wamid.X",
            "type": "interactive",
            "interactive": { "type": "button_reply", "button_reply": { "id": "b1", "title": "Yes" } }
        }))
        .unwrap();
        assert_eq!(message.body_text().as_deref(), Some("Yes"));
    }

    #[test]
    fn failed_status_carries_error() {
        let status: StatusUpdate = serde_json::from_value(json!({
            "id": "wamid.OUT",
            "status": "failed",
            "recipient_id": "15551112222",
            "errors": [{ "code": 131047, "title": "Re-engagement message" }]
        }))
        .unwrap();
        assert_eq!(status.error_message().as_deref(), Some("Re-engagement message"));
    }

    #[test]
    fn template_status_update_parses() {
        let change: Change = serde_json::from_value(json!({
            "field": "message_template_status_update",
            "value": {
                "event": "APPROVED",
                "message_template_id": 594425479261596_i64,
                "message_template_name": "order_update",
                "message_template_language": "en_US",
                "reason": "NONE"
            }
        }))
        .unwrap();
        assert_eq!(change.field, FIELD_TEMPLATE_STATUS);
        assert_eq!(change.value.template_id().as_deref(), Some("594425479261596"));
        assert!(change.value.messages.is_empty());
    }

    #[test]
    fn unknown_shapes_are_tolerated() {
        let payload = parse(json!({ "object": "page", "entry": [{ "id": "1", "time": 1 }] }));
        assert!(payload.entry[0].changes.is_empty());
    }
}
