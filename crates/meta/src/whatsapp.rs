//! WhatsApp Cloud API endpoints: messages, templates, business profile,
//! phone numbers and the embedded-signup OAuth exchange.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{Ack, MetaApi, MetaApiError, Page};

/// Fields requested when reading a business profile.
const PROFILE_FIELDS: &str = "about,address,description,email,profile_picture_url,websites,vertical";

/// Fields requested when listing templates.
const TEMPLATE_FIELDS: &str = "id,name,language,status,category,rejected_reason";

/// Fields requested when listing phone numbers.
const PHONE_FIELDS: &str = "id,display_phone_number,verified_name,quality_rating";

/// Page size for template sync.
const TEMPLATE_PAGE_LIMIT: &str = "200";

/// Response to `POST /{phone_number_id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub id: String,
}

impl SendResponse {
    /// The `wamid.*` id Meta assigned, used to match status callbacks.
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}

/// A template as reported by `GET /{waba_id}/message_templates`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteTemplate {
    pub id: String,
    pub name: String,
    pub language: String,
    pub status: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rejected_reason: Option<String>,
}

/// Response to a template submission.
#[derive(Debug, Deserialize)]
pub struct SubmittedTemplate {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A template submission.
#[derive(Debug, Serialize)]
pub struct TemplateSubmission<'a> {
    pub name: &'a str,
    pub language: &'a str,
    pub category: &'a str,
    pub components: &'a Value,
}

/// Partial business profile update. Absent fields are left unchanged.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct BusinessProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websites: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl BusinessProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.about.is_none()
            && self.description.is_none()
            && self.email.is_none()
            && self.websites.is_none()
            && self.address.is_none()
    }
}

/// A phone number registered on the WABA.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhoneNumber {
    pub id: String,
    #[serde(default)]
    pub display_phone_number: Option<String>,
    #[serde(default)]
    pub verified_name: Option<String>,
    #[serde(default)]
    pub quality_rating: Option<String>,
}

/// Result of the OAuth code exchange.
#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl MetaApi {
    /// Send a plain text message. `to` is the recipient's digits-only wa_id.
    pub async fn send_text(
        &self,
        token: &str,
        phone_number_id: &str,
        to: &str,
        text: &str,
    ) -> Result<SendResponse, MetaApiError> {
        let body = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "preview_url": false, "body": text },
        });
        self.post_json(token, &format!("{phone_number_id}/messages"), &body)
            .await
    }

    /// Send an approved template message.
    pub async fn send_template(
        &self,
        token: &str,
        phone_number_id: &str,
        to: &str,
        template_name: &str,
        language: &str,
        components: Option<&Value>,
    ) -> Result<SendResponse, MetaApiError> {
        let mut template = json!({
            "name": template_name,
            "language": { "code": language },
        });
        if let Some(components) = components {
            template["components"] = components.clone();
        }
        let body = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "template",
            "template": template,
        });
        self.post_json(token, &format!("{phone_number_id}/messages"), &body)
            .await
    }

    /// Submit a template for review.
    pub async fn submit_template(
        &self,
        token: &str,
        waba_id: &str,
        submission: &TemplateSubmission<'_>,
    ) -> Result<SubmittedTemplate, MetaApiError> {
        self.post_json(token, &format!("{waba_id}/message_templates"), submission)
            .await
    }

    /// List the WABA's templates with their review status.
    pub async fn list_templates(
        &self,
        token: &str,
        waba_id: &str,
    ) -> Result<Vec<RemoteTemplate>, MetaApiError> {
        let page: Page<RemoteTemplate> = self
            .get_json(
                token,
                &format!("{waba_id}/message_templates"),
                &[("fields", TEMPLATE_FIELDS), ("limit", TEMPLATE_PAGE_LIMIT)],
            )
            .await?;
        Ok(page.data)
    }

    /// Read the business profile attached to a phone number.
    ///
    /// Returns `Value::Null` if Meta reports no profile.
    pub async fn get_business_profile(
        &self,
        token: &str,
        phone_number_id: &str,
    ) -> Result<Value, MetaApiError> {
        let page: Page<Value> = self
            .get_json(
                token,
                &format!("{phone_number_id}/whatsapp_business_profile"),
                &[("fields", PROFILE_FIELDS)],
            )
            .await?;
        Ok(page.data.into_iter().next().unwrap_or(Value::Null))
    }

    pub async fn update_business_profile(
        &self,
        token: &str,
        phone_number_id: &str,
        update: &BusinessProfileUpdate,
    ) -> Result<Ack, MetaApiError> {
        let mut body = serde_json::to_value(update).unwrap_or_else(|_| json!({}));
        body["messaging_product"] = json!("whatsapp");
        self.post_json(
            token,
            &format!("{phone_number_id}/whatsapp_business_profile"),
            &body,
        )
        .await
    }

    pub async fn list_phone_numbers(
        &self,
        token: &str,
        waba_id: &str,
    ) -> Result<Vec<PhoneNumber>, MetaApiError> {
        let page: Page<PhoneNumber> = self
            .get_json(
                token,
                &format!("{waba_id}/phone_numbers"),
                &[("fields", PHONE_FIELDS)],
            )
            .await?;
        Ok(page.data)
    }

    /// Exchange an embedded-signup authorization code for an access token.
    ///
    /// Needs `META_APP_ID` and `META_APP_SECRET`.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<AccessToken, MetaApiError> {
        let app_id = self
            .config()
            .app_id
            .as_deref()
            .ok_or(MetaApiError::NotConfigured("META_APP_ID"))?;
        let app_secret = self
            .config()
            .app_secret
            .as_deref()
            .ok_or(MetaApiError::NotConfigured("META_APP_SECRET"))?;

        let mut query = vec![
            ("client_id", app_id),
            ("client_secret", app_secret),
            ("code", code),
        ];
        if let Some(uri) = redirect_uri {
            query.push(("redirect_uri", uri));
        }
        self.get_public("oauth/access_token", &query).await
    }
}
