//! HTTP plumbing shared by the WhatsApp and ads endpoints.
//!
//! Every call takes the owner's access token explicitly; the client itself
//! only holds configuration and the connection pool.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wabiz_core::signature::appsecret_proof;

use crate::config::MetaConfig;

/// HTTP client for the Graph API.
#[derive(Debug, Clone)]
pub struct MetaApi {
    client: reqwest::Client,
    config: MetaConfig,
}

/// Errors from the Graph API layer.
#[derive(Debug, thiserror::Error)]
pub enum MetaApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Meta returned a non-2xx status code.
    #[error("Meta API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error.message` from the body, or the raw body.
        message: String,
        /// `error.code` from the body, when present.
        code: Option<i64>,
    },

    /// A call needs app credentials that are not configured.
    #[error("Meta app is not configured: {0} is unset")]
    NotConfigured(&'static str),
}

/// Generic `{ "data": [...] }` list envelope.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// `{ "success": true }` acknowledgement.
#[derive(Debug, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
}

/// `{ "id": "..." }` returned by create calls.
#[derive(Debug, Deserialize)]
pub struct CreatedId {
    pub id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<i64>,
}

impl MetaApi {
    pub fn new(config: MetaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: MetaConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    /// Versioned URL for a Graph path, e.g. `{base}/v21.0/{path}`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.graph_url.trim_end_matches('/'),
            self.config.api_version,
            path.trim_start_matches('/'),
        )
    }

    // ---- request helpers ----

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MetaApiError> {
        tracing::debug!(path, "Graph API GET");
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .query(&self.proof_query(token))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        body: &B,
    ) -> Result<T, MetaApiError> {
        tracing::debug!(path, "Graph API POST");
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .query(&self.proof_query(token))
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Unauthenticated GET (the OAuth token endpoint).
    pub(crate) async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MetaApiError> {
        let response = self.client.get(self.url(path)).query(query).send().await?;
        Self::parse_response(response).await
    }

    /// `appsecret_proof` query pair when an app secret is configured.
    fn proof_query(&self, token: &str) -> Vec<(&'static str, String)> {
        match &self.config.app_secret {
            Some(secret) => vec![("appsecret_proof", appsecret_proof(secret, token))],
            None => Vec::new(),
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, turning Meta's error
    /// body into [`MetaApiError::Api`] otherwise.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, MetaApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let err = api_error(status.as_u16(), &body);
            tracing::warn!(error = %err, "Graph API call failed");
            return Err(err);
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MetaApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Build an [`MetaApiError::Api`] from a failed response body.
///
/// Meta wraps failures as `{"error":{"message":...,"code":...}}`; anything
/// else is reported verbatim.
pub fn api_error(status: u16, body: &str) -> MetaApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorBody {
                message: Some(message),
                code,
            },
        }) => MetaApiError::Api {
            status,
            message,
            code,
        },
        Ok(ErrorEnvelope { error }) => MetaApiError::Api {
            status,
            message: body.to_string(),
            code: error.code,
        },
        Err(_) => MetaApiError::Api {
            status,
            message: body.to_string(),
            code: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn api(graph_url: &str, app_secret: Option<&str>) -> MetaApi {
        MetaApi::new(MetaConfig {
            graph_url: graph_url.to_string(),
            app_secret: app_secret.map(str::to_string),
            ..MetaConfig::default()
        })
    }

    #[test]
    fn url_joins_base_version_and_path() {
        let api = api("https://graph.example.test/", None);
        assert_eq!(
            api.url("/12345/messages"),
            "https://graph.example.test/v21.0/12345/messages"
        );
    }

    #[test]
    fn error_message_is_extracted_from_meta_body() {
        let body = r#"{"error":{"message":"Invalid OAuth access token.","type":"OAuthException","code":190}}"#;
        assert_matches!(
            api_error(401, body),
            MetaApiError::Api { status: 401, message, code: Some(190) }
                if message == "Invalid OAuth access token."
        );
    }

    #[test]
    fn non_json_error_body_is_kept_raw() {
        assert_matches!(
            api_error(502, "Bad Gateway"),
            MetaApiError::Api { status: 502, message, code: None } if message == "Bad Gateway"
        );
    }

    #[test]
    fn error_without_message_falls_back_to_body() {
        let body = r#"{"error":{"code":100}}"#;
        assert_matches!(
            api_error(400, body),
            MetaApiError::Api { message, code: Some(100), .. } if message == body
        );
    }

    #[test]
    fn proof_only_added_with_app_secret() {
        assert!(api("http://x", None).proof_query("tok").is_empty());

        let with_secret = api("http://x", Some("s3cret"));
        let query = with_secret.proof_query("tok");
        assert_eq!(query.len(), 1);
        assert_eq!(query[0].0, "appsecret_proof");
        assert_eq!(query[0].1, appsecret_proof("s3cret", "tok"));
    }
}
