/// Default Graph API host.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

/// Graph API version used when `META_API_VERSION` is unset.
pub const DEFAULT_API_VERSION: &str = "v21.0";

/// Meta app configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct MetaConfig {
    /// Graph API base URL without version (default: `https://graph.facebook.com`).
    pub graph_url: String,
    /// Graph API version segment (default: `v21.0`).
    pub api_version: String,
    /// App id, needed for the OAuth code exchange.
    pub app_id: Option<String>,
    /// App secret. Enables `appsecret_proof` and webhook signature checks.
    pub app_secret: Option<String>,
    /// Token Meta must echo during the webhook verification handshake.
    pub verify_token: Option<String>,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            app_id: None,
            app_secret: None,
            verify_token: None,
        }
    }
}

impl MetaConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                      |
    /// |-----------------------------|------------------------------|
    /// | `META_GRAPH_URL`            | `https://graph.facebook.com` |
    /// | `META_API_VERSION`          | `v21.0`                      |
    /// | `META_APP_ID`               | unset                        |
    /// | `META_APP_SECRET`           | unset                        |
    /// | `META_WEBHOOK_VERIFY_TOKEN` | unset                        |
    pub fn from_env() -> Self {
        let graph_url = std::env::var("META_GRAPH_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_GRAPH_URL.into());
        let api_version =
            std::env::var("META_API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.into());

        Self {
            graph_url,
            api_version,
            app_id: non_empty_env("META_APP_ID"),
            app_secret: non_empty_env("META_APP_SECRET"),
            verify_token: non_empty_env("META_WEBHOOK_VERIFY_TOKEN"),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
