#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;
use wabiz_api::auth::jwt::{generate_access_token, JwtConfig, DEFAULT_AUDIENCE};
use wabiz_api::config::ServerConfig;
use wabiz_api::router::build_app_router;
use wabiz_api::state::AppState;
use wabiz_core::types::OwnerId;
use wabiz_db::models::settings::UpsertSettings;
use wabiz_db::repositories::SettingsRepo;
use wabiz_meta::MetaConfig;

/// Nothing listens here; Graph calls fail fast with a transport error.
pub const UNROUTABLE_GRAPH_URL: &str = "http://127.0.0.1:9";

pub const VERIFY_TOKEN: &str = "verify-me";

/// Build a test `ServerConfig` with safe defaults.
///
/// Meta calls go to [`UNROUTABLE_GRAPH_URL`] unless a test points
/// `meta.graph_url` at a mock server.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            access_token_expiry_mins: 15,
        },
        meta: MetaConfig {
            graph_url: UNROUTABLE_GRAPH_URL.to_string(),
            verify_token: Some(VERIFY_TOKEN.to_string()),
            ..MetaConfig::default()
        },
    }
}

/// Build the full application router (same middleware stack as `main.rs`).
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    build_app_router(AppState::new(pool, config.clone()), &config)
}

/// A valid bearer token for `owner`.
pub fn token_for(owner: OwnerId) -> String {
    generate_access_token(owner, &test_config().jwt).unwrap()
}

/// A fresh owner and a token for them.
pub fn new_owner() -> (OwnerId, String) {
    let owner = Uuid::new_v4();
    (owner, token_for(owner))
}

/// Store a WABA connection for `owner`.
pub async fn connect(pool: &PgPool, owner: OwnerId) {
    SettingsRepo::store_connection(
        pool,
        owner,
        "EAAG-test-token",
        &UpsertSettings {
            waba_id: Some("waba-1".into()),
            phone_number_id: Some("pn-1".into()),
            business_name: Some("Acme".into()),
            ad_account_id: Some("1234".into()),
        },
    )
    .await
    .unwrap();
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, builder(Method::GET, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, builder(Method::DELETE, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    with_json(app, Method::POST, uri, token, body).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    with_json(app, Method::PUT, uri, token, body).await
}

async fn with_json(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = builder(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
