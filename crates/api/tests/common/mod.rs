#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use bidwork_api::auth::jwt::{generate_access_token, JwtConfig};
use bidwork_api::config::{ServerConfig, StoreBackend};
use bidwork_api::router::build_app_router;
use bidwork_api::state::AppState;
use bidwork_core::roles::{ROLE_ADMIN, ROLE_CLIENT, ROLE_SPECIALIST};
use bidwork_core::types::DbId;
use bidwork_db::models::specialist::CreateSpecialist;
use bidwork_events::EventBus;
use bidwork_lifecycle::Marketplace;

pub const ADMIN_ID: DbId = 1;
pub const CLIENT_ID: DbId = 500;
pub const SPECIALIST_ID: DbId = 42;

const TEST_SECRET: &str = "test-secret";

/// Build a test `ServerConfig` over the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 1,
        jwt: JwtConfig::new(TEST_SECRET),
        store_backend: StoreBackend::Memory,
        database_url: None,
    }
}

/// The full application router plus direct access to the services for
/// seeding collaborator records.
pub struct TestApp {
    pub router: Router,
    pub marketplace: Arc<Marketplace>,
}

pub fn build_test_app() -> TestApp {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let marketplace = Arc::new(Marketplace::in_memory(event_bus.clone()));
    let state = AppState {
        marketplace: Arc::clone(&marketplace),
        config: Arc::new(config.clone()),
        event_bus,
    };
    TestApp {
        router: build_app_router(state, &config),
        marketplace,
    }
}

pub fn token(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &JwtConfig::new(TEST_SECRET)).unwrap()
}

pub fn admin_token() -> String {
    token(ADMIN_ID, ROLE_ADMIN)
}

pub fn client_token() -> String {
    token(CLIENT_ID, ROLE_CLIENT)
}

pub fn specialist_token() -> String {
    token(SPECIALIST_ID, ROLE_SPECIALIST)
}

pub async fn seed_specialist(app: &TestApp, id: DbId, name: &str, profession: &str) {
    app.marketplace
        .store()
        .upsert_specialist(CreateSpecialist {
            id,
            display_name: name.to_string(),
            avatar_url: None,
            profession: Some(profession.to_string()),
        })
        .await
        .unwrap();
}

/// Send a request through the router, with an optional bearer token and
/// JSON body.
pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &TestApp, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(
    app: &TestApp,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Parse a decimal that was serialized as a JSON string.
pub fn decimal(value: &serde_json::Value) -> rust_decimal::Decimal {
    value.as_str().unwrap().parse().unwrap()
}

pub fn dec(s: &str) -> rust_decimal::Decimal {
    s.parse().unwrap()
}
