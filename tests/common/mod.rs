//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bank_api::api::{self, AppState, TOKEN_HEADER};
use bank_api::auth::{FixedClock, TokenService};
use bank_api::store::MemoryAccountStore;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tower::util::ServiceExt;

pub const NOW: i64 = 1_700_000_000;
pub const SECRET: &str = "integration-secret";

/// Router over an in-memory store with a controllable clock
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryAccountStore>,
    pub tokens: TokenService,
    pub clock: Arc<FixedClock>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryAccountStore::new());
    let clock = Arc::new(FixedClock::at(NOW));
    let tokens = TokenService::new(SECRET, 3600, clock.clone()).expect("valid secret");
    let router = api::create_router(AppState::new(store.clone(), tokens.clone()));

    TestApp {
        router,
        store,
        tokens,
        clock,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub token: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let token = response
            .headers()
            .get(TOKEN_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            token,
            body,
        }
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    builder.body(Body::empty()).unwrap()
}

/// Connect to the database in DATABASE_URL and make sure the schema exists
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    // Concurrent CREATE ... IF NOT EXISTS can still race in Postgres
    static SCHEMA: OnceCell<()> = OnceCell::const_new();
    SCHEMA
        .get_or_init(|| async {
            bank_api::db::init_schema(&pool)
                .await
                .expect("Failed to create schema");
        })
        .await;

    pool
}
