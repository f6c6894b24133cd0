#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, Request, StatusCode},
    Router,
};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use http_body_util::BodyExt;
use projects_leads::{
    config::{GoogleSheetsSettings, PhantomBusterSettings, ScrapeQueue, ScrapeSettings},
    db::{build_pool, run_migrations, PgPool},
    endpoints::router,
};
use tower::util::ServiceExt;

/// A pool that never connects; requests touching the database time out fast.
pub fn unreachable_pool() -> PgPool {
    let manager = ConnectionManager::<PgConnection>::new("postgres://nobody@127.0.0.1:1/none");
    Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_millis(300))
        .build_unchecked(manager)
}

/// Pool against `TEST_DATABASE_URL` with migrations applied, if configured.
pub fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = build_pool(&url, 8, Duration::from_secs(5)).expect("build test pool");
    let mut conn = pool.get().expect("test database connection");
    run_migrations(&mut conn).expect("run migrations");
    Some(pool)
}

pub fn scrape_settings(phantom_base_url: &str) -> ScrapeSettings {
    ScrapeSettings {
        queue: ScrapeQueue::PhantomBuster,
        phantombuster: PhantomBusterSettings {
            api_key: Some("test-key".into()),
            agent_id: "42".into(),
            base_url: phantom_base_url.into(),
        },
        google: GoogleSheetsSettings {
            client_email: None,
            private_key: None,
            sheet_id: None,
            range: "Sheet1!A2:B2".into(),
            token_uri: "http://127.0.0.1:1/token".into(),
            base_url: "http://127.0.0.1:1".into(),
        },
    }
}

pub fn app(pool: PgPool, phantom_base_url: &str) -> Router {
    router(pool, Arc::new(scrape_settings(phantom_base_url)))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.oneshot(request).await.expect("router response");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("response body")
        .to_bytes();
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_body(body: &Bytes) -> serde_json::Value {
    serde_json::from_slice(body).expect("json body")
}
