pub mod root;
pub mod posts;
pub mod leads;
pub mod scrape;
pub mod webhook;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::ScrapeSettings, db::PgPool};

/// Webhook deliveries and CSV uploads can be large.
pub const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

pub fn router(pool: PgPool, scrape: Arc<ScrapeSettings>) -> Router {
    Router::new()
        .route("/", get(root::index::handler))
        .route(
            "/api/posts",
            get(posts::list::index::handler).post(posts::create::index::handler),
        )
        .route("/api/leads", get(leads::list::index::handler))
        .route("/api/upload-leads", post(leads::upload::index::handler))
        .route("/api/scrape", post(scrape::launch::index::handler))
        .route("/api/webhook/leads", post(webhook::leads::index::handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(Extension(pool))
        .layer(Extension(scrape))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// `{"error": message}` with the given status.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
