use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;
use tracing::error;

use crate::{
    db::{post::{models::Post, queries::list_posts}, PgPool},
    endpoints::error_response,
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error("Join: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error(transparent)]
    ListPosts {
        #[from]
        source: crate::db::post::queries::ListPostsError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "failed to fetch posts");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch posts.")
    }
}

/// Axum handler: GET /api/posts
pub async fn handler(Extension(pool): Extension<PgPool>) -> impl IntoResponse {
    match tokio::task::spawn_blocking(move || fetch_posts(&pool)).await {
        Ok(Ok(posts)) => (StatusCode::OK, Json(posts)).into_response(),
        Ok(Err(err)) => err.into_response(),
        Err(source) => HandlerError::Join { source }.into_response(),
    }
}

fn fetch_posts(pool: &PgPool) -> Result<Vec<Post>, HandlerError> {
    let mut conn = pool.get()?;
    Ok(list_posts(&mut conn)?)
}
