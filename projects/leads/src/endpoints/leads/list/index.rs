use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;
use tracing::error;

use crate::{
    db::{lead::{models::Lead, queries::list_leads}, PgPool},
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
    ListLeads {
        #[from]
        source: crate::db::lead::queries::ListLeadsError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "failed to fetch leads");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch leads.")
    }
}

/// Axum handler: GET /api/leads
pub async fn handler(Extension(pool): Extension<PgPool>) -> impl IntoResponse {
    match tokio::task::spawn_blocking(move || fetch_leads(&pool)).await {
        Ok(Ok(leads)) => (StatusCode::OK, Json(leads)).into_response(),
        Ok(Err(err)) => err.into_response(),
        Err(source) => HandlerError::Join { source }.into_response(),
    }
}

fn fetch_leads(pool: &PgPool) -> Result<Vec<Lead>, HandlerError> {
    let mut conn = pool.get()?;
    Ok(list_leads(&mut conn)?)
}
