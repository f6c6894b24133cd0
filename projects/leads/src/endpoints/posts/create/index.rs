use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    db::{
        post::{
            models::{NewPost, Post},
            queries::insert_post,
        },
        PgPool,
    },
    endpoints::error_response,
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("InvalidBody: {source}")]
    InvalidBody {
        #[from]
        source: JsonRejection,
    },
    #[error("PostUrlMissing")]
    PostUrlMissing,
    #[error("InvalidPostDate: {value}")]
    InvalidPostDate { value: String },
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
    InsertPost {
        #[from]
        source: crate::db::post::queries::InsertPostError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidBody {
                source: JsonRejection::JsonDataError(source),
            } => error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid request body: {}", source.body_text()),
            ),
            HandlerError::InvalidBody { .. } | HandlerError::PostUrlMissing => {
                error_response(StatusCode::BAD_REQUEST, "Post URL is required.")
            }
            HandlerError::InvalidPostDate { value } => error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid post_date: {value}"),
            ),
            err @ (HandlerError::GetConnectionFromPool { .. }
            | HandlerError::Join { .. }
            | HandlerError::InsertPost { .. }) => {
                error!(error = %err, "failed to add post");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to add post.")
            }
        }
    }
}

/// JSON payload sent by Make.com or the dashboard.
#[derive(Deserialize)]
pub struct CreatePostRequestBody {
    post_url: Option<String>,
    post_date: Option<String>,
}

/// Axum handler: POST /api/posts
pub async fn handler(
    Extension(pool): Extension<PgPool>,
    payload: Result<Json<CreatePostRequestBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(input) = match payload {
        Ok(body) => body,
        Err(source) => return HandlerError::InvalidBody { source }.into_response(),
    };

    let post_url = match input.post_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return HandlerError::PostUrlMissing.into_response(),
    };

    let post_date = match input.post_date.as_deref() {
        None => None,
        Some(raw) => match parse_post_date(raw) {
            Ok(date) => date,
            Err(err) => return err.into_response(),
        },
    };

    let saved = tokio::task::spawn_blocking(move || {
        store_post(&pool, &NewPost { post_url: &post_url, post_date })
    })
    .await;

    match saved {
        Ok(Ok(post)) => {
            info!(post_id = post.id, post_url = %post.post_url, "post added");
            (
                StatusCode::CREATED,
                Json(json!({ "message": "Post added successfully!", "post": post })),
            )
                .into_response()
        }
        Ok(Err(err)) => err.into_response(),
        Err(source) => HandlerError::Join { source }.into_response(),
    }
}

fn store_post(pool: &PgPool, new: &NewPost) -> Result<Post, HandlerError> {
    let mut conn = pool.get()?;
    Ok(insert_post(&mut conn, new)?)
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (read as UTC
/// midnight). A blank value means no date.
pub fn parse_post_date(raw: &str) -> Result<Option<DateTime<Utc>>, HandlerError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Some(midnight.and_utc()))
        .ok_or_else(|| HandlerError::InvalidPostDate {
            value: raw.to_string(),
        })
}
