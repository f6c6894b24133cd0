use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use interfaces_google_sheets::index::{
    fetch_access_token, update_values, FetchAccessTokenError, ServiceAccountCredentials,
    SheetsUpdateResult, UpdateValuesError,
};
use interfaces_phantombuster_launch::index::{
    launch_phantom, LaunchPhantomError, PhantomLaunchResult,
};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    config::{GoogleSheetsSettings, PhantomBusterSettings, ScrapeQueue, ScrapeSettings},
    db::{scrape_job::queries::record_active_job, PgPool},
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
    #[error("InvalidPostId: {value}")]
    InvalidPostId { value: String },
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
    RecordActiveJob {
        #[from]
        source: crate::db::scrape_job::queries::RecordActiveJobError,
    },
    #[error("StartPhantomRun: {source}")]
    StartPhantomRun {
        #[from]
        source: StartPhantomRunError,
    },
    #[error("QueueInSheet: {source}")]
    QueueInSheet {
        #[from]
        source: QueueInSheetError,
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
            HandlerError::InvalidPostId { value } => error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid post_id: {value}"),
            ),
            err => {
                error!(error = %err, "failed to launch scrape job");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to launch scrape job.")
            }
        }
    }
}

/// Make.com sends ids as numbers or as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PostIdField {
    Number(i32),
    Text(String),
}

impl PostIdField {
    /// A blank string counts as no id.
    pub fn resolve(self) -> Result<Option<i32>, HandlerError> {
        match self {
            PostIdField::Number(post_id) => Ok(Some(post_id)),
            PostIdField::Text(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse()
                    .map(Some)
                    .map_err(|_| HandlerError::InvalidPostId { value: raw.clone() })
            }
        }
    }
}

#[derive(Deserialize)]
pub struct ScrapeRequestBody {
    post_url: Option<String>,
    post_id: Option<PostIdField>,
}

/// Axum handler: POST /api/scrape
///
/// The active scrape job is only recorded once the backend accepted the
/// run, so a failed launch leaves the previous job in place.
pub async fn handler(
    Extension(pool): Extension<PgPool>,
    Extension(settings): Extension<Arc<ScrapeSettings>>,
    payload: Result<Json<ScrapeRequestBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(input) = match payload {
        Ok(body) => body,
        Err(source) => return HandlerError::InvalidBody { source }.into_response(),
    };

    let post_url = match input.post_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return HandlerError::PostUrlMissing.into_response(),
    };

    let post_id = match input.post_id.map(PostIdField::resolve).transpose() {
        Ok(post_id) => post_id.flatten(),
        Err(err) => return err.into_response(),
    };

    let launched = match settings.queue {
        ScrapeQueue::PhantomBuster => start_phantom_run(&settings.phantombuster, &post_url)
            .await
            .map_err(HandlerError::from),
        ScrapeQueue::Sheets => queue_in_sheet(&settings.google, &post_url, post_id)
            .await
            .map_err(HandlerError::from),
    };
    if let Err(err) = launched {
        return err.into_response();
    }

    if let Some(post_id) = post_id {
        let recorded = tokio::task::spawn_blocking(move || mark_active(&pool, post_id)).await;
        match recorded {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return err.into_response(),
            Err(source) => return HandlerError::Join { source }.into_response(),
        }
    }

    info!(post_url = %post_url, post_id = ?post_id, queue = ?settings.queue, "scrape job started");
    (
        StatusCode::OK,
        Json(json!({ "message": format!("Scraping job started for {post_url}.") })),
    )
        .into_response()
}

fn mark_active(pool: &PgPool, post_id: i32) -> Result<(), HandlerError> {
    let mut conn = pool.get()?;
    record_active_job(&mut conn, post_id)?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum StartPhantomRunError {
    #[error("Phantom Buster API key is not configured")]
    ApiKeyMissing,

    #[error("LaunchPhantom: {source}")]
    LaunchPhantom {
        #[from]
        source: LaunchPhantomError,
    },

    #[error("Rejected: {status}: {body}")]
    Rejected {
        status: StatusCode,
        body: String,
    },
}

pub async fn start_phantom_run(
    settings: &PhantomBusterSettings,
    post_url: &str,
) -> Result<(), StartPhantomRunError> {
    let api_key = settings
        .api_key
        .as_deref()
        .ok_or(StartPhantomRunError::ApiKeyMissing)?;

    let PhantomLaunchResult { body, status } =
        launch_phantom(&settings.base_url, api_key, &settings.agent_id, &[post_url]).await?;

    if !status.is_success() {
        return Err(StartPhantomRunError::Rejected { status, body });
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum QueueInSheetError {
    #[error("Google Sheets credentials are not configured: {missing}")]
    CredentialsMissing { missing: &'static str },

    #[error("FetchAccessToken: {source}")]
    FetchAccessToken {
        #[from]
        source: FetchAccessTokenError,
    },

    #[error("UpdateValues: {source}")]
    UpdateValues {
        #[from]
        source: UpdateValuesError,
    },

    #[error("Rejected: {status}: {body}")]
    Rejected {
        status: StatusCode,
        body: String,
    },
}

/// Writes `[post_url, post_id]` into the configured range; the phantom
/// reads its next target from there.
pub async fn queue_in_sheet(
    settings: &GoogleSheetsSettings,
    post_url: &str,
    post_id: Option<i32>,
) -> Result<(), QueueInSheetError> {
    let missing = |name| QueueInSheetError::CredentialsMissing { missing: name };
    let client_email = settings.client_email.as_deref().ok_or_else(|| missing("GOOGLE_CLIENT_EMAIL"))?;
    let private_key = settings.private_key.as_deref().ok_or_else(|| missing("GOOGLE_PRIVATE_KEY"))?;
    let sheet_id = settings.sheet_id.as_deref().ok_or_else(|| missing("GOOGLE_SHEET_ID"))?;

    let credentials = ServiceAccountCredentials {
        client_email,
        private_key,
    };
    let token = fetch_access_token(&settings.token_uri, &credentials).await?;

    let row = vec![
        post_url.to_string(),
        post_id.map(|id| id.to_string()).unwrap_or_default(),
    ];

    let SheetsUpdateResult { body, status } = update_values(
        &settings.base_url,
        &token.access_token,
        sheet_id,
        &settings.range,
        &[row],
    )
    .await?;

    if !status.is_success() {
        return Err(QueueInSheetError::Rejected { status, body });
    }

    Ok(())
}
