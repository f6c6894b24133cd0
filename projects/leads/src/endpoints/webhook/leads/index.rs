use axum::{
    body::Bytes,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    db::{
        lead::{models::SaveSummary, queries::save_leads},
        scrape_job::queries::current_active_job,
        PgPool,
    },
    utils::{
        leads::{extract_leads, ExtractedLeads},
        payload::{normalize_webhook_payload, PayloadShape},
    },
};

pub const NO_LEADS_MESSAGE: &str = "Webhook received, but contained no leads to process.";
pub const PROCESSED_MESSAGE: &str = "Webhook received and leads processed.";

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
    GetActiveJob {
        #[from]
        source: crate::db::scrape_job::queries::GetActiveJobError,
    },
    #[error(transparent)]
    SaveLeads {
        #[from]
        source: crate::db::lead::queries::SaveLeadError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "database error during webhook import");
        (StatusCode::INTERNAL_SERVER_ERROR, "Error processing webhook data.").into_response()
    }
}

/// Phantom Buster can be pointed at `...?post_id=N` to pin the post
/// explicitly; otherwise the active scrape job decides.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookTarget {
    post_id: Option<i32>,
}

/// Axum handler: POST /api/webhook/leads
pub async fn handler(
    Extension(pool): Extension<PgPool>,
    Query(target): Query<WebhookTarget>,
    body: Bytes,
) -> impl IntoResponse {
    info!(bytes = body.len(), "phantom buster webhook received");

    let normalized = normalize_webhook_payload(&body);
    if normalized.shape == PayloadShape::Unrecognized {
        warn!("webhook payload did not contain a recognizable array of leads");
    }
    if normalized.leads.is_empty() {
        return (StatusCode::OK, NO_LEADS_MESSAGE).into_response();
    }

    let extracted = extract_leads(&normalized.leads);
    info!(
        shape = ?normalized.shape,
        received = normalized.leads.len(),
        usable = extracted.records.len(),
        skipped = extracted.skipped,
        "processing leads from webhook"
    );

    let saved = tokio::task::spawn_blocking(move || {
        store_webhook_leads(&pool, &extracted, target.post_id)
    })
    .await;

    match saved {
        Ok(Ok((post_id, summary))) => {
            info!(
                post_id = ?post_id,
                inserted = summary.inserted,
                refreshed = summary.refreshed,
                "saved webhook leads"
            );
            (StatusCode::OK, PROCESSED_MESSAGE).into_response()
        }
        Ok(Err(err)) => err.into_response(),
        Err(source) => HandlerError::Join { source }.into_response(),
    }
}

/// Attributes the leads to `pinned_post`, or else to the active scrape job.
fn store_webhook_leads(
    pool: &PgPool,
    extracted: &ExtractedLeads,
    pinned_post: Option<i32>,
) -> Result<(Option<i32>, SaveSummary), HandlerError> {
    let mut conn = pool.get()?;

    let post_id = match pinned_post {
        Some(post_id) => Some(post_id),
        None => current_active_job(&mut conn)?.map(|job| job.post_id),
    };

    let summary = save_leads(&mut conn, &extracted.to_new_leads(post_id))?;
    Ok((post_id, summary))
}
