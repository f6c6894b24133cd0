use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection}, Extension, Json, Multipart,
        Query,
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    db::{
        lead::{models::SaveSummary, queries::save_leads},
        PgPool,
    },
    endpoints::error_response,
    utils::leads::{parse_leads_csv, ExtractedLeads, ParseLeadsCsvError},
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("NotMultipart: {source}")]
    NotMultipart {
        #[from]
        source: MultipartRejection,
    },
    #[error("ReadMultipart: {source}")]
    ReadMultipart {
        #[from]
        source: MultipartError,
    },
    #[error("FileMissing")]
    FileMissing,
    #[error("ParseCsv: {source}")]
    ParseCsv {
        #[from]
        source: ParseLeadsCsvError,
    },
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
    SaveLeads {
        #[from]
        source: crate::db::lead::queries::SaveLeadError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::NotMultipart { source } => error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid multipart upload: {}", source.body_text()),
            ),
            HandlerError::ReadMultipart { source } => error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid multipart upload: {}", source.body_text()),
            ),
            HandlerError::FileMissing => {
                error_response(StatusCode::BAD_REQUEST, "A CSV file is required.")
            }
            HandlerError::ParseCsv { source } => error_response(
                StatusCode::BAD_REQUEST,
                &format!("Could not read CSV: {source}"),
            ),
            err @ (HandlerError::GetConnectionFromPool { .. }
            | HandlerError::Join { .. }
            | HandlerError::SaveLeads { .. }) => {
                error!(error = %err, "database error during csv import");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to import leads.")
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadTarget {
    post_id: Option<i32>,
}

/// Axum handler: POST /api/upload-leads
///
/// Takes the first file part (or a part named `file`) as the CSV export.
pub async fn handler(
    Extension(pool): Extension<PgPool>,
    Query(target): Query<UploadTarget>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(source) => return HandlerError::NotMultipart { source }.into_response(),
    };

    let data = match read_csv_part(multipart).await {
        Ok(data) => data,
        Err(err) => return err.into_response(),
    };

    let extracted = match parse_leads_csv(&data) {
        Ok(extracted) => extracted,
        Err(source) => return HandlerError::ParseCsv { source }.into_response(),
    };
    let skipped = extracted.skipped;

    let saved = tokio::task::spawn_blocking(move || {
        import_leads(&pool, &extracted, target.post_id)
    })
    .await;

    match saved {
        Ok(Ok(summary)) => {
            info!(
                inserted = summary.inserted,
                refreshed = summary.refreshed,
                skipped,
                "imported leads from csv"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Leads uploaded successfully!",
                    "inserted": summary.inserted,
                    "refreshed": summary.refreshed,
                    "skipped": skipped,
                })),
            )
                .into_response()
        }
        Ok(Err(err)) => err.into_response(),
        Err(source) => HandlerError::Join { source }.into_response(),
    }
}

fn import_leads(
    pool: &PgPool,
    extracted: &ExtractedLeads,
    post_id: Option<i32>,
) -> Result<SaveSummary, HandlerError> {
    let mut conn = pool.get()?;
    Ok(save_leads(&mut conn, &extracted.to_new_leads(post_id))?)
}

async fn read_csv_part(mut multipart: Multipart) -> Result<Vec<u8>, HandlerError> {
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() || field.name() == Some("file") {
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(HandlerError::FileMissing)
}
