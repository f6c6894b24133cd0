use chrono::Utc;
use diesel::prelude::*;
use thiserror::Error;
use crate::db::{scrape_job::models::*, schema::active_scrape_job::dsl::*};

#[derive(Debug, Error)]
pub enum RecordActiveJobError {
    #[error("RecordActiveJob: {source}")]
    RecordActiveJob{
        #[from]
        source: diesel::result::Error
    },
}

/// The table holds a single row under this key.
pub const ACTIVE_JOB_ID: i32 = 1;

/// Replaces whatever job was active with one for `target_post`.
pub fn record_active_job(
    conn: &mut PgConnection,
    target_post: i32
) -> Result<ScrapeJob, RecordActiveJobError> {
    let job = diesel::insert_into(active_scrape_job)
        .values(&NewScrapeJob { id: ACTIVE_JOB_ID, post_id: target_post })
        .on_conflict(id)
        .do_update()
        .set((post_id.eq(target_post), created_at.eq(Utc::now())))
        .returning(ScrapeJob::as_returning())
        .get_result(conn)?;

    Ok(job)
}

#[derive(Debug, Error)]
pub enum GetActiveJobError {
    #[error("GetActiveJob: {source}")]
    GetActiveJob{
        #[from]
        source: diesel::result::Error
    },
}

pub fn current_active_job(
    conn: &mut PgConnection
) -> Result<Option<ScrapeJob>, GetActiveJobError> {
    active_scrape_job
        .find(ACTIVE_JOB_ID)
        .select(ScrapeJob::as_select())
        .first(conn)
        .optional()
        .map_err(|source| GetActiveJobError::GetActiveJob{ source })
}
