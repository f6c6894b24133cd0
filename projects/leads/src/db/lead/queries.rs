use chrono::Utc;
use diesel::prelude::*;
use thiserror::Error;
use crate::db::{lead::models::*, schema::instagram_agent_leads::dsl::*};

#[derive(Debug, Error)]
pub enum SaveLeadError {
    #[error("SaveLead: {source}")]
    SaveLead{
        #[from]
        source: diesel::result::Error
    },
}

/// Inserts the lead, or on a username clash only bumps `last_updated`
/// (and re-links `post_id` when the delivery carries one).
pub fn save_lead(
    conn: &mut PgConnection,
    new: &NewLead
) -> Result<SaveOutcome, SaveLeadError> {
    let inserted = diesel::insert_into(instagram_agent_leads)
        .values(new)
        .on_conflict(username)
        .do_nothing()
        .execute(conn)?;

    if inserted > 0 {
        return Ok(SaveOutcome::Inserted);
    }

    let existing = instagram_agent_leads.filter(username.eq(new.username));
    let now = Utc::now();

    match new.post_id {
        Some(linked_post) => diesel::update(existing)
            .set((last_updated.eq(now), post_id.eq(linked_post)))
            .execute(conn)?,
        None => diesel::update(existing)
            .set(last_updated.eq(now))
            .execute(conn)?,
    };

    Ok(SaveOutcome::Refreshed)
}

/// Saves a whole delivery atomically.
pub fn save_leads(
    conn: &mut PgConnection,
    leads: &[NewLead]
) -> Result<SaveSummary, SaveLeadError> {
    conn.transaction(|conn| {
        let mut summary = SaveSummary::default();
        for lead in leads {
            summary.record(save_lead(conn, lead)?);
        }
        Ok(summary)
    })
}

#[derive(Debug, Error)]
pub enum ListLeadsError {
    #[error("ListLeads: {source}")]
    ListLeads{
        #[from]
        source: diesel::result::Error
    },
}

pub fn list_leads(
    conn: &mut PgConnection
) -> Result<Vec<Lead>, ListLeadsError> {
    instagram_agent_leads
        .select(Lead::as_select())
        .order((last_updated.desc(), id.desc()))
        .load(conn)
        .map_err(|source| ListLeadsError::ListLeads{ source })
}
