use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use crate::db::schema::instagram_agent_leads;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = instagram_agent_leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Lead {
    pub id: i32,
    pub username: String,
    pub profile_url: String,
    pub post_id: Option<i32>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = instagram_agent_leads)]
pub struct NewLead<'a> {
    pub username: &'a str,
    pub profile_url: &'a str,
    pub post_id: Option<i32>,
}

/// What happened to a single delivered lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// First time this username was seen.
    Inserted,
    /// Username already stored; only its timestamp (and post link) moved.
    Refreshed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub inserted: usize,
    pub refreshed: usize,
}

impl SaveSummary {
    pub fn record(&mut self, outcome: SaveOutcome) {
        match outcome {
            SaveOutcome::Inserted => self.inserted += 1,
            SaveOutcome::Refreshed => self.refreshed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_outcome() {
        let mut summary = SaveSummary::default();
        summary.record(SaveOutcome::Inserted);
        summary.record(SaveOutcome::Refreshed);
        summary.record(SaveOutcome::Inserted);
        assert_eq!(summary, SaveSummary { inserted: 2, refreshed: 1 });
    }
}
