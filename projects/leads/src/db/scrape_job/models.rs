use chrono::{DateTime, Utc};
use diesel::prelude::*;
use crate::db::schema::active_scrape_job;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = active_scrape_job)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScrapeJob {
    pub id: i32,
    pub post_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = active_scrape_job)]
pub struct NewScrapeJob {
    pub id: i32,
    pub post_id: i32,
}
