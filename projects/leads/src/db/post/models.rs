use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use crate::db::schema::instagram_posts;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = instagram_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub post_url: String,
    pub post_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = instagram_posts)]
pub struct NewPost<'a> {
    pub post_url: &'a str,
    pub post_date: Option<DateTime<Utc>>,
}
