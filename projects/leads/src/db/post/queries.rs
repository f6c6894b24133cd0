use diesel::prelude::*;
use crate::db::{post::models::*, schema::instagram_posts::dsl::*};

#[derive(Debug, thiserror::Error)]
pub enum InsertPostError {
    #[error("InsertPost: {source}")]
    InsertPost{
        #[from]
        source: diesel::result::Error
    },
}

pub fn insert_post(
    conn: &mut PgConnection,
    new: &NewPost
) -> Result<Post, InsertPostError> {
    diesel::insert_into(instagram_posts)
        .values(new)
        .returning(Post::as_returning())
        .get_result(conn)
        .map_err(|source| InsertPostError::InsertPost{ source })
}

#[derive(Debug, thiserror::Error)]
pub enum ListPostsError {
    #[error("ListPosts: {source}")]
    ListPosts{
        #[from]
        source: diesel::result::Error
    },
}

/// Newest first; ties on `created_at` fall back to insertion order.
pub fn list_posts(
    conn: &mut PgConnection
) -> Result<Vec<Post>, ListPostsError> {
    instagram_posts
        .select(Post::as_select())
        .order((created_at.desc(), id.desc()))
        .load(conn)
        .map_err(|source| ListPostsError::ListPosts{ source })
}
