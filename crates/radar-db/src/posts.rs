//! Database operations for the `posts` table.

use chrono::{DateTime, Utc};
use radar_core::RawPost;
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::DbError;

const MAX_TITLE_CHARS: usize = 500;

const POST_COLUMNS: &str =
    "id, platform, title, content, upvotes, comments, url, created_at, ingested_at";

/// A row from the `posts` table. Never updated after insert.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub platform: String,
    pub title: String,
    pub content: String,
    pub upvotes: i32,
    pub comments: i32,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
}

/// Insert a collected post unless `(platform, url)` is already stored.
///
/// Returns `Some(row)` for a newly stored post and `None` when the pair
/// already existed; existing rows are never modified. Titles longer than
/// 500 characters are truncated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_post_if_new(
    conn: &mut PgConnection,
    post: &RawPost,
) -> Result<Option<PostRow>, DbError> {
    let title: String = post.title.chars().take(MAX_TITLE_CHARS).collect();

    let row = sqlx::query_as::<_, PostRow>(&format!(
        "INSERT INTO posts (id, platform, title, content, upvotes, comments, url, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (platform, url) DO NOTHING \
         RETURNING {POST_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(post.platform.as_str())
    .bind(title)
    .bind(&post.content)
    .bind(post.upvotes)
    .bind(post.comments)
    .bind(&post.url)
    .bind(post.created_at)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Posts whose extracted pain belongs to `cluster_id`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cluster_posts<'e, E>(
    executor: E,
    cluster_id: Uuid,
) -> Result<Vec<PostRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, PostRow>(
        "SELECT p.id, p.platform, p.title, p.content, p.upvotes, p.comments, p.url, \
                p.created_at, p.ingested_at \
         FROM posts p \
         JOIN extracted_pains ep ON ep.post_id = p.id \
         WHERE ep.cluster_id = $1 \
         ORDER BY p.created_at DESC, p.id",
    )
    .bind(cluster_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
