//! Database operations for the `problem_clusters` table.
//!
//! Rollup (`post_count`, `avg_urgency`) and trend (`trend_7d`, `trend_30d`)
//! columns are derived from cluster membership in `extracted_pains` and are
//! only ever written by the refresh functions here.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::DbError;

const MAX_NAME_CHARS: usize = 255;

const CLUSTER_COLUMNS: &str =
    "id, name, summary, avg_urgency, post_count, trend_7d, trend_30d, created_at, updated_at";

/// A row from the `problem_clusters` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClusterRow {
    pub id: Uuid,
    pub name: String,
    pub summary: String,
    pub avg_urgency: f64,
    pub post_count: i32,
    pub trend_7d: i32,
    pub trend_30d: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a freshly formed cluster.
#[derive(Debug, Clone)]
pub struct NewCluster {
    pub name: String,
    pub summary: String,
    pub avg_urgency: f64,
    pub post_count: i32,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert a new cluster. Trend counts start at zero.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_cluster(
    conn: &mut PgConnection,
    cluster: &NewCluster,
) -> Result<ClusterRow, DbError> {
    let name: String = cluster.name.chars().take(MAX_NAME_CHARS).collect();

    let row = sqlx::query_as::<_, ClusterRow>(&format!(
        "INSERT INTO problem_clusters (id, name, summary, avg_urgency, post_count) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {CLUSTER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(&cluster.summary)
    .bind(cluster.avg_urgency)
    .bind(cluster.post_count)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

/// Recompute `post_count` and `avg_urgency` for every cluster from its
/// current pain membership.
///
/// Only rows whose values change are written, so repeated calls with no
/// membership change leave `updated_at` untouched. Returns the number of
/// clusters updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn refresh_cluster_rollups(conn: &mut PgConnection) -> Result<u64, DbError> {
    let result = sqlx::query(
        "WITH stats AS ( \
             SELECT c.id, \
                    COUNT(p.id)::int AS post_count, \
                    COALESCE(ROUND(AVG(p.urgency_score)::numeric, 2)::float8, 0) AS avg_urgency \
             FROM problem_clusters c \
             LEFT JOIN extracted_pains p ON p.cluster_id = c.id \
             GROUP BY c.id \
         ) \
         UPDATE problem_clusters c \
         SET post_count = s.post_count, avg_urgency = s.avg_urgency, updated_at = NOW() \
         FROM stats s \
         WHERE c.id = s.id \
           AND (c.post_count <> s.post_count OR c.avg_urgency <> s.avg_urgency)",
    )
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Recompute `trend_7d` / `trend_30d` for every cluster: the number of member
/// pains created at or after `since_7d` / `since_30d` respectively.
///
/// Returns the number of clusters whose counts changed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn refresh_cluster_trends(
    conn: &mut PgConnection,
    since_7d: DateTime<Utc>,
    since_30d: DateTime<Utc>,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "WITH windows AS ( \
             SELECT c.id, \
                    (COUNT(p.id) FILTER (WHERE p.created_at >= $1))::int AS trend_7d, \
                    (COUNT(p.id) FILTER (WHERE p.created_at >= $2))::int AS trend_30d \
             FROM problem_clusters c \
             LEFT JOIN extracted_pains p ON p.cluster_id = c.id \
             GROUP BY c.id \
         ) \
         UPDATE problem_clusters c \
         SET trend_7d = w.trend_7d, trend_30d = w.trend_30d, updated_at = NOW() \
         FROM windows w \
         WHERE c.id = w.id \
           AND (c.trend_7d <> w.trend_7d OR c.trend_30d <> w.trend_30d)",
    )
    .bind(since_7d)
    .bind(since_30d)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// List clusters, hottest first (`trend_7d DESC, avg_urgency DESC`).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_clusters<'e, E>(executor: E, limit: i64) -> Result<Vec<ClusterRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ClusterRow>(&format!(
        "SELECT {CLUSTER_COLUMNS} FROM problem_clusters \
         ORDER BY trend_7d DESC, avg_urgency DESC, created_at DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// List the largest clusters by member count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_largest_clusters<'e, E>(
    executor: E,
    limit: i64,
) -> Result<Vec<ClusterRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ClusterRow>(&format!(
        "SELECT {CLUSTER_COLUMNS} FROM problem_clusters \
         ORDER BY post_count DESC, avg_urgency DESC, created_at DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Fetch one cluster by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no cluster has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_cluster<'e, E>(executor: E, id: Uuid) -> Result<ClusterRow, DbError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ClusterRow>(&format!(
        "SELECT {CLUSTER_COLUMNS} FROM problem_clusters WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or(DbError::NotFound)
}
