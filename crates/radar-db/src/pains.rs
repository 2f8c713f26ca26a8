//! Database operations for the `extracted_pains` table.

use chrono::{DateTime, Utc};
use radar_core::GeoScope;
use sqlx::{types::Json, PgConnection, PgExecutor};
use uuid::Uuid;

use crate::DbError;

const MAX_INDUSTRY_CHARS: usize = 32;
const MAX_TARGET_USER_CHARS: usize = 255;

const PAIN_COLUMNS: &str = "id, post_id, cluster_id, pain_point, target_user, urgency_score, \
     willingness_to_pay, existing_solutions, geo_scope, industry, created_at";

/// A row from the `extracted_pains` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PainRow {
    pub id: Uuid,
    pub post_id: Uuid,
    /// `None` until the cluster engine assigns the pain to a cluster.
    pub cluster_id: Option<Uuid>,
    pub pain_point: String,
    pub target_user: String,
    pub urgency_score: i32,
    pub willingness_to_pay: i32,
    pub existing_solutions: Json<Vec<String>>,
    pub geo_scope: String,
    pub industry: String,
    pub created_at: DateTime<Utc>,
}

/// Values for a new `extracted_pains` row.
#[derive(Debug, Clone)]
pub struct NewPain {
    pub post_id: Uuid,
    pub pain_point: String,
    pub target_user: String,
    pub urgency_score: i32,
    pub willingness_to_pay: i32,
    pub existing_solutions: Vec<String>,
    pub geo_scope: GeoScope,
    pub industry: String,
}

/// Insert the pain extracted from one post.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including when the post
/// already owns a pain (`uq_extracted_pains_post`).
pub async fn insert_pain(conn: &mut PgConnection, pain: &NewPain) -> Result<PainRow, DbError> {
    let target_user: String = pain.target_user.chars().take(MAX_TARGET_USER_CHARS).collect();
    let industry: String = pain.industry.chars().take(MAX_INDUSTRY_CHARS).collect();

    let row = sqlx::query_as::<_, PainRow>(&format!(
        "INSERT INTO extracted_pains \
             (id, post_id, pain_point, target_user, urgency_score, willingness_to_pay, \
              existing_solutions, geo_scope, industry) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {PAIN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(pain.post_id)
    .bind(&pain.pain_point)
    .bind(target_user)
    .bind(pain.urgency_score)
    .bind(pain.willingness_to_pay)
    .bind(Json(&pain.existing_solutions))
    .bind(pain.geo_scope.as_str())
    .bind(industry)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

/// All pains not yet assigned to a cluster, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unclustered_pains<'e, E>(executor: E) -> Result<Vec<PainRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, PainRow>(&format!(
        "SELECT {PAIN_COLUMNS} FROM extracted_pains \
         WHERE cluster_id IS NULL \
         ORDER BY created_at, id"
    ))
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Pains belonging to a cluster, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cluster_pains<'e, E>(
    executor: E,
    cluster_id: Uuid,
) -> Result<Vec<PainRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, PainRow>(&format!(
        "SELECT {PAIN_COLUMNS} FROM extracted_pains \
         WHERE cluster_id = $1 \
         ORDER BY created_at DESC, id"
    ))
    .bind(cluster_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Pains belonging to a cluster, most urgent first, newest first within a
/// tie.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cluster_pains_by_urgency<'e, E>(
    executor: E,
    cluster_id: Uuid,
) -> Result<Vec<PainRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, PainRow>(&format!(
        "SELECT {PAIN_COLUMNS} FROM extracted_pains \
         WHERE cluster_id = $1 \
         ORDER BY urgency_score DESC, created_at DESC, id"
    ))
    .bind(cluster_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Point every pain in `pain_ids` at `cluster_id`. Returns the rows updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn assign_pains_to_cluster(
    conn: &mut PgConnection,
    cluster_id: Uuid,
    pain_ids: &[Uuid],
) -> Result<u64, DbError> {
    if pain_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query("UPDATE extracted_pains SET cluster_id = $1 WHERE id = ANY($2)")
        .bind(cluster_id)
        .bind(pain_ids)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
