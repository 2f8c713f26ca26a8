//! Aggregate reads backing the dashboard overview.

use sqlx::PgExecutor;

use crate::DbError;

/// Table-wide counts plus the mean idea score.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DashboardCountsRow {
    pub total_posts: i64,
    pub total_pains: i64,
    pub total_clusters: i64,
    /// `0.0` when no ideas exist.
    pub avg_final_score: f64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RevenueModelCountRow {
    pub revenue_model: String,
    pub idea_count: i64,
}

/// Return the headline counts in a single round trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn dashboard_counts<'e, E>(executor: E) -> Result<DashboardCountsRow, DbError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, DashboardCountsRow>(
        "SELECT \
            (SELECT COUNT(*) FROM posts) AS total_posts, \
            (SELECT COUNT(*) FROM extracted_pains) AS total_pains, \
            (SELECT COUNT(*) FROM problem_clusters) AS total_clusters, \
            COALESCE((SELECT AVG(final_score) FROM ideas), 0)::float8 AS avg_final_score",
    )
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Idea counts per revenue model, most common first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_revenue_model_counts<'e, E>(
    executor: E,
    limit: i64,
) -> Result<Vec<RevenueModelCountRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, RevenueModelCountRow>(
        "SELECT revenue_model, COUNT(*) AS idea_count \
         FROM ideas \
         GROUP BY revenue_model \
         ORDER BY idea_count DESC, revenue_model \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
