//! Database operations for the `ideas` table. Ideas are immutable once
//! inserted; there is no update path.

use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgConnection, PgExecutor};
use uuid::Uuid;

use crate::DbError;

const IDEA_COLUMNS: &str = "id, cluster_id, idea_type, idea_name, description, icp, \
     revenue_model, mvp_features, pricing_estimate, pain_intensity, frequency, budget_size, \
     competition_level, speed_to_mvp, scalability, final_score, execution_roadmap, tech_stack, \
     gtm_strategy, launch_plan_30d, created_at";

/// A row from the `ideas` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdeaRow {
    pub id: Uuid,
    pub cluster_id: Uuid,
    pub idea_type: String,
    pub idea_name: String,
    pub description: String,
    pub icp: String,
    pub revenue_model: String,
    pub mvp_features: Json<Vec<String>>,
    pub pricing_estimate: String,
    pub pain_intensity: i32,
    pub frequency: i32,
    pub budget_size: i32,
    pub competition_level: i32,
    pub speed_to_mvp: i32,
    pub scalability: i32,
    pub final_score: f64,
    pub execution_roadmap: String,
    pub tech_stack: String,
    pub gtm_strategy: String,
    pub launch_plan_30d: String,
    pub created_at: DateTime<Utc>,
}

/// A generated idea together with its validation scores.
#[derive(Debug, Clone)]
pub struct NewIdea {
    pub cluster_id: Uuid,
    pub idea_type: String,
    pub idea_name: String,
    pub description: String,
    pub icp: String,
    pub revenue_model: String,
    pub mvp_features: Vec<String>,
    pub pricing_estimate: String,
    pub pain_intensity: i32,
    pub frequency: i32,
    pub budget_size: i32,
    pub competition_level: i32,
    pub speed_to_mvp: i32,
    pub scalability: i32,
    pub final_score: f64,
    pub execution_roadmap: String,
    pub tech_stack: String,
    pub gtm_strategy: String,
    pub launch_plan_30d: String,
}

/// Insert one scored idea.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (for example when the
/// cluster does not exist).
pub async fn insert_idea(conn: &mut PgConnection, idea: &NewIdea) -> Result<IdeaRow, DbError> {
    let row = sqlx::query_as::<_, IdeaRow>(&format!(
        "INSERT INTO ideas ( \
             id, cluster_id, idea_type, idea_name, description, icp, revenue_model, \
             mvp_features, pricing_estimate, pain_intensity, frequency, budget_size, \
             competition_level, speed_to_mvp, scalability, final_score, execution_roadmap, \
             tech_stack, gtm_strategy, launch_plan_30d \
         ) VALUES ( \
             $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
             $11, $12, $13, $14, $15, $16, $17, $18, $19, $20 \
         ) \
         RETURNING {IDEA_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(idea.cluster_id)
    .bind(&idea.idea_type)
    .bind(truncate(&idea.idea_name))
    .bind(&idea.description)
    .bind(truncate(&idea.icp))
    .bind(truncate(&idea.revenue_model))
    .bind(Json(&idea.mvp_features))
    .bind(truncate(&idea.pricing_estimate))
    .bind(idea.pain_intensity)
    .bind(idea.frequency)
    .bind(idea.budget_size)
    .bind(idea.competition_level)
    .bind(idea.speed_to_mvp)
    .bind(idea.scalability)
    .bind(idea.final_score)
    .bind(&idea.execution_roadmap)
    .bind(&idea.tech_stack)
    .bind(&idea.gtm_strategy)
    .bind(&idea.launch_plan_30d)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

/// Ideas for one cluster, best first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cluster_ideas<'e, E>(
    executor: E,
    cluster_id: Uuid,
) -> Result<Vec<IdeaRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, IdeaRow>(&format!(
        "SELECT {IDEA_COLUMNS} FROM ideas \
         WHERE cluster_id = $1 \
         ORDER BY final_score DESC, created_at"
    ))
    .bind(cluster_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Highest-scoring ideas across all clusters.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_top_ideas<'e, E>(executor: E, limit: i64) -> Result<Vec<IdeaRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, IdeaRow>(&format!(
        "SELECT {IDEA_COLUMNS} FROM ideas \
         ORDER BY final_score DESC, created_at DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Fetch one idea by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no idea has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_idea<'e, E>(executor: E, id: Uuid) -> Result<IdeaRow, DbError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, IdeaRow>(&format!("SELECT {IDEA_COLUMNS} FROM ideas WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(DbError::NotFound)
}

// VARCHAR(255) columns.
fn truncate(value: &str) -> String {
    value.chars().take(255).collect()
}
