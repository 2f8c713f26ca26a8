use axum::{extract::State, Extension, Json};
use radar_db::{ClusterRow, RevenueModelCountRow};
use serde::Serialize;
use uuid::Uuid;

use super::{
    clusters::ClusterItem, ideas::IdeaItem, map_db_error, ApiError, ApiResponse, AppState,
};
use crate::middleware::RequestId;

const TOP_CLUSTERS: i64 = 6;
const TRENDING_CLUSTERS: i64 = 6;
const TOP_IDEAS: i64 = 8;
const REVENUE_MODELS: i64 = 6;

#[derive(Debug, Serialize)]
pub(super) struct KpiTile {
    label: &'static str,
    value: String,
    delta: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendSignal {
    cluster_id: Uuid,
    cluster_name: String,
    trend_7d: i32,
    trend_30d: i32,
}

impl From<ClusterRow> for TrendSignal {
    fn from(row: ClusterRow) -> Self {
        Self {
            cluster_id: row.id,
            cluster_name: row.name,
            trend_7d: row.trend_7d,
            trend_30d: row.trend_30d,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct RevenueModelSummary {
    revenue_model: String,
    idea_count: i64,
}

impl From<RevenueModelCountRow> for RevenueModelSummary {
    fn from(row: RevenueModelCountRow) -> Self {
        Self {
            revenue_model: row.revenue_model,
            idea_count: row.idea_count,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct QuickLaunchPlan {
    title: String,
    bullet_points: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub(super) struct DashboardOverview {
    kpis: Vec<KpiTile>,
    top_clusters: Vec<ClusterItem>,
    trending_signals: Vec<TrendSignal>,
    top_ideas: Vec<IdeaItem>,
    revenue_summary: Vec<RevenueModelSummary>,
    quick_launch_plan: QuickLaunchPlan,
}

/// Launch checklist for the best-scoring idea, or setup steps when nothing
/// has been generated yet.
fn quick_launch_plan(best_idea_name: Option<&str>) -> QuickLaunchPlan {
    match best_idea_name {
        Some(name) => QuickLaunchPlan {
            title: format!("Quick Launch Plan: {name}"),
            bullet_points: vec![
                "Interview 8 ICP users from matched pain cluster.",
                "Build MVP core workflow + billing in week 2.",
                "Pilot with 3 design partners and measure activation.",
                "Ship paid beta with a usage-based expansion path.",
            ],
        },
        None => QuickLaunchPlan {
            title: "No ideas generated yet".to_string(),
            bullet_points: vec![
                "Run the scrape pipeline to collect new market signals.",
                "Check filters and include at least one industry tag.",
            ],
        },
    }
}

fn kpi_tiles(counts: &radar_db::DashboardCountsRow) -> Vec<KpiTile> {
    vec![
        KpiTile {
            label: "Posts Collected",
            value: counts.total_posts.to_string(),
            delta: "Live",
        },
        KpiTile {
            label: "Pain Signals",
            value: counts.total_pains.to_string(),
            delta: "Analyzed",
        },
        KpiTile {
            label: "Problem Clusters",
            value: counts.total_clusters.to_string(),
            delta: "Grouped",
        },
        KpiTile {
            label: "Avg Validation",
            value: format!("{:.1}", counts.avg_final_score),
            delta: "/100",
        },
    ]
}

pub(super) async fn overview(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DashboardOverview>>, ApiError> {
    let counts = radar_db::dashboard_counts(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let top_clusters = radar_db::list_largest_clusters(&state.pool, TOP_CLUSTERS)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let trending = radar_db::list_clusters(&state.pool, TRENDING_CLUSTERS)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let top_ideas = radar_db::list_top_ideas(&state.pool, TOP_IDEAS)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let revenue = radar_db::list_revenue_model_counts(&state.pool, REVENUE_MODELS)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let plan = quick_launch_plan(top_ideas.first().map(|idea| idea.idea_name.as_str()));

    let data = DashboardOverview {
        kpis: kpi_tiles(&counts),
        top_clusters: top_clusters.into_iter().map(ClusterItem::from).collect(),
        trending_signals: trending.into_iter().map(TrendSignal::from).collect(),
        top_ideas: top_ideas.into_iter().map(IdeaItem::from).collect(),
        revenue_summary: revenue.into_iter().map(RevenueModelSummary::from).collect(),
        quick_launch_plan: plan,
    };
    Ok(ApiResponse::new(data, req_id.0))
}
