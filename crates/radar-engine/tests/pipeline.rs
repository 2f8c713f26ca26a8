//! Full pipeline and trend refresh against a fresh database per test, with
//! stub collectors and the disabled completion service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use radar_collectors::Collector;
use radar_core::{AdminFilter, GeoScope, Platform, RawPost};
use radar_engine::{
    DisabledCompletion, PipelineOrchestrator, PipelineSettings, PipelineSummary, TrendSummary,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct StubCollector {
    platform: Platform,
    posts: Vec<RawPost>,
}

#[async_trait]
impl Collector for StubCollector {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn default_limit(&self) -> usize {
        30
    }

    async fn fetch(&self, _keywords: &[String], _limit: usize) -> Vec<RawPost> {
        self.posts.clone()
    }
}

fn post(platform: Platform, url: &str, title: &str, content: &str) -> RawPost {
    RawPost {
        platform,
        title: title.to_string(),
        content: content.to_string(),
        upvotes: 25,
        comments: 15,
        url: url.to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    }
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        default_keywords: vec!["churn".to_string()],
        default_geo_scope: GeoScope::Global,
        default_industries: Vec::new(),
    }
}

fn orchestrator(pool: &PgPool, collectors: Vec<Box<dyn Collector>>) -> PipelineOrchestrator {
    PipelineOrchestrator::new(
        pool.clone(),
        collectors,
        Arc::new(DisabledCompletion),
        settings(),
    )
}

fn stub(platform: Platform, posts: Vec<RawPost>) -> Box<dyn Collector> {
    Box::new(StubCollector { platform, posts })
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn full_run_counts_and_rerun_adds_nothing(pool: PgPool) {
    let reddit = stub(
        Platform::Reddit,
        vec![
            post(Platform::Reddit, "https://r/1", "Invoice reconciliation eats our week", "old"),
            post(Platform::Reddit, "https://r/1", "Invoice reconciliation eats our week", "new"),
        ],
    );
    let twitter = stub(
        Platform::Twitter,
        vec![post(Platform::Twitter, "https://x/2", "Hiring engineers takes months", "")],
    );
    let pipeline = orchestrator(&pool, vec![reddit, twitter]);

    let first = pipeline.run_full_pipeline().await.unwrap();

    assert_eq!(
        first,
        PipelineSummary {
            collected_posts: 2,
            stored_posts: 2,
            extracted_pains: 2,
            new_clusters: 2,
        }
    );
    assert_eq!(count(&pool, "posts").await, 2);
    assert_eq!(count(&pool, "ideas").await, 10);

    let content: String = sqlx::query_scalar("SELECT content FROM posts WHERE url = 'https://r/1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(content, "new");

    let second = pipeline.run_full_pipeline().await.unwrap();

    assert_eq!(second.collected_posts, 2);
    assert_eq!(second.stored_posts, 0);
    assert_eq!(second.extracted_pains, 0);
    assert_eq!(second.new_clusters, 0);
    assert_eq!(count(&pool, "posts").await, 2);
    assert_eq!(count(&pool, "problem_clusters").await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn single_pain_becomes_singleton_cluster_with_five_ideas(pool: PgPool) {
    let reddit = stub(
        Platform::Reddit,
        vec![post(
            Platform::Reddit,
            "https://r/9",
            "Payroll compliance keeps breaking",
            "This is urgent, we need help",
        )],
    );
    let pipeline = orchestrator(&pool, vec![reddit]);

    pipeline.run_full_pipeline().await.unwrap();

    let clusters = radar_db::list_clusters(&pool, 10).await.unwrap();
    assert_eq!(clusters.len(), 1);
    let cluster = &clusters[0];
    assert_eq!(cluster.post_count, 1);
    assert!((cluster.avg_urgency - 9.0).abs() < f64::EPSILON);
    assert_eq!(cluster.name, "Payroll / Compliance / Keeps");
    assert_eq!(cluster.trend_7d, 1);
    assert_eq!(cluster.trend_30d, 1);

    let ideas = radar_db::list_cluster_ideas(&pool, cluster.id).await.unwrap();
    assert_eq!(ideas.len(), 5);
    let of_type = |t: &str| ideas.iter().filter(|i| i.idea_type == t).count();
    assert_eq!(of_type("saas"), 3);
    assert_eq!(of_type("automation"), 1);
    assert_eq!(of_type("enterprise"), 1);
    assert!(ideas
        .iter()
        .all(|i| (0.0..=100.0).contains(&i.final_score) && i.pain_intensity == 90));
}

#[sqlx::test(migrations = "../../migrations")]
async fn india_scope_drops_posts_without_location(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let india = AdminFilter {
        include_keywords: vec!["churn".to_string()],
        exclude_keywords: Vec::new(),
        geo_scope: GeoScope::India,
        industries: Vec::new(),
        updated_at: None,
    };
    radar_db::replace_admin_filter(&mut conn, &india).await.unwrap();
    drop(conn);

    let reddit = stub(
        Platform::Reddit,
        vec![
            post(Platform::Reddit, "https://r/a", "Churn is killing our startup", "Berlin team"),
            post(Platform::Reddit, "https://r/b", "Churn is killing our startup", "Mumbai team"),
        ],
    );
    let pipeline = orchestrator(&pool, vec![reddit]);

    let summary = pipeline.run_full_pipeline().await.unwrap();

    assert_eq!(summary.stored_posts, 1);
    let geo: String = sqlx::query_scalar("SELECT geo_scope FROM extracted_pains")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(geo, "INDIA");
}

#[sqlx::test(migrations = "../../migrations")]
async fn storage_failure_rolls_back_the_whole_run(pool: PgPool) {
    let too_long = format!("https://r/{}", "x".repeat(1_200));
    let reddit = stub(
        Platform::Reddit,
        vec![
            post(Platform::Reddit, "https://r/ok", "Fine post", ""),
            post(Platform::Reddit, &too_long, "Broken post", ""),
        ],
    );
    let pipeline = orchestrator(&pool, vec![reddit]);

    assert!(pipeline.run_full_pipeline().await.is_err());

    assert_eq!(count(&pool, "posts").await, 0);
    assert_eq!(count(&pool, "admin_filters").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn empty_collection_still_succeeds(pool: PgPool) {
    let pipeline = orchestrator(&pool, vec![stub(Platform::Twitter, Vec::new())]);

    let summary = pipeline.run_full_pipeline().await.unwrap();

    assert_eq!(summary, PipelineSummary::default());
    assert_eq!(count(&pool, "admin_filters").await, 1);
}

// ---------------------------------------------------------------------------
// Trend refresh
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn trend_refresh_is_idempotent(pool: PgPool) {
    let reddit = stub(
        Platform::Reddit,
        vec![post(Platform::Reddit, "https://r/t", "Inventory sync is broken", "")],
    );
    let pipeline = orchestrator(&pool, vec![reddit]);
    pipeline.run_full_pipeline().await.unwrap();

    let before = radar_db::list_clusters(&pool, 10).await.unwrap();
    pipeline.recalculate_cluster_trends().await.unwrap();
    let again = pipeline.recalculate_cluster_trends().await.unwrap();
    let after = radar_db::list_clusters(&pool, 10).await.unwrap();

    assert_eq!(again, TrendSummary::default());
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.post_count, a.post_count);
        assert_eq!(b.trend_7d, a.trend_7d);
        assert_eq!(b.trend_30d, a.trend_30d);
        assert_eq!(b.updated_at, a.updated_at);
    }
}
