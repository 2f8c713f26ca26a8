//! Full pipeline and trend-only refresh workflows.
//!
//! Each workflow runs inside one database transaction: a storage failure
//! at any step rolls back every write made by that run.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use radar_collectors::Collector;
use radar_core::{AdminFilter, AppConfig, GeoScope, RawPost};
use radar_db::{NewIdea, NewPain};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::cluster::ClusterEngine;
use crate::completion::{completion_from_config, CompletionService};
use crate::error::PipelineError;
use crate::extractor::{PainExtraction, PainExtractor};
use crate::filtering::{apply_manual_filters, dedupe_by_identity};
use crate::ideas::{IdeaCandidate, IdeaGenerator};
use crate::scorer::{score_for_cluster, ValidationScores};

/// Defaults that seed the admin filter and stand in for an empty include list.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub default_keywords: Vec<String>,
    pub default_geo_scope: GeoScope,
    pub default_industries: Vec<String>,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            default_keywords: config.default_keywords.clone(),
            default_geo_scope: config.default_geo_scope,
            default_industries: config.default_industries.clone(),
        }
    }

    #[must_use]
    pub fn default_filter(&self) -> AdminFilter {
        AdminFilter::with_defaults(
            &self.default_keywords,
            self.default_geo_scope,
            &self.default_industries,
        )
    }

    /// Keywords a run searches for: the filter's include list, or the
    /// configured defaults when that list is empty.
    #[must_use]
    pub fn run_keywords(&self, filter: &AdminFilter) -> Vec<String> {
        if filter.include_keywords.is_empty() {
            self.default_keywords.clone()
        } else {
            filter.include_keywords.clone()
        }
    }
}

/// Counts reported by a full pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub collected_posts: usize,
    pub stored_posts: usize,
    pub extracted_pains: usize,
    pub new_clusters: usize,
}

/// Clusters touched by a trend refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrendSummary {
    pub rollups_updated: u64,
    pub trends_updated: u64,
}

pub struct PipelineOrchestrator {
    pool: PgPool,
    collectors: Vec<Box<dyn Collector>>,
    extractor: PainExtractor,
    generator: IdeaGenerator,
    clusters: ClusterEngine,
    settings: PipelineSettings,
}

impl PipelineOrchestrator {
    #[must_use]
    pub fn new(
        pool: PgPool,
        collectors: Vec<Box<dyn Collector>>,
        completion: Arc<dyn CompletionService>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            pool,
            collectors,
            extractor: PainExtractor::new(Arc::clone(&completion)),
            generator: IdeaGenerator::new(completion),
            clusters: ClusterEngine::default(),
            settings,
        }
    }

    /// Build the orchestrator with the configured collectors and completion
    /// service.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Collector`] or [`PipelineError::Completion`]
    /// if an HTTP client cannot be constructed.
    pub fn from_config(pool: PgPool, config: &AppConfig) -> Result<Self, PipelineError> {
        Ok(Self::new(
            pool,
            radar_collectors::collectors_from_config(config)?,
            completion_from_config(config)?,
            PipelineSettings::from_app_config(config),
        ))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Collect, filter, store, extract, cluster, ideate, score, and refresh
    /// trends, committing everything at once.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] on any storage failure; nothing from the
    /// run is persisted in that case.
    pub async fn run_full_pipeline(&self) -> Result<PipelineSummary, PipelineError> {
        let mut tx = self.pool.begin().await?;

        let filter =
            radar_db::get_or_create_admin_filter(&mut tx, &self.settings.default_filter()).await?;
        let keywords = self.settings.run_keywords(&filter);

        let collected = self.collect(&keywords).await;
        let posts = dedupe_by_identity(apply_manual_filters(collected, &filter));
        let mut summary = PipelineSummary {
            collected_posts: posts.len(),
            ..PipelineSummary::default()
        };

        let mut stored = Vec::new();
        for post in &posts {
            if let Some(row) = radar_db::insert_post_if_new(&mut tx, post).await? {
                stored.push(row);
            }
        }
        summary.stored_posts = stored.len();

        for post in &stored {
            let extraction = self.extractor.extract(post).await;
            radar_db::insert_pain(&mut tx, &new_pain(post.id, extraction, &filter)).await?;
            summary.extracted_pains += 1;
        }

        let new_clusters = self.clusters.cluster_unassigned_pains(&mut tx).await?;
        summary.new_clusters = new_clusters.len();

        for cluster in &new_clusters {
            let pains = radar_db::list_cluster_pains(&mut *tx, cluster.id).await?;
            let candidates = self.generator.generate_for_cluster(cluster, &pains).await;
            for candidate in candidates {
                let scores = score_for_cluster(cluster, &candidate);
                radar_db::insert_idea(&mut tx, &new_idea(cluster.id, candidate, scores)).await?;
            }
        }

        self.refresh(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(
            collected = summary.collected_posts,
            stored = summary.stored_posts,
            extracted = summary.extracted_pains,
            new_clusters = summary.new_clusters,
            "pipeline run complete"
        );
        Ok(summary)
    }

    /// Recompute rollups and 7/30-day trend counts for every cluster.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the refresh cannot be committed.
    pub async fn recalculate_cluster_trends(&self) -> Result<TrendSummary, PipelineError> {
        let mut tx = self.pool.begin().await?;
        let summary = self.refresh(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(
            rollups_updated = summary.rollups_updated,
            trends_updated = summary.trends_updated,
            "cluster trends refreshed"
        );
        Ok(summary)
    }

    async fn refresh(&self, conn: &mut PgConnection) -> Result<TrendSummary, PipelineError> {
        let rollups_updated = self.clusters.refresh_cluster_rollups(conn).await?;
        let trends_updated = self.clusters.refresh_cluster_trends(conn, Utc::now()).await?;
        Ok(TrendSummary {
            rollups_updated,
            trends_updated,
        })
    }

    /// Query every collector concurrently; each contributes its own batch
    /// or nothing.
    async fn collect(&self, keywords: &[String]) -> Vec<RawPost> {
        let batches = join_all(
            self.collectors
                .iter()
                .map(|c| async move { (c.platform(), c.fetch(keywords, c.default_limit()).await) }),
        )
        .await;

        batches
            .into_iter()
            .flat_map(|(platform, batch)| {
                tracing::debug!(platform = %platform, count = batch.len(), "collector finished");
                batch
            })
            .collect()
    }
}

/// Pains inherit the run's geo scope and are tagged with the filter's first
/// industry.
fn new_pain(post_id: uuid::Uuid, extraction: PainExtraction, filter: &AdminFilter) -> NewPain {
    NewPain {
        post_id,
        pain_point: extraction.pain_point,
        target_user: extraction.target_user,
        urgency_score: extraction.urgency_score,
        willingness_to_pay: extraction.willingness_to_pay,
        existing_solutions: extraction.existing_solutions,
        geo_scope: filter.geo_scope,
        industry: filter.primary_industry().to_string(),
    }
}

fn new_idea(cluster_id: uuid::Uuid, idea: IdeaCandidate, scores: ValidationScores) -> NewIdea {
    NewIdea {
        cluster_id,
        idea_type: idea.idea_type.as_str().to_string(),
        idea_name: idea.idea_name,
        description: idea.description,
        icp: idea.icp,
        revenue_model: idea.revenue_model,
        mvp_features: idea.mvp_features,
        pricing_estimate: idea.pricing_estimate,
        pain_intensity: scores.pain_intensity,
        frequency: scores.frequency,
        budget_size: scores.budget_size,
        competition_level: scores.competition_level,
        speed_to_mvp: scores.speed_to_mvp,
        scalability: scores.scalability,
        final_score: scores.final_score,
        execution_roadmap: idea.execution_roadmap,
        tech_stack: idea.tech_stack,
        gtm_strategy: idea.gtm_strategy,
        launch_plan_30d: idea.launch_plan_30d,
    }
}
