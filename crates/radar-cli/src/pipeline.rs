//! One-shot workflow commands, for cron-less deployments and manual runs.

use clap::Subcommand;
use radar_core::AppConfig;
use radar_engine::PipelineOrchestrator;

#[derive(Debug, Subcommand)]
pub enum PipelineCommands {
    /// Collect, extract, cluster, ideate and score in one transaction
    Run,
    /// Refresh cluster rollups and 7/30-day trend counts
    Trends,
}

/// # Errors
///
/// Returns an error if the orchestrator cannot be built or the workflow
/// fails. A failed workflow leaves no partial writes behind.
pub(crate) async fn run(
    pool: sqlx::PgPool,
    config: &AppConfig,
    command: PipelineCommands,
) -> anyhow::Result<()> {
    let orchestrator = PipelineOrchestrator::from_config(pool, config)?;

    match command {
        PipelineCommands::Run => {
            let summary = orchestrator.run_full_pipeline().await?;
            println!("collected posts:  {}", summary.collected_posts);
            println!("stored posts:     {}", summary.stored_posts);
            println!("extracted pains:  {}", summary.extracted_pains);
            println!("new clusters:     {}", summary.new_clusters);
        }
        PipelineCommands::Trends => {
            let summary = orchestrator.recalculate_cluster_trends().await?;
            println!(
                "trend refresh complete: {} rollup(s), {} trend row(s) changed",
                summary.rollups_updated, summary.trends_updated
            );
        }
    }

    Ok(())
}
