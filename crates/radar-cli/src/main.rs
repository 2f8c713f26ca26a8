mod filter;
mod pipeline;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{filter::FilterCommands, pipeline::PipelineCommands};

#[derive(Debug, Parser)]
#[command(name = "radar-cli")]
#[command(about = "Pain-signal radar command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the collection pipeline or the trend refresh once
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Inspect or replace the admin filter
    Filter {
        #[command(subcommand)]
        command: FilterCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("radar-cli: no command given; see --help");
        return Ok(());
    };

    let config = radar_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = radar_db::PoolConfig::from_app_config(&config);
    let pool = radar_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            radar_db::health_check(&pool).await?;
            println!("database: ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = radar_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Pipeline { command } => pipeline::run(pool, &config, command).await?,
        Commands::Filter { command } => filter::run(&pool, &config, command).await?,
    }

    Ok(())
}
