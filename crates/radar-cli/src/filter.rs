use clap::Subcommand;
use radar_core::{AdminFilter, AdminFilterUpdate, AppConfig};
use radar_engine::PipelineSettings;

#[derive(Debug, Subcommand)]
pub enum FilterCommands {
    /// Print the current filter, creating it from defaults if missing
    Show,
    /// Replace the filter contents
    Set {
        /// Comma-separated include keywords
        #[arg(long, value_delimiter = ',')]
        include: Vec<String>,
        /// Comma-separated exclude keywords
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
        /// INDIA or GLOBAL
        #[arg(long, default_value = "GLOBAL")]
        geo_scope: String,
        /// Industry tag; repeat or comma-separate for several
        #[arg(long = "industry", value_delimiter = ',')]
        industries: Vec<String>,
    },
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: FilterCommands,
) -> anyhow::Result<()> {
    let mut conn = pool.acquire().await?;

    let filter = match command {
        FilterCommands::Show => {
            let defaults = PipelineSettings::from_app_config(config).default_filter();
            radar_db::get_or_create_admin_filter(&mut conn, &defaults).await?
        }
        FilterCommands::Set {
            include,
            exclude,
            geo_scope,
            industries,
        } => {
            let update = AdminFilterUpdate {
                include_keywords: include,
                exclude_keywords: exclude,
                geo_scope,
                industries,
            };
            // validation happens before the connection is written to
            let filter = update.validate()?;
            radar_db::replace_admin_filter(&mut conn, &filter).await?
        }
    };

    print_filter(&filter);
    Ok(())
}

fn print_filter(filter: &AdminFilter) {
    println!("include:    {}", filter.include_keywords.join(", "));
    println!("exclude:    {}", filter.exclude_keywords.join(", "));
    println!("geo scope:  {}", filter.geo_scope);
    println!("industries: {}", filter.industries.join(", "));
    if let Some(updated_at) = filter.updated_at {
        println!("updated:    {}", updated_at.format("%Y-%m-%d %H:%M UTC"));
    }
}
