mod analyses;
mod plan;

use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use seomentor_core::YearMonth;
use seomentor_db::{ArtifactStore, PgArtifactStore};
use seomentor_pipeline::AnalysisService;
use tracing_subscriber::EnvFilter;

use crate::analyses::AnalyzeArgs;

#[derive(Debug, Parser)]
#[command(name = "seomentor-cli")]
#[command(about = "SEOmentor command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one homepage and store the resulting plan
    Analyze(AnalyzeArgs),
    /// Show a stored analysis
    Show {
        /// Project id
        id: i64,
    },
    /// List stored analyses, most recent first
    List {
        /// Maximum number of analyses to show
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Show the execution guide for one roadmap day
    Detail {
        /// Project id
        id: i64,
        /// Roadmap day (1-based)
        day: u32,
        /// Regenerate even when a cached guide exists
        #[arg(long)]
        refresh: bool,
    },
    /// Render one month of a plan as a calendar
    Calendar {
        /// Project id
        id: i64,
        /// Plan start date (YYYY-MM-DD); defaults to the creation date
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Month to render (YYYY-MM); defaults to the first plan month
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// Send a plan report to a recipient through the configured webhook
    Email {
        /// Project id
        id: i64,
        /// Recipient address
        recipient: String,
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
        println!("seomentor-cli: run with --help to list commands");
        return Ok(());
    };

    let config = seomentor_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = seomentor_db::PoolConfig::from_app_config(&config);
    let pool = seomentor_db::connect_pool(&config.database_url, pool_config).await?;

    if let Commands::Db { command } = &command {
        match command {
            DbCommands::Ping => {
                seomentor_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = seomentor_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        }
        return Ok(());
    }

    let store: Arc<dyn ArtifactStore> = Arc::new(PgArtifactStore::new(pool));
    let service = AnalysisService::from_config(&config, store)?;
    tracing::debug!(env = ?config.env, "analysis service ready");

    match command {
        Commands::Analyze(args) => analyses::run_analyze(&service, args).await,
        Commands::Show { id } => analyses::run_show(&service, id).await,
        Commands::List { limit } => analyses::run_list(&service, limit).await,
        Commands::Detail { id, day, refresh } => plan::run_detail(&service, id, day, refresh).await,
        Commands::Calendar { id, start, month } => {
            plan::run_calendar(&service, id, start, month).await
        }
        Commands::Email { id, recipient } => plan::run_email(&service, id, &recipient).await,
        Commands::Db { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests;
