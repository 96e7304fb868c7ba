mod corridor;
mod db;
mod ingest;
mod search;

use clap::{Parser, Subcommand};
use echarger_core::{AppConfig, RouteSegment};
use tracing_subscriber::EnvFilter;

use crate::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "echarger-cli")]
#[command(about = "Fast chargers along the Rotterdam - Santa Pola corridor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Import fast chargers from OpenChargeMap, segment by segment
    Ingest {
        /// Only sweep this corridor segment (e.g. NL-BE)
        #[arg(long)]
        segment: Option<RouteSegment>,
        /// Show what would be imported without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// List the chargers reachable on the remaining range
    Search(SearchArgs),
    /// Print the corridor segments
    Segments,
    /// Print the preset corridor cities
    Waypoints,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        None => println!("echarger-cli ready; run with --help for commands"),
        Some(Commands::Segments) => corridor::print_segments(),
        Some(Commands::Waypoints) => corridor::print_waypoints(),
        Some(Commands::Db { command }) => {
            let (_, pool) = connect().await?;
            match command {
                DbCommands::Ping => db::run_db_ping(&pool).await?,
                DbCommands::Migrate => db::run_db_migrate(&pool).await?,
            }
        }
        Some(Commands::Ingest { segment, dry_run }) => {
            let (config, pool) = connect().await?;
            ingest::run_ingest(&pool, &config, segment, dry_run).await?;
        }
        Some(Commands::Search(args)) => {
            let (config, pool) = connect().await?;
            search::run_search(&pool, &config, &args).await?;
        }
    }

    Ok(())
}

/// Load config, install logging and open the pool for database commands.
async fn connect() -> anyhow::Result<(AppConfig, sqlx::PgPool)> {
    let config = echarger_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = echarger_db::PoolConfig::from_app_config(&config);
    let pool = echarger_db::connect_pool(&config.database_url, pool_config).await?;
    Ok((config, pool))
}

/// Attempt to mark an ingest run as failed, logging any secondary error.
async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = echarger_db::fail_ingest_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark ingest run as failed"
        );
    }
}
