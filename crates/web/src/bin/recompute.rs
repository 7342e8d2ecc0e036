use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use storage::Database;
use storage::dto::heat::EventHeatsResponse;
use storage::services::pipeline;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "recompute")]
#[command(about = "Recompute rankings, standings, heats and the timetable", long_about = None)]
struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Log every ranked event
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-rank every event of a category and print its standings
    Category {
        #[arg(long)]
        category_id: Uuid,
    },
    /// Recompute every category of a championship
    Championship {
        #[arg(long)]
        championship_id: Uuid,
    },
    /// Print the current standings without writing anything
    Leaderboard {
        #[arg(long)]
        category_id: Uuid,
    },
    /// Seed heats for the next event of a category that has none
    ScheduleNext {
        #[arg(long)]
        category_id: Uuid,
    },
    /// Rebuild start times for every heat of a championship
    Timetable {
        #[arg(long)]
        championship_id: Uuid,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    let db = Database::new(&cli.database_url)
        .await
        .context("Failed to connect to database")?;
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    match cli.command {
        Commands::Category { category_id } => {
            let report = pipeline::recompute_category(&db, category_id)
                .await
                .with_context(|| format!("Failed to recompute category {}", category_id))?;
            for warning in &report.warnings {
                tracing::warn!(
                    event_id = %warning.event_id,
                    entrant_id = %warning.entrant_id,
                    "{}",
                    warning.message
                );
            }
            print_json(&report)?;
        }
        Commands::Championship { championship_id } => {
            let report = pipeline::recompute_championship(&db, championship_id)
                .await
                .with_context(|| format!("Failed to recompute championship {}", championship_id))?;
            if !report.failures.is_empty() {
                tracing::error!(
                    failed = report.failures.len(),
                    "Some categories could not be recomputed"
                );
            }
            print_json(&report)?;
        }
        Commands::Leaderboard { category_id } => {
            let leaderboard = pipeline::leaderboard(&db, category_id)
                .await
                .with_context(|| format!("Failed to load leaderboard of {}", category_id))?;
            print_json(&leaderboard)?;
        }
        Commands::ScheduleNext { category_id } => {
            let (event, heats) = pipeline::reschedule_next_event(&db, category_id)
                .await
                .with_context(|| format!("Failed to schedule heats for {}", category_id))?;
            tracing::info!(event = %event.name, heats = heats.len(), "Scheduled heats");
            print_json(&EventHeatsResponse::new(event.event_id, category_id, heats))?;
        }
        Commands::Timetable { championship_id } => {
            let timetable = pipeline::rebuild_timetable(&db, championship_id)
                .await
                .with_context(|| format!("Failed to rebuild timetable of {}", championship_id))?;
            print_json(&timetable)?;
        }
    }

    Ok(())
}
