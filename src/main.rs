use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::net::SocketAddr;
use tracing::info;

mod analytics;
mod config;
mod dashboard;
mod db;
mod import;

use analytics::{Analyzer, Category, OutcomeStore};
use config::{Command, Config};
use dashboard::AppState;
use db::Database;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let db = Database::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path))?;
    info!("Database opened: {}", config.database_path);

    let analyzer = Analyzer::new(db.clone(), config.analyzer_settings());
    if config.include_incomplete {
        info!("Including in-progress weeks in the analysis");
    }

    match config.command {
        Command::Import { file } => {
            let stats = import::import_season_file(&db, &file)?;
            print_json(&serde_json::json!({
                "weeks": stats.weeks,
                "matchups": stats.matchups,
                "outcomes": stats.outcomes,
            }))?;
        }
        Command::Categories => {
            let rows: Vec<_> = Category::ALL
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "category": c,
                        "name": c.display_name(),
                        "direction": c.direction(),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        Command::Teams => print_json(&db.list_teams()?)?,
        Command::Summary => print_json(&analyzer.analysis_summary()?)?,
        Command::Thresholds { category: Some(c) } => {
            let category: Category = c.parse()?;
            print_json(&analyzer.compute_thresholds(category)?)?;
        }
        Command::Thresholds { category: None } => {
            print_json(&analyzer.compute_all_thresholds())?;
        }
        Command::Analyze { team_id } => {
            let team_id = team_id.context("no team id configured")?;
            print_json(&analyzer.analyze_team(team_id)?)?;
        }
        Command::Serve { addr } => {
            let app = dashboard::router(AppState { analyzer });
            let addr: SocketAddr = addr.parse()?;
            info!("Analysis API listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
