use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::analytics::AnalyzerSettings;

/// Winning thresholds and team assessment for a head-to-head fantasy hockey league
#[derive(Parser, Debug, Clone)]
#[command(name = "fantasy-thresholds", version, about)]
pub struct Config {
    /// SQLite database path
    #[arg(long, env = "FANTASY_DB_PATH", default_value = "fantasy_hockey.db", global = true)]
    pub database_path: String,

    /// Also analyze weeks whose matchups are still in progress
    #[arg(long, env = "INCLUDE_INCOMPLETE", default_value = "false", global = true)]
    pub include_incomplete: bool,

    /// Matchups played per week (half the league size), for summary estimates
    #[arg(long, env = "MATCHUPS_PER_WEEK", default_value = "5", global = true)]
    pub matchups_per_week: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Import a season JSON file into the database
    Import {
        /// Path to the season file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List scoring categories with their win direction
    Categories,

    /// List stored teams
    Teams,

    /// Show which weeks are complete and feed the analysis
    Summary,

    /// Show winning thresholds for every category, or just one
    Thresholds {
        /// Category identifier, e.g. goals, save_pct, gaa
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Assess one team against league thresholds
    Analyze {
        /// Team id (defaults to your own team)
        #[arg(short, long, env = "MY_TEAM_ID")]
        team_id: Option<i64>,
    },

    /// Serve the analysis as a JSON API
    Serve {
        /// Listen address
        #[arg(long, env = "DASHBOARD_ADDR", default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.matchups_per_week == 0 {
            anyhow::bail!("matchups_per_week must be at least 1");
        }
        if self.database_path.trim().is_empty() {
            anyhow::bail!("database_path must not be empty");
        }
        match &self.command {
            Command::Analyze { team_id: None } => {
                anyhow::bail!("no team given. Pass --team-id or set MY_TEAM_ID.");
            }
            Command::Analyze { team_id: Some(id) } if *id <= 0 => {
                anyhow::bail!("team id must be positive (got {})", id);
            }
            Command::Thresholds { category: Some(c) } => {
                c.parse::<crate::analytics::Category>()?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn analyzer_settings(&self) -> AnalyzerSettings {
        AnalyzerSettings {
            include_incomplete: self.include_incomplete,
            matchups_per_week: self.matchups_per_week,
        }
    }
}
