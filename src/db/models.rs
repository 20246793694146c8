use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analytics::Category;

/// A league team as last seen in an imported week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: i64,
    pub name: String,
    pub manager_name: Option<String>,
    pub first_seen_week: Option<u32>,
    pub last_seen_week: Option<u32>,
}

/// One category's result for one matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOutcome {
    pub week: u32,
    pub team1_id: i64,
    pub team2_id: i64,
    pub team1_value: f64,
    pub team2_value: f64,
    /// `None` for a tied category
    pub winner_team_id: Option<i64>,
}

impl CategoryOutcome {
    /// `(winning_value, losing_value)`, or `None` for a tie.
    pub fn decided_values(&self) -> Option<(f64, f64)> {
        let winner = self.winner_team_id?;
        if winner == self.team1_id {
            Some((self.team1_value, self.team2_value))
        } else {
            Some((self.team2_value, self.team1_value))
        }
    }
}

/// A team's value in one category for one week, seen from that team's side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamWeekValue {
    pub week: u32,
    pub team_value: f64,
    pub opponent_value: f64,
    /// `Some(true)` win, `Some(false)` loss, `None` tie
    pub won: Option<bool>,
}

/// Stored week and whether all of its matchups have finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekStatus {
    pub week: u32,
    pub is_complete: bool,
    pub fetched_at: Option<DateTime<Utc>>,
}

// ── Season file ──────────────────────────────────────────────────────────────

/// A whole season of matchups as supplied by the import file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonData {
    pub league_id: String,
    pub season: String,
    #[serde(default)]
    pub matchups: Vec<Matchup>,
}

/// One head-to-head matchup in one week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matchup {
    pub week: u32,
    #[serde(default)]
    pub is_complete: bool,
    pub team1: TeamLine,
    pub team2: TeamLine,
    /// Category → winning team name, or "Tie". Missing categories are ties.
    #[serde(default)]
    pub category_winners: HashMap<Category, String>,
}

/// One side of a matchup with its category totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamLine {
    pub team_id: i64,
    pub team_name: String,
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub stats: HashMap<Category, f64>,
}

impl TeamLine {
    /// Category total, zero when the feed omitted it
    pub fn value(&self, category: Category) -> f64 {
        self.stats.get(&category).copied().unwrap_or(0.0)
    }
}

/// Which side of a matchup took a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryWinner {
    Team1,
    Team2,
    Tie,
}

pub const TIE_MARKER: &str = "Tie";

impl Matchup {
    /// Resolve a category winner by team name.
    pub fn winner(&self, category: Category) -> anyhow::Result<CategoryWinner> {
        match self.category_winners.get(&category).map(String::as_str) {
            None | Some(TIE_MARKER) => Ok(CategoryWinner::Tie),
            Some(name) if name == self.team1.team_name => Ok(CategoryWinner::Team1),
            Some(name) if name == self.team2.team_name => Ok(CategoryWinner::Team2),
            Some(name) => anyhow::bail!(
                "week {}: {} winner '{}' is neither '{}' nor '{}'",
                self.week,
                category,
                name,
                self.team1.team_name,
                self.team2.team_name
            ),
        }
    }
}
