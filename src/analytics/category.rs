//! Scoring categories and their fixed win direction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::thresholds::CategoryThresholds;

/// One independently scored statistical dimension of a matchup.
///
/// Variant order is the display order used everywhere results are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Goals,
    Assists,
    Points,
    PlusMinus,
    Pim,
    Ppp,
    Hits,
    Shots,
    GoalieWins,
    SavePct,
    Gaa,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 11] = [
        Category::Goals,
        Category::Assists,
        Category::Points,
        Category::PlusMinus,
        Category::Pim,
        Category::Ppp,
        Category::Hits,
        Category::Shots,
        Category::GoalieWins,
        Category::SavePct,
        Category::Gaa,
    ];

    /// Identifier used in the store and in season files.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Goals => "goals",
            Category::Assists => "assists",
            Category::Points => "points",
            Category::PlusMinus => "plus_minus",
            Category::Pim => "pim",
            Category::Ppp => "ppp",
            Category::Hits => "hits",
            Category::Shots => "shots",
            Category::GoalieWins => "goalie_wins",
            Category::SavePct => "save_pct",
            Category::Gaa => "gaa",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Goals => "Goals",
            Category::Assists => "Assists",
            Category::Points => "Points",
            Category::PlusMinus => "Plus/Minus",
            Category::Pim => "PIM",
            Category::Ppp => "PPP",
            Category::Hits => "Hits",
            Category::Shots => "Shots",
            Category::GoalieWins => "Wins",
            Category::SavePct => "SV%",
            Category::Gaa => "GAA",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Category::Gaa => Direction::LowerWins,
            _ => Direction::HigherWins,
        }
    }

    /// Categories that only mean something when the team started a goalie.
    pub fn is_goaltending_quality(self) -> bool {
        matches!(self, Category::SavePct | Category::Gaa)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown category '{}'", s))
    }
}

/// Whether higher or lower numeric values win a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherWins,
    LowerWins,
}

/// Multipliers on the loosest winning value that bound the `weak` band.
const WEAK_FLOOR: f64 = 0.85;
const WEAK_CEILING: f64 = 1.15;

impl Direction {
    /// Orient a raw `value - reference` delta so that positive is favorable.
    pub fn favorable(self, delta: f64) -> f64 {
        match self {
            Direction::HigherWins => delta,
            Direction::LowerWins => -delta,
        }
    }

    /// `value` is at or on the winning side of `bound`.
    pub fn at_least_as_good(self, value: f64, bound: f64) -> bool {
        match self {
            Direction::HigherWins => value >= bound,
            Direction::LowerWins => value <= bound,
        }
    }

    /// The least impressive value that has still won a matchup.
    pub fn loosest_winning(self, thresholds: &CategoryThresholds) -> f64 {
        match self {
            Direction::HigherWins => thresholds.min_winning,
            Direction::LowerWins => thresholds.max_winning,
        }
    }

    /// Outer edge of the `weak` band around `bound`.
    pub fn weak_band(self, bound: f64) -> f64 {
        match self {
            Direction::HigherWins => bound * WEAK_FLOOR,
            Direction::LowerWins => bound * WEAK_CEILING,
        }
    }
}
