//! One team's standing in one category relative to league thresholds.
//!
//! The assessor produces four judgments, all oriented so that the category's
//! direction is respected:
//!
//! - **gap**: team average minus the median winning value (flipped for
//!   lower-wins), so a positive gap is always favorable
//! - **tier**: first matching band, best to worst, of
//!   dominant / strong / competitive / weak / critical
//! - **trend**: mean of the last three weeks against the first three, with a
//!   ±10% dead zone
//! - **win rate**: wins over decided matchups, absent when there were none

use serde::{Deserialize, Serialize};

use super::category::{Category, Direction};
use super::thresholds::CategoryThresholds;
use crate::db::models::TeamWeekValue;

/// Weeks needed before a trend is reported.
const MIN_TREND_WEEKS: usize = 4;
/// Size of the early and recent windows compared for trend.
const TREND_WINDOW: usize = 3;
/// Relative change beyond which a trend is not `stable`.
const TREND_DEAD_ZONE: f64 = 0.10;

/// Qualitative bucket, declared best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Dominant,
    Strong,
    Competitive,
    Weak,
    Critical,
    NoData,
}

impl Tier {
    pub fn is_strength(self) -> bool {
        matches!(self, Tier::Dominant | Tier::Strong)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

/// Derived judgment for one team in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAssessment {
    pub category: Category,
    pub direction: Direction,

    pub team_average: f64,
    pub weeks_played: usize,
    pub weekly_values: Vec<f64>,

    pub threshold_median: f64,
    pub threshold_p75: f64,
    pub threshold_min_winning: f64,

    /// Positive is favorable in either direction
    pub gap: f64,
    /// `None` when no matchup in this category was decided
    pub win_rate: Option<f64>,
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,

    pub tier: Tier,
    pub trend: Trend,
}

impl CategoryAssessment {
    fn no_data(category: Category, thresholds: &CategoryThresholds, weekly_values: Vec<f64>) -> Self {
        CategoryAssessment {
            category,
            direction: category.direction(),
            team_average: 0.0,
            weeks_played: weekly_values.len(),
            weekly_values,
            threshold_median: thresholds.median_winning,
            threshold_p75: thresholds.p75_winning,
            threshold_min_winning: thresholds.min_winning,
            gap: 0.0,
            win_rate: None,
            wins: 0,
            losses: 0,
            ties: 0,
            tier: Tier::NoData,
            trend: Trend::InsufficientData,
        }
    }
}

/// Assess a team's weekly record in one category against that category's thresholds.
///
/// `values` must already be ordered by week.
pub fn assess_category(
    category: Category,
    thresholds: &CategoryThresholds,
    values: &[TeamWeekValue],
) -> CategoryAssessment {
    if values.is_empty() {
        return CategoryAssessment::no_data(category, thresholds, Vec::new());
    }

    let weekly_values: Vec<f64> = values.iter().map(|v| v.team_value).collect();

    // Zero-filled thresholds carry no decided outcome to compare against.
    if !thresholds.has_data() {
        return CategoryAssessment::no_data(category, thresholds, weekly_values);
    }

    // A team that never started a goalie has no goaltending to judge.
    if category.is_goaltending_quality() && weekly_values.iter().all(|&v| v == 0.0) {
        return CategoryAssessment::no_data(category, thresholds, weekly_values);
    }

    let direction = category.direction();
    let team_average = mean(&weekly_values);

    let wins = values.iter().filter(|v| v.won == Some(true)).count();
    let losses = values.iter().filter(|v| v.won == Some(false)).count();
    let ties = values.iter().filter(|v| v.won.is_none()).count();
    let decided = wins + losses;
    let win_rate = (decided > 0).then(|| wins as f64 / decided as f64);

    CategoryAssessment {
        category,
        direction,
        team_average,
        weeks_played: weekly_values.len(),
        threshold_median: thresholds.median_winning,
        threshold_p75: thresholds.p75_winning,
        threshold_min_winning: thresholds.min_winning,
        gap: gap(team_average, thresholds.median_winning, direction),
        win_rate,
        wins,
        losses,
        ties,
        tier: tier(team_average, thresholds, direction),
        trend: trend(&weekly_values, direction),
        weekly_values,
    }
}

/// Signed distance from the median winning value; positive is favorable.
pub fn gap(team_average: f64, threshold_median: f64, direction: Direction) -> f64 {
    direction.favorable(team_average - threshold_median)
}

/// Bucket a team average against the winning-value distribution.
pub fn tier(team_average: f64, thresholds: &CategoryThresholds, direction: Direction) -> Tier {
    let loosest = direction.loosest_winning(thresholds);
    let bands = [
        (thresholds.p75_winning, Tier::Dominant),
        (thresholds.median_winning, Tier::Strong),
        (loosest, Tier::Competitive),
        (direction.weak_band(loosest), Tier::Weak),
    ];

    bands
        .iter()
        .find(|(bound, _)| direction.at_least_as_good(team_average, *bound))
        .map(|(_, t)| *t)
        .unwrap_or(Tier::Critical)
}

/// Compare the first three weeks with the last three.
pub fn trend(weekly_values: &[f64], direction: Direction) -> Trend {
    if weekly_values.len() < MIN_TREND_WEEKS {
        return Trend::InsufficientData;
    }

    let early = mean(&weekly_values[..TREND_WINDOW]);
    let recent = mean(&weekly_values[weekly_values.len() - TREND_WINDOW..]);

    // From a zero base any movement reads as improvement, whatever its size or sign.
    if early == 0.0 {
        return if recent == 0.0 {
            Trend::Stable
        } else {
            Trend::Improving
        };
    }

    let change = direction.favorable((recent - early) / early.abs());
    if change > TREND_DEAD_ZONE {
        Trend::Improving
    } else if change < -TREND_DEAD_ZONE {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
