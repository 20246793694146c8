//! Winning-threshold statistics per category.
//!
//! A category's thresholds describe the distribution of values that have won
//! (and lost) a matchup in that category:
//!
//!   - min / median / p75 / p90 / max of winning values
//!   - min / max of losing values
//!   - the overlap zone where both winning and losing values have occurred
//!
//! Ties are ignored for value statistics but still count toward
//! `weeks_analyzed`. Percentiles index an ascending sort of winning values at
//! `floor(q · n)`, falling back to the maximum if that index overflows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::category::{Category, Direction};
use crate::db::models::{CategoryOutcome, WeekStatus};

const P75: f64 = 0.75;
const P90: f64 = 0.90;

/// Derived snapshot of what tends to win one category.
///
/// `sample_size == 0` means there is no basis for comparison; every numeric
/// field is then zero and must not be read as a real threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryThresholds {
    pub category: Category,
    pub direction: Direction,
    /// Non-tie outcomes contributing to the statistics
    pub sample_size: usize,
    /// Distinct weeks among all outcomes considered, ties included
    pub weeks_analyzed: usize,
    pub min_winning: f64,
    pub max_winning: f64,
    pub median_winning: f64,
    pub p75_winning: f64,
    pub p90_winning: f64,
    pub max_losing: f64,
    pub min_losing: f64,
    pub overlap_exists: bool,
    pub overlap_low: f64,
    pub overlap_high: f64,
}

impl CategoryThresholds {
    /// Zero-filled thresholds for a category with no decided outcomes.
    pub fn empty(category: Category) -> Self {
        CategoryThresholds {
            category,
            direction: category.direction(),
            sample_size: 0,
            weeks_analyzed: 0,
            min_winning: 0.0,
            max_winning: 0.0,
            median_winning: 0.0,
            p75_winning: 0.0,
            p90_winning: 0.0,
            max_losing: 0.0,
            min_losing: 0.0,
            overlap_exists: false,
            overlap_low: 0.0,
            overlap_high: 0.0,
        }
    }

    pub fn has_data(&self) -> bool {
        self.sample_size > 0
    }
}

/// Compute thresholds for one category from its outcomes.
pub fn compute_thresholds(category: Category, outcomes: &[CategoryOutcome]) -> CategoryThresholds {
    let (mut winning, losing): (Vec<f64>, Vec<f64>) =
        outcomes.iter().filter_map(|o| o.decided_values()).unzip();

    if winning.is_empty() {
        return CategoryThresholds::empty(category);
    }

    let weeks_analyzed = outcomes
        .iter()
        .map(|o| o.week)
        .collect::<BTreeSet<_>>()
        .len();

    winning.sort_by(f64::total_cmp);
    let n = winning.len();
    let min_winning = winning[0];
    let max_winning = winning[n - 1];

    let min_losing = losing.iter().copied().fold(f64::INFINITY, f64::min);
    let max_losing = losing.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let direction = category.direction();
    let overlap = match direction {
        Direction::HigherWins if max_losing >= min_winning => Some((min_winning, max_losing)),
        Direction::LowerWins if min_losing <= max_winning => Some((min_losing, max_winning)),
        _ => None,
    };
    let (overlap_low, overlap_high) = overlap.unwrap_or((0.0, 0.0));

    CategoryThresholds {
        category,
        direction,
        sample_size: n,
        weeks_analyzed,
        min_winning,
        max_winning,
        median_winning: median_sorted(&winning),
        p75_winning: percentile_sorted(&winning, P75),
        p90_winning: percentile_sorted(&winning, P90),
        max_losing,
        min_losing,
        overlap_exists: overlap.is_some(),
        overlap_low,
        overlap_high,
    }
}

/// Median of an ascending, non-empty slice; even counts average the middle pair.
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    let mid = n / 2;
    if n % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Value at `floor(q · n)` of an ascending, non-empty slice, clamped to the last element.
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let idx = (sorted.len() as f64 * q).floor() as usize;
    sorted.get(idx).copied().unwrap_or(sorted[sorted.len() - 1])
}

// ── Week summary ─────────────────────────────────────────────────────────────

/// Which stored weeks feed the thresholds and which are still in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub weeks_analyzed: usize,
    pub weeks_excluded: usize,
    pub complete_week_numbers: Vec<u32>,
    pub incomplete_week_numbers: Vec<u32>,
    /// Complete weeks × matchups per week; not a stored count
    pub total_matchups_estimate: usize,
}

pub fn summarize_weeks(weeks: &[WeekStatus], matchups_per_week: u32) -> AnalysisSummary {
    let (complete, incomplete): (Vec<&WeekStatus>, Vec<&WeekStatus>) =
        weeks.iter().partition(|w| w.is_complete);

    AnalysisSummary {
        weeks_analyzed: complete.len(),
        weeks_excluded: incomplete.len(),
        complete_week_numbers: complete.iter().map(|w| w.week).collect(),
        incomplete_week_numbers: incomplete.iter().map(|w| w.week).collect(),
        total_matchups_estimate: complete.len() * matchups_per_week as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Decided outcome where team 1 won with `win` over `lose`.
    fn decided(week: u32, win: f64, lose: f64) -> CategoryOutcome {
        CategoryOutcome {
            week,
            team1_id: 1,
            team2_id: 2,
            team1_value: win,
            team2_value: lose,
            winner_team_id: Some(1),
        }
    }

    fn tie(week: u32, value: f64) -> CategoryOutcome {
        CategoryOutcome {
            week,
            team1_id: 3,
            team2_id: 4,
            team1_value: value,
            team2_value: value,
            winner_team_id: None,
        }
    }

    #[test]
    fn test_higher_wins_overlap() {
        let outcomes = vec![decided(1, 10.0, 8.0), decided(1, 12.0, 11.0), decided(2, 15.0, 9.0)];
        let t = compute_thresholds(Category::Goals, &outcomes);
        assert_eq!(t.direction, Direction::HigherWins);
        assert_eq!(t.sample_size, 3);
        assert_eq!(t.weeks_analyzed, 2);
        assert!(t.overlap_exists);
        assert_relative_eq!(t.overlap_low, 10.0);
        assert_relative_eq!(t.overlap_high, 11.0);
        assert_relative_eq!(t.median_winning, 12.0);
        assert_relative_eq!(t.min_losing, 8.0);
        assert_relative_eq!(t.max_losing, 11.0);
    }

    #[test]
    fn test_lower_wins_overlap() {
        let outcomes = vec![decided(1, 2.1, 2.0), decided(1, 2.3, 2.8)];
        let t = compute_thresholds(Category::Gaa, &outcomes);
        assert_eq!(t.direction, Direction::LowerWins);
        assert!(t.overlap_exists);
        assert_relative_eq!(t.overlap_low, 2.0);
        assert_relative_eq!(t.overlap_high, 2.3);
    }

    #[test]
    fn test_no_overlap_reports_zero_bounds() {
        let outcomes = vec![decided(1, 10.0, 5.0), decided(2, 12.0, 9.0)];
        let t = compute_thresholds(Category::Hits, &outcomes);
        assert!(!t.overlap_exists);
        assert_relative_eq!(t.overlap_low, 0.0);
        assert_relative_eq!(t.overlap_high, 0.0);
    }

    #[test]
    fn test_winner_on_team2_side() {
        let outcome = CategoryOutcome {
            week: 1,
            team1_id: 1,
            team2_id: 2,
            team1_value: 4.0,
            team2_value: 7.0,
            winner_team_id: Some(2),
        };
        let t = compute_thresholds(Category::Goals, &[outcome]);
        assert_relative_eq!(t.min_winning, 7.0);
        assert_relative_eq!(t.max_losing, 4.0);
    }

    #[test]
    fn test_ties_count_weeks_but_not_values() {
        let outcomes = vec![decided(1, 10.0, 8.0), tie(2, 50.0), tie(3, 50.0)];
        let t = compute_thresholds(Category::Shots, &outcomes);
        assert_eq!(t.sample_size, 1);
        assert_eq!(t.weeks_analyzed, 3);
        assert_relative_eq!(t.max_winning, 10.0);
    }

    #[test]
    fn test_zero_sample_category_is_zero_filled() {
        let t = compute_thresholds(Category::Gaa, &[tie(1, 2.5)]);
        assert_eq!(t, CategoryThresholds::empty(Category::Gaa));
        assert_eq!(t.direction, Direction::LowerWins);
        assert!(!t.has_data());
        assert_relative_eq!(t.median_winning, 0.0);
        assert_relative_eq!(t.p90_winning, 0.0);

        let t = compute_thresholds(Category::Goals, &[]);
        assert_eq!(t.sample_size, 0);
        assert_eq!(t.direction, Direction::HigherWins);
    }

    #[test]
    fn test_percentiles_floor_index() {
        // n = 10: p75 → idx 7, p90 → idx 9
        let outcomes: Vec<_> = (1..=10).map(|v| decided(1, v as f64, 0.0)).collect();
        let t = compute_thresholds(Category::Points, &outcomes);
        assert_relative_eq!(t.p75_winning, 8.0);
        assert_relative_eq!(t.p90_winning, 10.0);
        assert_relative_eq!(t.median_winning, 5.5);
    }

    #[test]
    fn test_percentiles_single_sample() {
        let t = compute_thresholds(Category::Points, &[decided(1, 7.0, 3.0)]);
        assert_relative_eq!(t.min_winning, 7.0);
        assert_relative_eq!(t.median_winning, 7.0);
        assert_relative_eq!(t.p75_winning, 7.0);
        assert_relative_eq!(t.p90_winning, 7.0);
    }

    #[test]
    fn test_percentile_clamps_overflowing_index() {
        assert_relative_eq!(percentile_sorted(&[1.0, 2.0], 1.0), 2.0);
    }

    #[test]
    fn test_ordering_invariants_hold() {
        let outcomes = vec![
            decided(1, 31.0, 40.0),
            decided(1, 18.0, 12.0),
            decided(2, 25.0, 24.0),
            decided(3, 44.0, 30.0),
        ];
        let t = compute_thresholds(Category::Hits, &outcomes);
        assert!(t.min_winning <= t.median_winning);
        assert!(t.median_winning <= t.max_winning);
        assert!(t.min_losing <= t.max_losing);
        assert!(t.overlap_low <= t.overlap_high);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let outcomes = vec![decided(1, 3.0, 1.0), decided(2, 5.0, 4.0), tie(3, 2.0)];
        assert_eq!(
            compute_thresholds(Category::Ppp, &outcomes),
            compute_thresholds(Category::Ppp, &outcomes)
        );
    }

    #[test]
    fn test_summarize_weeks() {
        let weeks = vec![
            WeekStatus { week: 1, is_complete: true, fetched_at: None },
            WeekStatus { week: 2, is_complete: true, fetched_at: None },
            WeekStatus { week: 3, is_complete: false, fetched_at: None },
        ];
        let s = summarize_weeks(&weeks, 5);
        assert_eq!(s.weeks_analyzed, 2);
        assert_eq!(s.weeks_excluded, 1);
        assert_eq!(s.complete_week_numbers, vec![1, 2]);
        assert_eq!(s.incomplete_week_numbers, vec![3]);
        assert_eq!(s.total_matchups_estimate, 10);
    }
}
