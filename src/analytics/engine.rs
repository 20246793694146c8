use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::assessment::{assess_category, CategoryAssessment};
use super::category::Category;
use super::error::{AnalysisError, Result};
use super::store::OutcomeStore;
use super::team::TeamAnalysisResult;
use super::thresholds::{compute_thresholds, summarize_weeks, AnalysisSummary, CategoryThresholds};

/// Knobs that change which outcomes feed the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerSettings {
    /// Also use weeks whose matchups are still in progress
    pub include_incomplete: bool,
    /// Used only for the summary's matchup estimate
    pub matchups_per_week: u32,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        AnalyzerSettings {
            include_incomplete: false,
            matchups_per_week: 5,
        }
    }
}

/// Threshold and team analysis over an outcome store.
///
/// Every call recomputes from the store; nothing is cached between calls.
#[derive(Clone)]
pub struct Analyzer<S> {
    store: S,
    settings: AnalyzerSettings,
}

impl<S: OutcomeStore> Analyzer<S> {
    pub fn new(store: S, settings: AnalyzerSettings) -> Self {
        Analyzer { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn complete_only(&self) -> bool {
        !self.settings.include_incomplete
    }

    pub fn compute_thresholds(&self, category: Category) -> Result<CategoryThresholds> {
        let outcomes = self
            .store
            .outcomes_for_category(category, self.complete_only())?;
        let thresholds = compute_thresholds(category, &outcomes);
        debug!(
            "{}: {} outcomes, {} decided, {} weeks",
            category,
            outcomes.len(),
            thresholds.sample_size,
            thresholds.weeks_analyzed
        );
        Ok(thresholds)
    }

    /// Thresholds for every category. A category whose outcomes cannot be
    /// read is logged and left out rather than failing the rest.
    pub fn compute_all_thresholds(&self) -> BTreeMap<Category, CategoryThresholds> {
        Category::ALL
            .iter()
            .filter_map(|&category| match self.compute_thresholds(category) {
                Ok(t) => Some((category, t)),
                Err(e) => {
                    warn!("Skipping thresholds for {}: {}", category, e);
                    None
                }
            })
            .collect()
    }

    pub fn analysis_summary(&self) -> Result<AnalysisSummary> {
        let weeks = self.store.weeks_with_completeness()?;
        Ok(summarize_weeks(&weeks, self.settings.matchups_per_week))
    }

    pub fn assess_category(
        &self,
        team_id: i64,
        category: Category,
        thresholds: &CategoryThresholds,
    ) -> Result<CategoryAssessment> {
        let values = self
            .store
            .weekly_values_for_team(team_id, category, self.complete_only())?;
        Ok(assess_category(category, thresholds, &values))
    }

    /// Assess one team in every category against league thresholds.
    pub fn analyze_team(&self, team_id: i64) -> Result<TeamAnalysisResult> {
        let team = self
            .store
            .lookup_team(team_id)?
            .ok_or(AnalysisError::TeamNotFound(team_id))?;

        let thresholds = self.compute_all_thresholds();
        if !thresholds.values().any(CategoryThresholds::has_data) {
            return Err(AnalysisError::InsufficientData);
        }

        let mut assessments = BTreeMap::new();
        for category in Category::ALL {
            let threshold = thresholds
                .get(&category)
                .cloned()
                .unwrap_or_else(|| CategoryThresholds::empty(category));
            let assessment = self.assess_category(team_id, category, &threshold)?;
            assessments.insert(category, assessment);
        }

        let result = TeamAnalysisResult::from_assessments(&team, assessments);
        info!(
            "Analyzed team {} ({}): {} weeks, {} priorities, {} strengths",
            result.team_id,
            result.team_name,
            result.weeks_analyzed,
            result.improvement_priorities.len(),
            result.strengths.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::assessment::{Tier, Trend};
    use crate::db::models::{CategoryOutcome, Team, TeamWeekValue, WeekStatus};
    use anyhow::anyhow;
    use approx::assert_relative_eq;

    /// In-memory league: `(week, category, team1, team2, v1, v2, winner, complete)`.
    #[derive(Default)]
    struct FakeStore {
        teams: Vec<Team>,
        rows: Vec<(u32, Category, i64, i64, f64, f64, Option<i64>, bool)>,
        weeks: Vec<WeekStatus>,
        broken: Vec<Category>,
    }

    impl FakeStore {
        fn team(mut self, team_id: i64, name: &str) -> Self {
            self.teams.push(Team {
                team_id,
                name: name.into(),
                manager_name: None,
                first_seen_week: None,
                last_seen_week: None,
            });
            self
        }

        fn row(
            mut self,
            week: u32,
            category: Category,
            (t1, v1): (i64, f64),
            (t2, v2): (i64, f64),
            winner: Option<i64>,
            complete: bool,
        ) -> Self {
            self.rows.push((week, category, t1, t2, v1, v2, winner, complete));
            self
        }
    }

    impl OutcomeStore for FakeStore {
        fn outcomes_for_category(
            &self,
            category: Category,
            complete_only: bool,
        ) -> anyhow::Result<Vec<CategoryOutcome>> {
            if self.broken.contains(&category) {
                return Err(anyhow!("disk on fire"));
            }
            Ok(self
                .rows
                .iter()
                .filter(|r| r.1 == category && (!complete_only || r.7))
                .map(|r| CategoryOutcome {
                    week: r.0,
                    team1_id: r.2,
                    team2_id: r.3,
                    team1_value: r.4,
                    team2_value: r.5,
                    winner_team_id: r.6,
                })
                .collect())
        }

        fn weekly_values_for_team(
            &self,
            team_id: i64,
            category: Category,
            complete_only: bool,
        ) -> anyhow::Result<Vec<TeamWeekValue>> {
            let mut out: Vec<TeamWeekValue> = self
                .rows
                .iter()
                .filter(|r| r.1 == category && (!complete_only || r.7))
                .filter_map(|r| {
                    let (team_value, opponent_value) = if r.2 == team_id {
                        (r.4, r.5)
                    } else if r.3 == team_id {
                        (r.5, r.4)
                    } else {
                        return None;
                    };
                    Some(TeamWeekValue {
                        week: r.0,
                        team_value,
                        opponent_value,
                        won: r.6.map(|w| w == team_id),
                    })
                })
                .collect();
            out.sort_by_key(|v| v.week);
            Ok(out)
        }

        fn weeks_with_completeness(&self) -> anyhow::Result<Vec<WeekStatus>> {
            Ok(self.weeks.clone())
        }

        fn lookup_team(&self, team_id: i64) -> anyhow::Result<Option<Team>> {
            Ok(self.teams.iter().find(|t| t.team_id == team_id).cloned())
        }

        fn list_teams(&self) -> anyhow::Result<Vec<Team>> {
            Ok(self.teams.clone())
        }
    }

    /// Two teams, four complete weeks of goals plus one in-progress week.
    fn league() -> FakeStore {
        let mut store = FakeStore::default().team(1, "Ice Holes").team(2, "Zamboni Drivers");
        let goals = [(20.0, 25.0), (22.0, 28.0), (24.0, 21.0), (30.0, 26.0)];
        for (i, (a, b)) in goals.iter().enumerate() {
            let winner = if a > b { 1 } else { 2 };
            store = store.row(i as u32 + 1, Category::Goals, (1, *a), (2, *b), Some(winner), true);
        }
        store.row(5, Category::Goals, (1, 99.0), (2, 0.0), Some(1), false)
    }

    fn analyzer(store: FakeStore) -> Analyzer<FakeStore> {
        Analyzer::new(store, AnalyzerSettings::default())
    }

    #[test]
    fn test_compute_thresholds_complete_weeks_only() {
        let a = analyzer(league());
        let t = a.compute_thresholds(Category::Goals).unwrap();
        assert_eq!(t.sample_size, 4);
        assert_eq!(t.weeks_analyzed, 4);
        assert_relative_eq!(t.max_winning, 30.0);
    }

    #[test]
    fn test_include_incomplete_widens_sample() {
        let a = Analyzer::new(
            league(),
            AnalyzerSettings {
                include_incomplete: true,
                ..AnalyzerSettings::default()
            },
        );
        let t = a.compute_thresholds(Category::Goals).unwrap();
        assert_eq!(t.sample_size, 5);
        assert_relative_eq!(t.max_winning, 99.0);
    }

    #[test]
    fn test_compute_all_thresholds_covers_every_category() {
        let all = analyzer(league()).compute_all_thresholds();
        assert_eq!(all.len(), Category::ALL.len());
        assert!(all[&Category::Goals].has_data());
        assert!(!all[&Category::Gaa].has_data());
    }

    #[test]
    fn test_failing_category_does_not_block_others() {
        let mut store = league();
        store.broken.push(Category::Hits);
        let all = analyzer(store).compute_all_thresholds();
        assert!(!all.contains_key(&Category::Hits));
        assert!(all[&Category::Goals].has_data());
        assert_eq!(all.len(), Category::ALL.len() - 1);
    }

    #[test]
    fn test_analyze_unknown_team() {
        let err = analyzer(league()).analyze_team(42).unwrap_err();
        assert!(matches!(err, AnalysisError::TeamNotFound(42)));
    }

    #[test]
    fn test_analyze_without_decided_outcomes() {
        let store = FakeStore::default()
            .team(1, "Ice Holes")
            .team(2, "Zamboni Drivers")
            .row(1, Category::Goals, (1, 3.0), (2, 3.0), None, true);
        let err = analyzer(store).analyze_team(1).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData));
    }

    #[test]
    fn test_analyze_team() {
        let result = analyzer(league()).analyze_team(1).unwrap();
        assert_eq!(result.team_name, "Ice Holes");
        assert_eq!(result.weeks_analyzed, 4);
        assert_eq!(result.assessments.len(), Category::ALL.len());

        // winning goals: 25, 28, 24, 30 → median 26.5; team average 24
        let goals = &result.assessments[&Category::Goals];
        assert_relative_eq!(goals.team_average, 24.0);
        assert_relative_eq!(goals.gap, -2.5);
        assert_eq!(goals.tier, Tier::Competitive);
        assert_eq!(goals.trend, Trend::Improving);
        assert_eq!((goals.wins, goals.losses), (2, 2));
        assert_eq!(goals.win_rate, Some(0.5));

        assert_eq!(result.improvement_priorities.len(), 1);
        assert_eq!(result.improvement_priorities[0].category, Category::Goals);
        assert!(result.strengths.is_empty());

        assert_eq!(result.assessments[&Category::Hits].tier, Tier::NoData);
    }

    #[test]
    fn test_categories_without_thresholds_are_never_strengths() {
        let mut store = league();
        for week in 1..=4 {
            let hits = 10.0 + week as f64;
            store = store.row(week, Category::Hits, (1, hits), (2, hits), None, true);
            store = store.row(week, Category::Assists, (1, 3.0), (2, 9.0), Some(2), true);
        }
        store.broken.push(Category::Assists);

        let result = analyzer(store).analyze_team(2).unwrap();
        for category in [Category::Hits, Category::Assists] {
            let a = &result.assessments[&category];
            assert_eq!(a.tier, Tier::NoData);
            assert_eq!(a.trend, Trend::InsufficientData);
            assert_eq!(a.weeks_played, 4);
        }
        assert!(result.strengths.is_empty());

        // team 2 averages 25 goals against a 26.5 median: the only priority
        let priorities: Vec<Category> =
            result.improvement_priorities.iter().map(|p| p.category).collect();
        assert_eq!(priorities, vec![Category::Goals]);
        assert_eq!(result.assessments[&Category::Goals].tier, Tier::Competitive);
    }

    #[test]
    fn test_goalie_zero_weeks_excluded_from_priorities() {
        let mut store = league();
        for week in 1..=4 {
            let winner = Some(2);
            store = store.row(week, Category::SavePct, (1, 0.0), (2, 0.915), winner, true);
        }
        let result = analyzer(store).analyze_team(1).unwrap();
        let save_pct = &result.assessments[&Category::SavePct];
        assert_eq!(save_pct.tier, Tier::NoData);
        assert_eq!(save_pct.trend, Trend::InsufficientData);
        assert!(result
            .improvement_priorities
            .iter()
            .all(|p| p.category != Category::SavePct));
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let a = analyzer(league());
        assert_eq!(a.analyze_team(2).unwrap(), a.analyze_team(2).unwrap());
        assert_eq!(a.compute_all_thresholds(), a.compute_all_thresholds());
    }

    #[test]
    fn test_analysis_summary() {
        let mut store = league();
        store.weeks = (1..=5)
            .map(|week| WeekStatus {
                week,
                is_complete: week < 5,
                fetched_at: None,
            })
            .collect();
        let summary = Analyzer::new(
            store,
            AnalyzerSettings {
                matchups_per_week: 6,
                ..AnalyzerSettings::default()
            },
        )
        .analysis_summary()
        .unwrap();
        assert_eq!(summary.weeks_analyzed, 4);
        assert_eq!(summary.incomplete_week_numbers, vec![5]);
        assert_eq!(summary.total_matchups_estimate, 24);
    }
}
