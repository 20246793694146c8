use anyhow::Result;

use super::Category;
use crate::db::models::{CategoryOutcome, Team, TeamWeekValue, WeekStatus};

/// Read-only queries the analytics engine needs from outcome storage.
///
/// Implementations must hand back a consistent snapshot per call; the engine
/// holds no state of its own between calls.
pub trait OutcomeStore: Send + Sync {
    /// Every recorded outcome for a category, optionally restricted to complete weeks.
    fn outcomes_for_category(
        &self,
        category: Category,
        complete_only: bool,
    ) -> Result<Vec<CategoryOutcome>>;

    /// A team's weekly values in a category, ascending by week.
    fn weekly_values_for_team(
        &self,
        team_id: i64,
        category: Category,
        complete_only: bool,
    ) -> Result<Vec<TeamWeekValue>>;

    /// All stored weeks with their completeness flag, ascending by week.
    fn weeks_with_completeness(&self) -> Result<Vec<WeekStatus>>;

    fn lookup_team(&self, team_id: i64) -> Result<Option<Team>>;

    fn list_teams(&self) -> Result<Vec<Team>>;
}
