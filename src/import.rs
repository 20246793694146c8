use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::analytics::Category;
use crate::db::models::SeasonData;
use crate::db::{Database, SaveStats};

/// Parse a season file body.
pub fn parse_season_json(raw: &str) -> Result<SeasonData> {
    let season: SeasonData = serde_json::from_str(raw).context("invalid season file")?;
    validate_season(&season)?;
    Ok(season)
}

/// Reject matchups the store could not represent faithfully.
pub fn validate_season(season: &SeasonData) -> Result<()> {
    let mut seen: HashSet<(u32, i64)> = HashSet::new();
    for m in &season.matchups {
        if m.week == 0 {
            bail!("matchup {} vs {} has week 0", m.team1.team_name, m.team2.team_name);
        }
        if m.team1.team_id == m.team2.team_id {
            bail!("week {}: team {} is matched against itself", m.week, m.team1.team_id);
        }
        for side in [&m.team1, &m.team2] {
            if !seen.insert((m.week, side.team_id)) {
                bail!("week {}: team {} appears in more than one matchup", m.week, side.team_id);
            }
            if side.stats.values().any(|v| !v.is_finite()) {
                bail!("week {}: team {} has a non-finite stat", m.week, side.team_id);
            }
        }
        for category in Category::ALL {
            m.winner(category)?;
        }
    }
    Ok(())
}

/// Load a season file from disk and store it, replacing any weeks it contains.
pub fn import_season_file(db: &Database, path: &Path) -> Result<SaveStats> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading season file {}", path.display()))?;
    let season = parse_season_json(&raw)?;
    if season.matchups.is_empty() {
        warn!("Season file {} contains no matchups", path.display());
    }

    let stats = db.save_season(&season)?;
    info!(
        "Imported league {} season {}: {} weeks, {} matchups, {} category outcomes",
        season.league_id, season.season, stats.weeks, stats.matchups, stats.outcomes
    );
    Ok(stats)
}
