use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub mod models;
use models::*;

use crate::analytics::{Category, OutcomeStore};

/// Thread-safe SQLite connection pool (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Rows written by one season import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveStats {
    pub weeks: usize,
    pub matchups: usize,
    pub outcomes: usize,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    // ── Season import ─────────────────────────────────────────────────────────

    /// Persist a season. Weeks already stored are replaced wholesale.
    pub fn save_season(&self, season: &SeasonData) -> Result<SaveStats> {
        let mut by_week: BTreeMap<u32, Vec<&Matchup>> = BTreeMap::new();
        for m in &season.matchups {
            by_week.entry(m.week).or_default().push(m);
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut stats = SaveStats::default();

        for (week, matchups) in &by_week {
            let is_complete = matchups.iter().all(|m| m.is_complete);
            tx.execute(
                "INSERT INTO weekly_snapshots (week_number, is_complete, fetched_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(week_number) DO UPDATE SET
                    is_complete=excluded.is_complete,
                    fetched_at=excluded.fetched_at",
                params![week, is_complete, Utc::now()],
            )?;
            tx.execute("DELETE FROM category_outcomes WHERE week_number=?1", params![week])?;
            tx.execute("DELETE FROM matchup_results WHERE week_number=?1", params![week])?;

            for m in matchups {
                for side in [&m.team1, &m.team2] {
                    tx.execute(
                        "INSERT INTO teams (team_id, current_name, manager_name, first_seen_week, last_seen_week)
                         VALUES (?1,?2,?3,?4,?4)
                         ON CONFLICT(team_id) DO UPDATE SET
                            current_name=excluded.current_name,
                            manager_name=COALESCE(excluded.manager_name, teams.manager_name),
                            first_seen_week=MIN(teams.first_seen_week, excluded.first_seen_week),
                            last_seen_week=MAX(teams.last_seen_week, excluded.last_seen_week)",
                        params![side.team_id, side.team_name, side.manager_name, week],
                    )?;
                }

                let winners = Category::ALL
                    .iter()
                    .map(|&c| m.winner(c).map(|w| (c, w)))
                    .collect::<Result<Vec<_>>>()?;
                let count = |side: CategoryWinner| winners.iter().filter(|(_, w)| *w == side).count();

                tx.execute(
                    "INSERT INTO matchup_results (
                        week_number, team1_id, team2_id,
                        team1_category_wins, team2_category_wins, ties, is_complete
                     ) VALUES (?1,?2,?3,?4,?5,?6,?7)",
                    params![
                        week,
                        m.team1.team_id,
                        m.team2.team_id,
                        count(CategoryWinner::Team1),
                        count(CategoryWinner::Team2),
                        count(CategoryWinner::Tie),
                        m.is_complete,
                    ],
                )?;
                let matchup_id = tx.last_insert_rowid();

                for (category, winner) in &winners {
                    let winner_team_id = match winner {
                        CategoryWinner::Team1 => Some(m.team1.team_id),
                        CategoryWinner::Team2 => Some(m.team2.team_id),
                        CategoryWinner::Tie => None,
                    };
                    tx.execute(
                        "INSERT INTO category_outcomes (
                            matchup_id, week_number, category, team1_id, team2_id,
                            team1_value, team2_value, winner_team_id, is_complete
                         ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
                        params![
                            matchup_id,
                            week,
                            category.as_str(),
                            m.team1.team_id,
                            m.team2.team_id,
                            m.team1.value(*category),
                            m.team2.value(*category),
                            winner_team_id,
                            m.is_complete,
                        ],
                    )?;
                    stats.outcomes += 1;
                }
                stats.matchups += 1;
            }
            stats.weeks += 1;
            debug!("Stored week {} ({} matchups, complete={})", week, matchups.len(), is_complete);
        }

        tx.commit()?;
        Ok(stats)
    }
}

impl OutcomeStore for Database {
    fn outcomes_for_category(
        &self,
        category: Category,
        complete_only: bool,
    ) -> Result<Vec<CategoryOutcome>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT week_number, team1_id, team2_id, team1_value, team2_value, winner_team_id
             FROM category_outcomes
             WHERE category=?1 AND (?2=0 OR is_complete=1)
             ORDER BY week_number, id",
        )?;
        let outcomes = stmt
            .query_map(params![category.as_str(), complete_only], map_outcome)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(outcomes)
    }

    fn weekly_values_for_team(
        &self,
        team_id: i64,
        category: Category,
        complete_only: bool,
    ) -> Result<Vec<TeamWeekValue>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT week_number,
                    CASE WHEN team1_id=?1 THEN team1_value ELSE team2_value END,
                    CASE WHEN team1_id=?1 THEN team2_value ELSE team1_value END,
                    winner_team_id
             FROM category_outcomes
             WHERE category=?2 AND (team1_id=?1 OR team2_id=?1) AND (?3=0 OR is_complete=1)
             ORDER BY week_number, id",
        )?;
        let values = stmt
            .query_map(params![team_id, category.as_str(), complete_only], |row| {
                let winner: Option<i64> = row.get(3)?;
                Ok(TeamWeekValue {
                    week: row.get(0)?,
                    team_value: row.get(1)?,
                    opponent_value: row.get(2)?,
                    won: winner.map(|w| w == team_id),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }

    fn weeks_with_completeness(&self) -> Result<Vec<WeekStatus>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT week_number, is_complete, fetched_at FROM weekly_snapshots ORDER BY week_number",
        )?;
        let weeks = stmt
            .query_map([], |row| {
                Ok(WeekStatus {
                    week: row.get(0)?,
                    is_complete: row.get(1)?,
                    fetched_at: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(weeks)
    }

    fn lookup_team(&self, team_id: i64) -> Result<Option<Team>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT team_id, current_name, manager_name, first_seen_week, last_seen_week
             FROM teams WHERE team_id=?1",
        )?;
        let mut rows = stmt.query_map(params![team_id], map_team)?;
        Ok(rows.next().transpose()?)
    }

    fn list_teams(&self) -> Result<Vec<Team>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT team_id, current_name, manager_name, first_seen_week, last_seen_week
             FROM teams ORDER BY team_id",
        )?;
        let teams = stmt
            .query_map([], map_team)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_outcome(row: &rusqlite::Row) -> rusqlite::Result<CategoryOutcome> {
    Ok(CategoryOutcome {
        week: row.get(0)?,
        team1_id: row.get(1)?,
        team2_id: row.get(2)?,
        team1_value: row.get(3)?,
        team2_value: row.get(4)?,
        winner_team_id: row.get(5)?,
    })
}

fn map_team(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    Ok(Team {
        team_id: row.get(0)?,
        name: row.get(1)?,
        manager_name: row.get(2)?,
        first_seen_week: row.get(3)?,
        last_seen_week: row.get(4)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    team_id         INTEGER PRIMARY KEY,
    current_name    TEXT    NOT NULL,
    manager_name    TEXT,
    first_seen_week INTEGER,
    last_seen_week  INTEGER
);

CREATE TABLE IF NOT EXISTS weekly_snapshots (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    week_number INTEGER NOT NULL UNIQUE,
    is_complete INTEGER NOT NULL,
    fetched_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS matchup_results (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    week_number         INTEGER NOT NULL,
    team1_id            INTEGER NOT NULL,
    team2_id            INTEGER NOT NULL,
    team1_category_wins INTEGER NOT NULL,
    team2_category_wins INTEGER NOT NULL,
    ties                INTEGER NOT NULL,
    is_complete         INTEGER NOT NULL,
    FOREIGN KEY (team1_id) REFERENCES teams(team_id),
    FOREIGN KEY (team2_id) REFERENCES teams(team_id)
);

CREATE TABLE IF NOT EXISTS category_outcomes (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    matchup_id     INTEGER NOT NULL,
    week_number    INTEGER NOT NULL,
    category       TEXT    NOT NULL,
    team1_id       INTEGER NOT NULL,
    team2_id       INTEGER NOT NULL,
    team1_value    REAL    NOT NULL,
    team2_value    REAL    NOT NULL,
    winner_team_id INTEGER,
    is_complete    INTEGER NOT NULL,
    FOREIGN KEY (matchup_id) REFERENCES matchup_results(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_outcomes_category ON category_outcomes(category, is_complete);
CREATE INDEX IF NOT EXISTS idx_outcomes_team1 ON category_outcomes(team1_id, category, is_complete);
CREATE INDEX IF NOT EXISTS idx_outcomes_team2 ON category_outcomes(team2_id, category, is_complete);
"#;
