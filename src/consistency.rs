use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::roster_fetch::Roster;
use crate::schedule_fetch::GameRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::Win => "Win",
            GameResult::Loss => "Loss",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyRecord {
    pub game_id: u64,
    pub date: Option<NaiveDate>,
    /// Share of the previous game's roster that dressed again, in [0, 1].
    pub consistency: f64,
    pub result: GameResult,
    pub roster_size: usize,
    /// The previous game had no roster on record, so `consistency` fell back
    /// to 1.0 rather than measuring anything.
    pub predecessor_missing: bool,
}

/// Scores each game against the one before it in date order.
///
/// Games are sorted here (date, then id); input order does not matter. A
/// game with no entry in `rosters` counts as an empty roster. When the
/// previous roster is empty, including the first game of the season, the
/// consistency is 1.0.
pub fn compute_consistency(
    games: &[GameRecord],
    rosters: &HashMap<u64, Roster>,
    team: &str,
) -> Vec<ConsistencyRecord> {
    let mut ordered: Vec<&GameRecord> = games.iter().collect();
    ordered.sort_by_key(|g| (g.date, g.game_id));

    let mut out = Vec::with_capacity(ordered.len());
    let mut previous: HashSet<u64> = HashSet::new();
    let mut previous_missing = false;
    for game in ordered {
        let roster = rosters.get(&game.game_id);
        let current = roster.map(Roster::player_ids).unwrap_or_default();

        let consistency = if previous.is_empty() {
            1.0
        } else {
            current.intersection(&previous).count() as f64 / previous.len() as f64
        };
        let result = if game.tracked_team_won(team) {
            GameResult::Win
        } else {
            GameResult::Loss
        };

        out.push(ConsistencyRecord {
            game_id: game.game_id,
            date: game.date,
            consistency,
            result,
            roster_size: current.len(),
            predecessor_missing: previous_missing,
        });

        previous_missing = roster.is_none();
        previous = current;
    }
    out
}
