use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;

use crate::consistency::{ConsistencyRecord, GameResult};
use crate::schedule_fetch::GameRecord;

pub const ROLLING_WINDOW: usize = 5;

/// One game joined with its consistency score and derived features.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRow {
    pub game_id: u64,
    pub date: Option<NaiveDate>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub consistency: f64,
    pub result: GameResult,
    pub predecessor_missing: bool,
    pub is_home: u8,
    pub is_win: u8,
    /// `None` until `ROLLING_WINDOW` rows of history exist.
    pub rolling_consistency: Option<f64>,
}

/// Inner join on game id, sorted by (date, id). Features are not filled yet.
pub fn merge(games: &[GameRecord], consistency: &[ConsistencyRecord]) -> Vec<AnalysisRow> {
    let by_id: HashMap<u64, &ConsistencyRecord> =
        consistency.iter().map(|c| (c.game_id, c)).collect();

    let mut rows: Vec<AnalysisRow> = games
        .iter()
        .filter_map(|game| {
            let c = by_id.get(&game.game_id)?;
            Some(AnalysisRow {
                game_id: game.game_id,
                date: game.date,
                home_team: game.home_team.clone(),
                away_team: game.away_team.clone(),
                home_score: game.home_score,
                away_score: game.away_score,
                consistency: c.consistency,
                result: c.result,
                predecessor_missing: c.predecessor_missing,
                is_home: 0,
                is_win: 0,
                rolling_consistency: None,
            })
        })
        .collect();
    rows.sort_by_key(|r| (r.date, r.game_id));
    rows
}

/// Fills `is_home`, `is_win` and the trailing rolling mean. Rows must already
/// be in date order, as `merge` leaves them.
pub fn add_features(rows: &mut [AnalysisRow], team: &str) {
    for row in rows.iter_mut() {
        row.is_home = u8::from(row.home_team.as_deref() == Some(team));
        let won = match (row.home_score, row.away_score) {
            (Some(home), Some(away)) if row.is_home == 1 => home > away,
            (Some(home), Some(away)) => away > home,
            _ => false,
        };
        row.is_win = u8::from(won);
    }

    let values: Vec<f64> = rows.iter().map(|r| r.consistency).collect();
    for (row, mean) in rows.iter_mut().zip(rolling_mean(&values, ROLLING_WINDOW)) {
        row.rolling_consistency = mean;
    }
}

/// Trailing mean over `window` values ending at each index, `None` while the
/// window is not yet full.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    values
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            if idx + 1 < window {
                return None;
            }
            let slice = &values[idx + 1 - window..=idx];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

pub fn process(
    games: &[GameRecord],
    consistency: &[ConsistencyRecord],
    team: &str,
) -> Vec<AnalysisRow> {
    let mut rows = merge(games, consistency);
    add_features(&mut rows, team);
    info!(
        rows = rows.len(),
        dropped = games.len().saturating_sub(rows.len()),
        "analysis rows ready"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_window_needs_full_history() {
        let out = rolling_mean(&[0.8, 0.7, 0.9, 0.85, 0.6, 1.0], 5);
        assert!(out[..4].iter().all(Option::is_none));
        assert!((out[4].unwrap() - 0.77).abs() < 1e-9);
        assert!((out[5].unwrap() - 0.81).abs() < 1e-9);
    }

    #[test]
    fn short_series_has_no_rolling_values() {
        assert_eq!(rolling_mean(&[1.0, 1.0], 5), vec![None, None]);
        assert!(rolling_mean(&[], 5).is_empty());
    }
}
