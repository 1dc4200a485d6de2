use chrono::NaiveDate;

use roster_consistency::consistency::{ConsistencyRecord, GameResult};
use roster_consistency::correlation::{SeasonSummary, consistency_win_correlation};
use roster_consistency::error::CorrelationError;
use roster_consistency::pipeline::{merge, process};
use roster_consistency::schedule_fetch::GameRecord;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
}

fn record(game_id: u64, d: u32, consistency: f64) -> ConsistencyRecord {
    ConsistencyRecord {
        game_id,
        date: Some(date(d)),
        consistency,
        result: GameResult::Loss,
        roster_size: 20,
        predecessor_missing: false,
    }
}

fn three_games() -> Vec<GameRecord> {
    vec![
        GameRecord::new(1, date(10), "MIN", "CHI", 3, 1),
        GameRecord::new(2, date(12), "MIN", "WPG", 2, 4),
        GameRecord::new(3, date(14), "CHI", "MIN", 1, 3),
    ]
}

#[test]
fn merge_is_an_inner_join() {
    let games = three_games();
    let consistency = vec![record(1, 10, 0.9), record(3, 14, 0.8), record(99, 20, 0.5)];
    let rows = merge(&games, &consistency);
    let ids: Vec<u64> = rows.iter().map(|r| r.game_id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(rows[1].consistency, 0.8);
    assert_eq!(rows[1].home_team.as_deref(), Some("CHI"));
}

#[test]
fn merge_restores_date_order() {
    let mut games = three_games();
    games.reverse();
    let consistency = vec![record(3, 14, 0.8), record(2, 12, 0.85), record(1, 10, 0.9)];
    let rows = merge(&games, &consistency);
    let ids: Vec<u64> = rows.iter().map(|r| r.game_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn home_and_win_flags() {
    let games = three_games();
    let consistency = vec![record(1, 10, 0.9), record(2, 12, 0.85), record(3, 14, 0.8)];
    let rows = process(&games, &consistency, "MIN");
    assert_eq!(rows.len(), 3);
    let is_home: Vec<u8> = rows.iter().map(|r| r.is_home).collect();
    let is_win: Vec<u8> = rows.iter().map(|r| r.is_win).collect();
    assert_eq!(is_home, vec![1, 1, 0]);
    assert_eq!(is_win, vec![1, 0, 1]);
    assert!(rows.iter().all(|r| r.rolling_consistency.is_none()));
}

#[test]
fn two_home_games_example() {
    let games = vec![
        GameRecord::new(1, date(1), "MIN", "CHI", 4, 3),
        GameRecord::new(2, date(2), "MIN", "STL", 2, 3),
    ];
    let consistency = vec![record(1, 1, 1.0), record(2, 2, 0.5)];
    let rows = process(&games, &consistency, "MIN");
    assert_eq!(rows.iter().map(|r| r.is_win).collect::<Vec<_>>(), vec![1, 0]);
    assert_eq!(rows.iter().map(|r| r.is_home).collect::<Vec<_>>(), vec![1, 1]);
}

fn five_game_rows() -> Vec<roster_consistency::pipeline::AnalysisRow> {
    let games = vec![
        GameRecord::new(1, date(1), "MIN", "CHI", 4, 3),
        GameRecord::new(2, date(2), "MIN", "STL", 2, 3),
        GameRecord::new(3, date(3), "MIN", "DAL", 3, 2),
        GameRecord::new(4, date(4), "MIN", "WPG", 5, 2),
        GameRecord::new(5, date(5), "MIN", "NSH", 1, 3),
    ];
    let consistency = vec![
        record(1, 1, 0.8),
        record(2, 2, 0.7),
        record(3, 3, 0.9),
        record(4, 4, 0.85),
        record(5, 5, 0.6),
    ];
    process(&games, &consistency, "MIN")
}

#[test]
fn rolling_consistency_on_fifth_game() {
    let rows = five_game_rows();
    assert!(rows[..4].iter().all(|r| r.rolling_consistency.is_none()));
    let rolling = rows[4].rolling_consistency.expect("fifth row has history");
    assert!((rolling - 0.77).abs() < 1e-9);
}

#[test]
fn correlation_is_bounded_when_defined() {
    let rows = five_game_rows();
    let r = consistency_win_correlation(&rows).expect("both series vary");
    assert!((-1.0..=1.0).contains(&r));

    let summary = SeasonSummary::from_rows(&rows);
    assert_eq!(summary.games, 5);
    assert_eq!(summary.wins, 3);
    assert_eq!(summary.home_games, 5);
    assert_eq!(summary.win_rate(), Some(0.6));
    assert!((summary.mean_consistency.unwrap() - 0.77).abs() < 1e-9);
}

#[test]
fn correlation_undefined_when_every_game_is_won() {
    let games = vec![
        GameRecord::new(1, date(1), "MIN", "CHI", 4, 3),
        GameRecord::new(2, date(2), "MIN", "STL", 5, 3),
    ];
    let consistency = vec![record(1, 1, 1.0), record(2, 2, 0.5)];
    let rows = process(&games, &consistency, "MIN");
    assert_eq!(
        consistency_win_correlation(&rows),
        Err(CorrelationError::ConstantSeries { column: "isWin" })
    );
    assert_eq!(
        consistency_win_correlation(&[]),
        Err(CorrelationError::TooFewRows { rows: 0 })
    );
}
