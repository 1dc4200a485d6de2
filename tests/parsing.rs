use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use roster_consistency::consistency::compute_consistency;
use roster_consistency::error::RosterError;
use roster_consistency::roster_fetch::{Roster, parse_boxscore_json};
use roster_consistency::schedule_fetch::{
    GameRecord, parse_schedule_json, parse_schedule_json_with,
};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
}

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn schedule_keeps_final_games_once() {
    let raw = read_fixture("schedule.json");
    let games = parse_schedule_json(&raw).expect("fixture should parse");
    let ids: Vec<u64> = games.iter().map(|g| g.game_id).collect();
    assert_eq!(ids, vec![2024020010, 2024020045]);

    let first = &games[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 10, 10));
    assert_eq!(first.home_team.as_deref(), Some("MIN"));
    assert_eq!(first.away_team.as_deref(), Some("CHI"));
    assert_eq!(first.home_name.as_deref(), Some("Wild"));
    assert_eq!(first.home_score, Some(3));
    assert_eq!(first.away_score, Some(1));
}

#[test]
fn schedule_marks_bad_fields_missing() {
    let raw = read_fixture("schedule.json");
    let games = parse_schedule_json(&raw).expect("fixture should parse");
    let unscored = &games[1];
    assert_eq!(unscored.game_id, 2024020045);
    assert_eq!(unscored.away_score, Some(5));
    assert_eq!(unscored.home_score, None);
    assert_eq!(unscored.home_name, None);
    assert!(!unscored.tracked_team_won("MIN"));
}

#[test]
fn schedule_accepts_configured_extra_states() {
    let raw = read_fixture("schedule.json");
    let extra = vec!["OFF".to_string()];
    let games = parse_schedule_json_with(&raw, &extra).expect("fixture should parse");
    let ids: Vec<u64> = games.iter().map(|g| g.game_id).collect();
    assert_eq!(ids, vec![2024020010, 2024020032, 2024020045]);
    assert_eq!(games[1].away_team.as_deref(), Some("MIN"));
    assert!(games[1].tracked_team_won("MIN"));
}

#[test]
fn schedule_null_is_empty() {
    assert!(parse_schedule_json("null").expect("null should parse").is_empty());
    assert!(parse_schedule_json("  ").expect("blank should parse").is_empty());
    assert!(parse_schedule_json("{}").expect("no games key").is_empty());
}

#[test]
fn schedule_invalid_json_is_error() {
    assert!(parse_schedule_json("{\"games\": [").is_err());
}

#[test]
fn boxscore_resolves_home_side() {
    let raw = read_fixture("boxscore.json");
    let roster = parse_boxscore_json(&raw, 2024020010, "MIN").expect("MIN is home");
    let ids: Vec<u64> = roster.entries.iter().map(|e| e.player_id).collect();
    assert_eq!(ids, vec![8478864, 8476448, 8480800, 8477968]);

    let goalie = &roster.entries[3];
    assert_eq!(goalie.jersey_number, Some(34));
    assert_eq!(goalie.position.as_deref(), Some("G"));
    assert_eq!(goalie.name.as_deref(), Some("F. Gustavsson"));
    assert_eq!(roster.entries[2].name.as_deref(), Some("Q. Hughes"));
}

#[test]
fn boxscore_resolves_away_side() {
    let raw = read_fixture("boxscore.json");
    let roster = parse_boxscore_json(&raw, 2024020010, "CHI").expect("CHI is away");
    assert_eq!(roster.len(), 2);
    assert!(roster.player_ids().contains(&8484144));
}

#[test]
fn boxscore_without_team_is_team_not_found() {
    let raw = read_fixture("boxscore.json");
    let err = parse_boxscore_json(&raw, 2024020010, "DAL").unwrap_err();
    match err {
        RosterError::TeamNotFound {
            game_id,
            team,
            home,
            away,
        } => {
            assert_eq!(game_id, 2024020010);
            assert_eq!(team, "DAL");
            assert_eq!(home.as_deref(), Some("MIN"));
            assert_eq!(away.as_deref(), Some("CHI"));
        }
        other => panic!("expected TeamNotFound, got {other:?}"),
    }
}

#[test]
fn boxscore_without_player_stats_is_fetch_error() {
    let raw = r#"{"homeTeam":{"abbrev":"MIN"},"awayTeam":{"abbrev":"CHI"}}"#;
    let err = parse_boxscore_json(raw, 1, "MIN").unwrap_err();
    match err {
        RosterError::Fetch { game_id, message } => {
            assert_eq!(game_id, 1);
            assert!(message.contains("no player stats"));
        }
        other => panic!("expected Fetch, got {other:?}"),
    }

    let raw = r#"{"homeTeam":{"abbrev":"MIN"},"awayTeam":{"abbrev":"CHI"},
        "playerByGameStats":{"homeTeam":{"forwards":[{"playerId":1}]}}}"#;
    assert!(parse_boxscore_json(raw, 2, "MIN").is_ok());
    assert!(matches!(
        parse_boxscore_json(raw, 2, "CHI"),
        Err(RosterError::Fetch { game_id: 2, .. })
    ));
}

#[test]
fn missing_player_stats_flags_the_next_game() {
    let bare = r#"{"homeTeam":{"abbrev":"MIN"},"awayTeam":{"abbrev":"CHI"}}"#;
    let games = vec![
        GameRecord::new(1, date(10), "MIN", "CHI", 3, 1),
        GameRecord::new(2, date(12), "MIN", "CHI", 2, 1),
        GameRecord::new(3, date(14), "MIN", "CHI", 4, 2),
    ];
    let mut rosters = HashMap::new();
    rosters.insert(1, Roster::from_ids([1, 2, 3]));
    if let Ok(roster) = parse_boxscore_json(bare, 2, "MIN") {
        rosters.insert(2, roster);
    }
    rosters.insert(3, Roster::from_ids([1, 2, 3]));

    let records = compute_consistency(&games, &rosters, "MIN");
    assert_eq!(records[1].consistency, 0.0);
    assert_eq!(records[2].consistency, 1.0);
    assert!(records[2].predecessor_missing);
}
