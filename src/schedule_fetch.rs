use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::http_client::fetch_json;
use crate::json_fields::{is_empty_payload, lenient, text_or_none, u32_or_none, u64_or_none};

/// The game state that marks a completed game. Matched exactly, case included.
pub const FINAL_GAME_STATE: &str = "FINAL";

/// One completed game. Fields the API left out or mangled stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub game_id: u64,
    pub date: Option<NaiveDate>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_name: Option<String>,
    pub away_name: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

impl GameRecord {
    pub fn new(
        game_id: u64,
        date: NaiveDate,
        home_team: &str,
        away_team: &str,
        home_score: u32,
        away_score: u32,
    ) -> Self {
        Self {
            game_id,
            date: Some(date),
            home_team: Some(home_team.to_string()),
            away_team: Some(away_team.to_string()),
            home_name: None,
            away_name: None,
            home_score: Some(home_score),
            away_score: Some(away_score),
        }
    }

    pub fn is_home(&self, team: &str) -> bool {
        self.home_team.as_deref() == Some(team)
    }

    /// True only when both scores are known and the tracked side scored more.
    /// Any game where `team` is not the home side is scored from the away side.
    pub fn tracked_team_won(&self, team: &str) -> bool {
        let (Some(home), Some(away)) = (self.home_score, self.away_score) else {
            return false;
        };
        if self.is_home(team) {
            home > away
        } else {
            away > home
        }
    }

    pub fn opponent(&self, team: &str) -> Option<&str> {
        if self.is_home(team) {
            self.away_team.as_deref()
        } else {
            self.home_team.as_deref()
        }
    }
}

pub fn schedule_url(api_base: &str, team: &str, season: &str) -> String {
    format!("{api_base}/club-schedule-season/{team}/{season}")
}

pub fn fetch_schedule(
    client: &Client,
    api_base: &str,
    team: &str,
    season: &str,
    attempts: u32,
    extra_final_states: &[String],
) -> Result<Vec<GameRecord>> {
    let url = schedule_url(api_base, team, season);
    let body = fetch_json(client, &url, attempts).context("schedule request failed")?;
    parse_schedule_json_with(&body, extra_final_states)
}

/// Parses a season schedule payload, keeping `FINAL` games only.
/// Individual malformed games are skipped; invalid JSON is an error.
pub fn parse_schedule_json(raw: &str) -> Result<Vec<GameRecord>> {
    parse_schedule_json_with(raw, &[])
}

/// Same as `parse_schedule_json`, but games whose state exactly matches one of
/// `extra_final_states` are kept as well.
pub fn parse_schedule_json_with(
    raw: &str,
    extra_final_states: &[String],
) -> Result<Vec<GameRecord>> {
    if is_empty_payload(raw) {
        return Ok(Vec::new());
    }
    let parsed: ScheduleResponse =
        serde_json::from_str(raw.trim()).context("invalid schedule json")?;

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in parsed.games {
        let game = match serde_json::from_value::<ScheduleGame>(value) {
            Ok(game) => game,
            Err(err) => {
                debug!("skipping unreadable schedule entry: {err}");
                continue;
            }
        };
        if !is_completed(game.game_state.as_deref(), extra_final_states) {
            continue;
        }
        let Some(game_id) = game.id else {
            debug!("skipping completed game without id");
            continue;
        };
        if !seen.insert(game_id) {
            continue;
        }
        out.push(build_record(game_id, game));
    }
    Ok(out)
}

fn is_completed(state: Option<&str>, extra_final_states: &[String]) -> bool {
    state.is_some_and(|s| s == FINAL_GAME_STATE || extra_final_states.iter().any(|e| e == s))
}

fn build_record(game_id: u64, game: ScheduleGame) -> GameRecord {
    let date = game
        .game_date
        .as_deref()
        .and_then(parse_game_date)
        .or_else(|| game.start_time_utc.as_deref().and_then(parse_game_date));
    let home = game.home_team.unwrap_or_default();
    let away = game.away_team.unwrap_or_default();
    GameRecord {
        game_id,
        date,
        home_team: home.abbrev,
        away_team: away.abbrev,
        home_name: home.common_name,
        away_name: away.common_name,
        home_score: home.score,
        away_score: away.score,
    }
}

/// Reads the calendar date from `2024-10-10` or a longer ISO timestamp.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    games: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ScheduleGame {
    #[serde(default, deserialize_with = "u64_or_none")]
    id: Option<u64>,
    #[serde(rename = "gameDate", default, deserialize_with = "lenient")]
    game_date: Option<String>,
    #[serde(rename = "startTimeUTC", default, deserialize_with = "lenient")]
    start_time_utc: Option<String>,
    #[serde(rename = "gameState", default, deserialize_with = "lenient")]
    game_state: Option<String>,
    #[serde(rename = "homeTeam", default, deserialize_with = "lenient")]
    home_team: Option<ScheduleTeam>,
    #[serde(rename = "awayTeam", default, deserialize_with = "lenient")]
    away_team: Option<ScheduleTeam>,
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleTeam {
    #[serde(default, deserialize_with = "text_or_none")]
    abbrev: Option<String>,
    #[serde(rename = "commonName", default, deserialize_with = "text_or_none")]
    common_name: Option<String>,
    #[serde(default, deserialize_with = "u32_or_none")]
    score: Option<u32>,
}
