use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use rayon::prelude::*;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::RosterError;
use crate::http_client::fetch_json;
use crate::json_fields::{is_empty_payload, lenient, text_or_none, u32_or_none, u64_or_none};
use crate::schedule_fetch::GameRecord;
use crate::source::GameSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub player_id: u64,
    pub name: Option<String>,
    pub jersey_number: Option<u32>,
    pub position: Option<String>,
}

/// Players who appeared for one team in one game, unique by player id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn from_entries(entries: impl IntoIterator<Item = RosterEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|e| seen.insert(e.player_id))
            .collect();
        Self { entries }
    }

    /// Bare roster from player ids, for callers that only know who played.
    pub fn from_ids(ids: impl IntoIterator<Item = u64>) -> Self {
        Self::from_entries(ids.into_iter().map(|player_id| RosterEntry {
            player_id,
            name: None,
            jersey_number: None,
            position: None,
        }))
    }

    pub fn player_ids(&self) -> HashSet<u64> {
        self.entries.iter().map(|e| e.player_id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct RosterFetch {
    pub rosters: HashMap<u64, Roster>,
    pub errors: Vec<RosterError>,
}

pub fn boxscore_url(api_base: &str, game_id: u64) -> String {
    format!("{api_base}/gamecenter/{game_id}/boxscore")
}

pub fn fetch_boxscore_body(
    client: &Client,
    api_base: &str,
    game_id: u64,
    attempts: u32,
) -> Result<String> {
    let url = boxscore_url(api_base, game_id);
    fetch_json(client, &url, attempts).context("boxscore request failed")
}

/// Extracts `team`'s roster from a boxscore payload. The side is resolved by
/// comparing abbreviations; a team on neither side is `TeamNotFound`.
pub fn parse_boxscore_json(raw: &str, game_id: u64, team: &str) -> Result<Roster, RosterError> {
    if is_empty_payload(raw) {
        return Err(RosterError::Fetch {
            game_id,
            message: "empty boxscore response".to_string(),
        });
    }
    let parsed: BoxscoreResponse =
        serde_json::from_str(raw.trim()).map_err(|err| RosterError::Fetch {
            game_id,
            message: format!("invalid boxscore json: {err}"),
        })?;

    let home = parsed.home_team.and_then(|t| t.abbrev);
    let away = parsed.away_team.and_then(|t| t.abbrev);
    let is_home = if home.as_deref() == Some(team) {
        true
    } else if away.as_deref() == Some(team) {
        false
    } else {
        return Err(RosterError::TeamNotFound {
            game_id,
            team: team.to_string(),
            home,
            away,
        });
    };

    let groups = parsed
        .player_by_game_stats
        .and_then(|stats| if is_home { stats.home_team } else { stats.away_team })
        .ok_or_else(|| RosterError::Fetch {
            game_id,
            message: "boxscore has no player stats".to_string(),
        })?;
    let players = groups
        .forwards
        .into_iter()
        .chain(groups.defense)
        .chain(groups.goalies)
        .filter_map(|p| {
            Some(RosterEntry {
                player_id: p.player_id?,
                name: p.name,
                jersey_number: p.sweater_number,
                position: p.position,
            })
        });
    Ok(Roster::from_entries(players))
}

/// Fetches every game's roster on a bounded pool. A failed game is logged,
/// kept in `errors` and left out of the map; the others are unaffected.
pub fn fetch_rosters<S>(
    source: &S,
    games: &[GameRecord],
    team: &str,
    parallelism: usize,
) -> RosterFetch
where
    S: GameSource + Sync + ?Sized,
{
    let results: Vec<(u64, Result<Roster, RosterError>)> = with_fetch_pool(parallelism, || {
        games
            .par_iter()
            .map(|game| (game.game_id, source.roster(game.game_id, team)))
            .collect()
    });

    let mut rosters = HashMap::with_capacity(results.len());
    let mut errors = Vec::new();
    for (game_id, result) in results {
        match result {
            Ok(roster) => {
                rosters.insert(game_id, roster);
            }
            Err(err) => {
                warn!(game_id, "roster unavailable, treating as empty: {err}");
                errors.push(err);
            }
        }
    }
    info!(
        fetched = rosters.len(),
        failed = errors.len(),
        "roster fetch complete"
    );
    RosterFetch { rosters, errors }
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

#[derive(Debug, Deserialize)]
struct BoxscoreResponse {
    #[serde(rename = "homeTeam", default, deserialize_with = "lenient")]
    home_team: Option<BoxscoreTeam>,
    #[serde(rename = "awayTeam", default, deserialize_with = "lenient")]
    away_team: Option<BoxscoreTeam>,
    #[serde(rename = "playerByGameStats", default, deserialize_with = "lenient")]
    player_by_game_stats: Option<PlayerByGameStats>,
}

#[derive(Debug, Deserialize)]
struct BoxscoreTeam {
    #[serde(default, deserialize_with = "text_or_none")]
    abbrev: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerByGameStats {
    #[serde(rename = "homeTeam", default, deserialize_with = "lenient")]
    home_team: Option<PositionGroups>,
    #[serde(rename = "awayTeam", default, deserialize_with = "lenient")]
    away_team: Option<PositionGroups>,
}

#[derive(Debug, Deserialize)]
struct PositionGroups {
    #[serde(default, deserialize_with = "players_or_empty")]
    forwards: Vec<BoxscorePlayer>,
    #[serde(default, deserialize_with = "players_or_empty")]
    defense: Vec<BoxscorePlayer>,
    #[serde(default, deserialize_with = "players_or_empty")]
    goalies: Vec<BoxscorePlayer>,
}

#[derive(Debug, Deserialize)]
struct BoxscorePlayer {
    #[serde(rename = "playerId", default, deserialize_with = "u64_or_none")]
    player_id: Option<u64>,
    #[serde(default, deserialize_with = "text_or_none")]
    name: Option<String>,
    #[serde(rename = "sweaterNumber", default, deserialize_with = "u32_or_none")]
    sweater_number: Option<u32>,
    #[serde(default, deserialize_with = "text_or_none")]
    position: Option<String>,
}

fn players_or_empty<'de, D>(deserializer: D) -> Result<Vec<BoxscorePlayer>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}
