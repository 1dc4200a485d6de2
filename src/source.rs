use anyhow::Result;
use reqwest::blocking::Client;

use crate::config::AnalysisConfig;
use crate::error::RosterError;
use crate::http_client::http_client;
use crate::roster_fetch::{Roster, fetch_boxscore_body, parse_boxscore_json};
use crate::schedule_fetch::{GameRecord, fetch_schedule};

/// Where schedules and rosters come from.
pub trait GameSource {
    /// Completed games for `team` in `season`. Any error here is fatal to a run.
    fn schedule(&self, team: &str, season: &str) -> Result<Vec<GameRecord>>;

    fn roster(&self, game_id: u64, team: &str) -> Result<Roster, RosterError>;
}

/// The public NHL web API.
pub struct NhlApi {
    client: &'static Client,
    api_base: String,
    attempts: u32,
    extra_final_states: Vec<String>,
}

impl NhlApi {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout_secs)?,
            api_base: config.api_base.clone(),
            attempts: config.fetch_attempts,
            extra_final_states: config.extra_final_states.clone(),
        })
    }
}

impl GameSource for NhlApi {
    fn schedule(&self, team: &str, season: &str) -> Result<Vec<GameRecord>> {
        fetch_schedule(
            self.client,
            &self.api_base,
            team,
            season,
            self.attempts,
            &self.extra_final_states,
        )
    }

    fn roster(&self, game_id: u64, team: &str) -> Result<Roster, RosterError> {
        let body = fetch_boxscore_body(self.client, &self.api_base, game_id, self.attempts)
            .map_err(|err| RosterError::Fetch {
                game_id,
                message: format!("{err:#}"),
            })?;
        parse_boxscore_json(&body, game_id, team)
    }
}
