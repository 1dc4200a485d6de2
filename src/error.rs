use reqwest::StatusCode;
use thiserror::Error;

/// A response came back with a non-success status.
#[derive(Debug, Error)]
#[error("http {status}: {body}")]
pub struct HttpStatusError {
    pub status: StatusCode,
    pub body: String,
}

impl HttpStatusError {
    /// Server errors and throttling may clear up; other client errors will not.
    pub fn is_retryable(&self) -> bool {
        self.status.is_server_error() || self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

/// Failure to resolve one game's roster. Callers absorb these per game.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("team {team} not found in game {game_id} (home={home:?}, away={away:?})")]
    TeamNotFound {
        game_id: u64,
        team: String,
        home: Option<String>,
        away: Option<String>,
    },

    #[error("boxscore fetch failed for game {game_id}: {message}")]
    Fetch { game_id: u64, message: String },
}

/// The correlation coefficient is undefined for this input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    #[error("need at least 2 rows, got {rows}")]
    TooFewRows { rows: usize },

    #[error("{column} is constant across all rows")]
    ConstantSeries { column: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("team code must not be empty")]
    EmptyTeamCode,

    #[error("season must be 8 digits like 20242025, got {0:?}")]
    InvalidSeason(String),
}
