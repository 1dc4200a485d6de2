use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_TEAM_CODE: &str = "MIN";
pub const DEFAULT_SEASON: &str = "20242025";
pub const DEFAULT_API_BASE: &str = "https://api-web.nhle.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PARALLELISM: usize = 6;
const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_REPORT_PATH: &str = "roster_consistency.xlsx";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub team_code: String,
    pub season: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub fetch_parallelism: usize,
    pub fetch_attempts: u32,
    pub output_path: PathBuf,
    /// Game states accepted as completed in addition to `FINAL`.
    pub extra_final_states: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            team_code: DEFAULT_TEAM_CODE.to_string(),
            season: DEFAULT_SEASON.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            fetch_parallelism: DEFAULT_PARALLELISM,
            fetch_attempts: DEFAULT_ATTEMPTS,
            output_path: PathBuf::from(DEFAULT_REPORT_PATH),
            extra_final_states: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// Loads `.env.local` / `.env` if present, then reads the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let team_code = get("NHL_TEAM_CODE")
            .map(|v| normalize_team_code(&v))
            .unwrap_or(defaults.team_code);
        let season = get("NHL_SEASON").unwrap_or(defaults.season);
        let api_base = get("NHL_API_BASE")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);
        let request_timeout_secs = get("NHL_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let fetch_parallelism = get("FETCH_PARALLELISM")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_PARALLELISM)
            .clamp(1, 32);
        let fetch_attempts = get("FETCH_ATTEMPTS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_ATTEMPTS)
            .clamp(1, 5);
        let output_path = get("REPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_path);
        let extra_final_states = get("NHL_EXTRA_FINAL_STATES")
            .map(|v| parse_state_list(&v))
            .unwrap_or(defaults.extra_final_states);

        Self {
            team_code,
            season,
            api_base,
            request_timeout_secs,
            fetch_parallelism,
            fetch_attempts,
            output_path,
            extra_final_states,
        }
    }

    /// Applies `--team`, `--season` and `--out` overrides, in either
    /// `--flag=value` or `--flag value` form. Unknown arguments are ignored.
    pub fn apply_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args = args
            .into_iter()
            .map(|a| a.as_ref().to_string())
            .collect::<Vec<_>>();
        if let Some(team) = arg_value(&args, "--team") {
            self.team_code = normalize_team_code(&team);
        }
        if let Some(season) = arg_value(&args, "--season") {
            self.season = season;
        }
        if let Some(out) = arg_value(&args, "--out") {
            self.output_path = PathBuf::from(out);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.team_code.is_empty() {
            return Err(ConfigError::EmptyTeamCode);
        }
        if self.season.len() != 8 || !self.season.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidSeason(self.season.clone()));
        }
        Ok(())
    }
}

pub fn normalize_team_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Arguments that are neither a known flag nor the value of one.
pub fn positional_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args.iter().map(AsRef::as_ref) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.to_string());
    }
    out
}

const VALUE_FLAGS: &[&str] = &["--team", "--season", "--out"];

fn parse_state_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
