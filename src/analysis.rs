use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::consistency::{ConsistencyRecord, compute_consistency};
use crate::correlation::SeasonSummary;
use crate::error::RosterError;
use crate::pipeline::{AnalysisRow, process};
use crate::roster_fetch::fetch_rosters;
use crate::schedule_fetch::GameRecord;
use crate::source::GameSource;

pub struct AnalysisOutput {
    pub games: Vec<GameRecord>,
    pub consistency: Vec<ConsistencyRecord>,
    pub rows: Vec<AnalysisRow>,
    pub roster_errors: Vec<RosterError>,
    pub summary: SeasonSummary,
}

/// Fetch, score, join and summarize one team's season. Only a schedule
/// failure aborts; roster failures degrade the affected games.
pub fn run_analysis<S>(source: &S, config: &AnalysisConfig) -> Result<AnalysisOutput>
where
    S: GameSource + Sync + ?Sized,
{
    let team = config.team_code.as_str();
    let season = config.season.as_str();

    info!(team, season, "collecting data");
    let games = source
        .schedule(team, season)
        .with_context(|| format!("schedule fetch failed for {team} {season}"))?;
    info!(games = games.len(), "completed games found");
    if games.is_empty() {
        warn!(team, season, "no completed games in schedule");
    }

    let fetched = fetch_rosters(source, &games, team, config.fetch_parallelism);

    info!("calculating roster consistency");
    let consistency = compute_consistency(&games, &fetched.rosters, team);

    info!("processing data for analysis");
    let rows = process(&games, &consistency, team);

    info!("analyzing correlation between consistency and wins");
    let summary = SeasonSummary::from_rows(&rows);
    match &summary.correlation {
        Ok(r) => info!("correlation coefficient: {r:.4}"),
        Err(err) => warn!("correlation undefined: {err}"),
    }

    Ok(AnalysisOutput {
        games,
        consistency,
        rows,
        roster_errors: fetched.errors,
        summary,
    })
}
