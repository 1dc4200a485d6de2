use anyhow::{Result, anyhow};

use roster_consistency::config::{AnalysisConfig, positional_args};
use roster_consistency::source::{GameSource, NhlApi};

/// Prints one game's roster for the configured team:
/// `roster_dump <game-id> [--team MIN]`. Without a game id, lists the
/// season's completed games instead.
fn main() -> Result<()> {
    roster_consistency::init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = AnalysisConfig::load().apply_args(&args);
    config.validate()?;
    let api = NhlApi::new(&config)?;

    let game_id = positional_args(args.as_slice())
        .first()
        .map(|a| {
            a.parse::<u64>()
                .map_err(|_| anyhow!("game id must be numeric, got {a}"))
        })
        .transpose()?;

    let Some(game_id) = game_id else {
        let games = api.schedule(&config.team_code, &config.season)?;
        println!(
            "{} completed games for {} {}",
            games.len(),
            config.team_code,
            config.season
        );
        for game in games {
            println!(
                "{}  {}  {} {} - {} {}",
                game.game_id,
                game.date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "????-??-??".to_string()),
                game.away_team.as_deref().unwrap_or("?"),
                opt_score(game.away_score),
                opt_score(game.home_score),
                game.home_team.as_deref().unwrap_or("?"),
            );
        }
        return Ok(());
    };

    let roster = api.roster(game_id, &config.team_code)?;
    println!(
        "{} players for {} in game {}",
        roster.len(),
        config.team_code,
        game_id
    );
    for entry in &roster.entries {
        println!(
            "{:>9}  #{:<3} {:<2} {}",
            entry.player_id,
            entry
                .jersey_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            entry.position.as_deref().unwrap_or("-"),
            entry.name.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

fn opt_score(score: Option<u32>) -> String {
    score.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string())
}
