use anyhow::{Context, Result};
use tracing::warn;

use roster_consistency::analysis::run_analysis;
use roster_consistency::config::AnalysisConfig;
use roster_consistency::report::{XlsxReport, render_report};
use roster_consistency::source::NhlApi;

fn main() -> Result<()> {
    roster_consistency::init_logging();

    let config = AnalysisConfig::load().apply_args(std::env::args().skip(1));
    config.validate().context("invalid configuration")?;

    let api = NhlApi::new(&config)?;
    let output = run_analysis(&api, &config)?;
    let summary = &output.summary;

    println!("Roster consistency: {} {}", config.team_code, config.season);
    println!("Games analyzed: {}", summary.games);
    println!(
        "Record: {}-{} ({} home)",
        summary.wins,
        summary.games - summary.wins,
        summary.home_games
    );
    if let Some(rate) = summary.win_rate() {
        println!("Win rate: {:.3}", rate);
    }
    if let Some(mean) = summary.mean_consistency {
        println!("Mean consistency: {:.3}", mean);
    }
    match &summary.correlation {
        Ok(r) => println!("Correlation (consistency, win): {r:.4}"),
        Err(err) => println!("Correlation (consistency, win): undefined ({err})"),
    }
    if !output.roster_errors.is_empty() {
        println!("Roster fetch errors: {}", output.roster_errors.len());
        for err in output.roster_errors.iter().take(6) {
            println!("   - {err}");
        }
        println!(
            "Games scored against a missing roster: {}",
            summary.flagged_games
        );
    }

    if output.rows.is_empty() {
        warn!("nothing to plot, skipping report");
        return Ok(());
    }
    let mut report = XlsxReport::new();
    render_report(&mut report, &output.rows)?;
    report
        .save(&config.output_path)
        .context("report write failed")?;
    println!("Report: {}", config.output_path.display());

    Ok(())
}
