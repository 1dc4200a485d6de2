use crate::error::CorrelationError;
use crate::pipeline::AnalysisRow;

/// Pearson correlation between `consistency` and `is_win`.
pub fn consistency_win_correlation(rows: &[AnalysisRow]) -> Result<f64, CorrelationError> {
    let xs: Vec<f64> = rows.iter().map(|r| r.consistency).collect();
    let ys: Vec<f64> = rows.iter().map(|r| f64::from(r.is_win)).collect();
    pearson(&xs, &ys, ("consistency", "isWin"))
}

/// Sample Pearson coefficient. Undefined for fewer than two pairs or when
/// either series has zero variance; `names` label the series in that error.
pub fn pearson(
    xs: &[f64],
    ys: &[f64],
    names: (&'static str, &'static str),
) -> Result<f64, CorrelationError> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Err(CorrelationError::TooFewRows { rows: n });
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0_f64;
    let mut var_x = 0.0_f64;
    let mut var_y = 0.0_f64;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= f64::EPSILON * n as f64 {
        return Err(CorrelationError::ConstantSeries { column: names.0 });
    }
    if var_y <= f64::EPSILON * n as f64 {
        return Err(CorrelationError::ConstantSeries { column: names.1 });
    }
    Ok((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonSummary {
    pub games: usize,
    pub wins: usize,
    pub home_games: usize,
    pub mean_consistency: Option<f64>,
    /// Games whose consistency rests on a missing previous roster.
    pub flagged_games: usize,
    pub correlation: Result<f64, CorrelationError>,
}

impl SeasonSummary {
    pub fn from_rows(rows: &[AnalysisRow]) -> Self {
        let games = rows.len();
        let mean_consistency = if games == 0 {
            None
        } else {
            Some(rows.iter().map(|r| r.consistency).sum::<f64>() / games as f64)
        };
        Self {
            games,
            wins: rows.iter().filter(|r| r.is_win == 1).count(),
            home_games: rows.iter().filter(|r| r.is_home == 1).count(),
            mean_consistency,
            flagged_games: rows.iter().filter(|r| r.predecessor_missing).count(),
            correlation: consistency_win_correlation(rows),
        }
    }

    pub fn win_rate(&self) -> Option<f64> {
        (self.games > 0).then(|| self.wins as f64 / self.games as f64)
    }
}
