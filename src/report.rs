use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rust_xlsxwriter::{Chart, ChartType, Workbook, Worksheet};
use tracing::info;

use crate::pipeline::AnalysisRow;

pub const COL_CONSISTENCY: &str = "consistency";
pub const COL_IS_WIN: &str = "isWin";
pub const COL_DATE: &str = "date";
pub const COL_ROLLING: &str = "rollingConsistency";

const COLUMNS: &[&str] = &[
    "gameId",
    COL_DATE,
    "homeTeam",
    "awayTeam",
    "homeScore",
    "awayScore",
    COL_CONSISTENCY,
    "result",
    "isHome",
    COL_IS_WIN,
    COL_ROLLING,
    "predecessorMissing",
];

const SHEET_NAME: &str = "Analysis";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

/// Column-named table handed to a `ReportSink`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn from_rows(rows: &[AnalysisRow]) -> Self {
        let rows = rows.iter().map(dataset_row).collect();
        Self {
            columns: COLUMNS.to_vec(),
            rows,
        }
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| anyhow!("unknown column {name}"))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn dataset_row(row: &AnalysisRow) -> Vec<Cell> {
    vec![
        Cell::Number(row.game_id as f64),
        opt_text(row.date.map(|d| d.format("%Y-%m-%d").to_string())),
        opt_text(row.home_team.clone()),
        opt_text(row.away_team.clone()),
        opt_number(row.home_score.map(f64::from)),
        opt_number(row.away_score.map(f64::from)),
        Cell::Number(row.consistency),
        Cell::Text(row.result.as_str().to_string()),
        Cell::Number(f64::from(row.is_home)),
        Cell::Number(f64::from(row.is_win)),
        opt_number(row.rolling_consistency),
        Cell::Number(if row.predecessor_missing { 1.0 } else { 0.0 }),
    ]
}

fn opt_text(value: Option<String>) -> Cell {
    value.map(Cell::Text).unwrap_or(Cell::Empty)
}

fn opt_number(value: Option<f64>) -> Cell {
    value.map(Cell::Number).unwrap_or(Cell::Empty)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotLabels {
    pub title: &'static str,
    pub x: &'static str,
    pub y: &'static str,
}

pub const SCATTER_LABELS: PlotLabels = PlotLabels {
    title: "Roster Consistency vs. Win Percentage",
    x: "Roster Consistency",
    y: "Win (1) / Loss (0)",
};

pub const ROLLING_LABELS: PlotLabels = PlotLabels {
    title: "Rolling Consistency Over Season",
    x: "Game Date",
    y: "5-Game Rolling Consistency",
};

/// Renders plots from a dataset by column name.
pub trait ReportSink {
    fn scatter(&mut self, data: &Dataset, x: &str, y: &str, labels: &PlotLabels) -> Result<()>;

    fn line(&mut self, data: &Dataset, x: &str, y: &str, labels: &PlotLabels) -> Result<()>;
}

/// Draws the consistency/win scatter and the rolling consistency line.
pub fn render_report(sink: &mut dyn ReportSink, rows: &[AnalysisRow]) -> Result<()> {
    let data = Dataset::from_rows(rows);
    info!("plotting consistency vs. wins");
    sink.scatter(&data, COL_CONSISTENCY, COL_IS_WIN, &SCATTER_LABELS)
        .context("scatter plot failed")?;
    info!("plotting rolling consistency over the season");
    sink.line(&data, COL_DATE, COL_ROLLING, &ROLLING_LABELS)
        .context("rolling plot failed")?;
    Ok(())
}

/// Workbook with the analysis table and native Excel charts over it.
pub struct XlsxReport {
    sheet: Worksheet,
    table: Option<Dataset>,
    charts: u32,
}

impl Default for XlsxReport {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxReport {
    pub fn new() -> Self {
        Self {
            sheet: Worksheet::new(),
            table: None,
            charts: 0,
        }
    }

    pub fn save(mut self, path: &Path) -> Result<()> {
        self.sheet.set_name(SHEET_NAME)?;
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.sheet);
        workbook
            .save(path)
            .with_context(|| format!("write workbook {}", path.display()))?;
        info!(path = %path.display(), "report written");
        Ok(())
    }

    /// Writes `data` on first use. Every chart on the sheet points at that one
    /// table, so a different dataset afterwards is refused.
    fn ensure_table(&mut self, data: &Dataset) -> Result<usize> {
        if let Some(table) = &self.table {
            if table != data {
                return Err(anyhow!(
                    "report already holds a {}-row table; refusing a different dataset",
                    table.len()
                ));
            }
            return Ok(table.len());
        }
        for (col_idx, name) in data.columns.iter().enumerate() {
            self.sheet.write_string(0, col_idx as u16, *name)?;
        }
        for (row_idx, row) in data.rows.iter().enumerate() {
            let r = row_idx as u32 + 1;
            for (col_idx, cell) in row.iter().enumerate() {
                let c = col_idx as u16;
                match cell {
                    Cell::Number(v) => {
                        self.sheet
                            .write_number(r, c, *v)
                            .with_context(|| format!("write cell ({r},{c})"))?;
                    }
                    Cell::Text(s) => {
                        self.sheet
                            .write_string(r, c, s)
                            .with_context(|| format!("write cell ({r},{c})"))?;
                    }
                    Cell::Empty => {}
                }
            }
        }
        self.table = Some(data.clone());
        Ok(data.len())
    }

    fn place_chart(
        &mut self,
        kind: ChartType,
        data: &Dataset,
        x: &str,
        y: &str,
        labels: &PlotLabels,
    ) -> Result<()> {
        let x_col = data.column_index(x)? as u16;
        let y_col = data.column_index(y)? as u16;
        let rows = self.ensure_table(data)?;
        if rows == 0 {
            return Err(anyhow!("no rows to plot"));
        }
        let last = rows as u32;

        let mut chart = Chart::new(kind);
        chart
            .add_series()
            .set_categories((SHEET_NAME, 1, x_col, last, x_col))
            .set_values((SHEET_NAME, 1, y_col, last, y_col));
        chart.title().set_name(labels.title);
        chart.x_axis().set_name(labels.x);
        chart.y_axis().set_name(labels.y);
        chart.legend().set_hidden();

        let anchor_col = COLUMNS.len() as u16 + 1;
        let anchor_row = 1 + self.charts * 20;
        self.sheet
            .insert_chart(anchor_row, anchor_col, &chart)
            .context("insert chart")?;
        self.charts += 1;
        Ok(())
    }
}

impl ReportSink for XlsxReport {
    fn scatter(&mut self, data: &Dataset, x: &str, y: &str, labels: &PlotLabels) -> Result<()> {
        self.place_chart(ChartType::Scatter, data, x, y, labels)
    }

    fn line(&mut self, data: &Dataset, x: &str, y: &str, labels: &PlotLabels) -> Result<()> {
        self.place_chart(ChartType::Line, data, x, y, labels)
    }
}
