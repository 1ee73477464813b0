use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::pipeline::{AnalysisReport, RegressionOutcome};

pub struct ExportSummary {
    pub team_rows: usize,
    pub game_rows: usize,
    pub regression_rows: usize,
}

enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_finite() { Cell::Number(v) } else { Cell::Empty }
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Cell::Number(v as f64)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Empty)
    }
}

pub fn export_workbook(path: &Path, report: &AnalysisReport) -> Result<ExportSummary> {
    let team_rows = team_sheet_rows(report);
    let game_rows = game_sheet_rows(report);
    let regression_rows = regression_sheet_rows(report);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TeamStats")?;
        write_rows(sheet, &team_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Games")?;
        write_rows(sheet, &game_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Regression")?;
        write_rows(sheet, &regression_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        team_rows: team_rows.len().saturating_sub(1),
        game_rows: game_rows.len().saturating_sub(1),
        regression_rows: regression_rows.len().saturating_sub(1),
    })
}

pub fn export_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize analysis report")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap report into {}", path.display()))?;
    Ok(())
}

fn team_sheet_rows(report: &AnalysisReport) -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![
        "Team".into(),
        "Games".into(),
        "Wins".into(),
        "Winning %".into(),
        "Total Points".into(),
    ]];
    rows.extend(report.team_stats.iter().map(|s| {
        vec![
            s.team_name.clone().into(),
            s.games.into(),
            s.wins.into(),
            s.winning_percentage.into(),
            s.total_points.into(),
        ]
    }));
    rows
}

fn game_sheet_rows(report: &AnalysisReport) -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![
        "Game ID".into(),
        "Half-time Leader".into(),
        "Winner".into(),
        "Leader Won".into(),
    ]];
    rows.extend(report.halftime.outcomes.iter().map(|o| {
        let won = match o.leader_won {
            Some(true) => "yes",
            Some(false) => "no",
            None => "tie",
        };
        vec![
            o.game_id.clone().into(),
            o.halftime_leader.clone().into(),
            o.winner.clone().into(),
            won.into(),
        ]
    }));
    rows
}

fn regression_sheet_rows(report: &AnalysisReport) -> Vec<Vec<Cell>> {
    let fit = match &report.regression {
        RegressionOutcome::Fitted(fit) => fit,
        RegressionOutcome::Degenerate { reason } => {
            return vec![vec!["Status".into()], vec![format!("degenerate: {reason}").into()]];
        }
    };

    let mut rows = vec![vec![
        "Term".into(),
        "Coef".into(),
        "Std Err".into(),
        "t".into(),
        "P>|t|".into(),
        "CI 2.5%".into(),
        "CI 97.5%".into(),
    ]];
    rows.extend(fit.coefficients.iter().map(|c| {
        vec![
            c.name.clone().into(),
            c.coef.into(),
            c.std_err.into(),
            c.t_value.into(),
            c.p_value.into(),
            c.ci_low.into(),
            c.ci_high.into(),
        ]
    }));
    rows.push(vec![Cell::Empty]);
    rows.push(vec!["R-squared".into(), fit.r_squared.into()]);
    rows.push(vec!["Adj. R-squared".into(), fit.adj_r_squared.into()]);
    rows.push(vec!["F-statistic".into(), fit.f_statistic.into()]);
    rows.push(vec!["Prob (F-statistic)".into(), fit.f_p_value.into()]);
    rows.push(vec!["No. Observations".into(), fit.n_obs.into()]);
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match value {
                Cell::Text(s) => worksheet.write_string(r, c, s),
                Cell::Number(n) => worksheet.write_number(r, c, *n),
                Cell::Empty => continue,
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cell;

    #[test]
    fn non_finite_numbers_become_blank() {
        assert!(matches!(Cell::from(f64::NAN), Cell::Empty));
        assert!(matches!(Cell::from(Some(2.5)), Cell::Number(v) if v == 2.5));
        assert!(matches!(Cell::from(None::<String>), Cell::Empty));
    }
}
