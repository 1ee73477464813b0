use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::dataset::{self, CleanGameRow, DropCounts, GameRow};
use crate::error::AnalysisError;
use crate::halftime::{self, CardinalityPolicy, HalftimeSummary, TiePolicy};
use crate::regression::{self, OlsFit};
use crate::team_stats::{self, ScoringExtremes, TeamPoints, TeamStat};

pub const DEP_VAR: &str = "Winning_Percentage";
pub const REGRESSOR: &str = "Total_Points";

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    pub tie_policy: TiePolicy,
    pub cardinality: CardinalityPolicy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegressionOutcome {
    Fitted(OlsFit),
    Degenerate { reason: String },
}

impl RegressionOutcome {
    pub fn fit(&self) -> Option<&OlsFit> {
        match self {
            RegressionOutcome::Fitted(fit) => Some(fit),
            RegressionOutcome::Degenerate { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub tie_policy: TiePolicy,
    pub rows_read: usize,
    pub rows_used: usize,
    pub dropped: DropCounts,
    pub skipped_games: Vec<(String, usize)>,
    pub halftime: HalftimeSummary,
    pub team_points: Vec<TeamPoints>,
    pub extremes: Option<ScoringExtremes>,
    pub team_stats: Vec<TeamStat>,
    pub regression: RegressionOutcome,
    #[serde(skip)]
    pub clean_rows: Vec<CleanGameRow>,
}

pub fn analyze_file(path: &Path, opts: AnalysisOptions) -> Result<AnalysisReport> {
    let rows = dataset::load_game_rows(path)?;
    info!(rows = rows.len(), path = %path.display(), "loaded game results");
    Ok(run_analysis(&rows, opts)?)
}

pub fn run_analysis(rows: &[GameRow], opts: AnalysisOptions) -> Result<AnalysisReport, AnalysisError> {
    let cleaned = dataset::clean_rows(rows);
    if cleaned.dropped.total() > 0 {
        warn!(
            dropped = cleaned.dropped.total(),
            missing_game_id = cleaned.dropped.missing_game_id,
            missing_team_name = cleaned.dropped.missing_team_name,
            missing_first_half = cleaned.dropped.missing_first_half,
            missing_total = cleaned.dropped.missing_total,
            "dropped incomplete rows"
        );
    }
    if cleaned.rows.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let grouped = halftime::group_games(&cleaned.rows, opts.cardinality)?;
    if !grouped.skipped.is_empty() {
        warn!(
            skipped = grouped.skipped.len(),
            "skipped games without exactly two team rows"
        );
    }
    let skipped_ids: HashSet<&str> = grouped.skipped.iter().map(|(id, _)| id.as_str()).collect();
    let used_rows: Vec<CleanGameRow> = cleaned
        .rows
        .iter()
        .filter(|r| !skipped_ids.contains(r.game_id.as_str()))
        .cloned()
        .collect();

    let summary = halftime::halftime_leader_win_probability(&grouped.games, opts.tie_policy)?;
    info!(
        games = summary.games_considered,
        decided = summary.games_decided,
        probability = summary.probability,
        "half-time leader outcome computed"
    );

    let team_points = team_stats::team_total_points(&used_rows);
    let extremes = team_stats::scoring_extremes(&team_points);
    let stats = team_stats::team_records(&grouped.games, opts.tie_policy);

    let regression = fit_points_model(&stats)?;
    if let RegressionOutcome::Degenerate { reason } = &regression {
        warn!(%reason, "regression not reported");
    }

    Ok(AnalysisReport {
        tie_policy: opts.tie_policy,
        rows_read: rows.len(),
        rows_used: used_rows.len(),
        dropped: cleaned.dropped,
        skipped_games: grouped.skipped,
        halftime: summary,
        team_points,
        extremes,
        team_stats: stats,
        regression,
        clean_rows: used_rows,
    })
}

/// Winning percentage regressed on total points, one observation per team.
pub fn fit_points_model(stats: &[TeamStat]) -> Result<RegressionOutcome, AnalysisError> {
    let y: Vec<f64> = stats.iter().map(|s| s.winning_percentage).collect();
    let x: Vec<f64> = stats.iter().map(|s| s.total_points).collect();
    let exog = regression::add_constant(vec![(REGRESSOR.to_string(), x)], y.len());
    match regression::fit_ols(DEP_VAR, &y, &exog) {
        Ok(fit) => Ok(RegressionOutcome::Fitted(fit)),
        Err(err @ (AnalysisError::DegenerateFit(_) | AnalysisError::InsufficientData { .. })) => {
            Ok(RegressionOutcome::Degenerate {
                reason: err.to_string(),
            })
        }
        Err(err) => Err(err),
    }
}

pub fn render_text_report(report: &AnalysisReport) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "The probability of winning when leading at the first half is: {}",
        report.halftime.probability
    ));
    lines.push(format!(
        "Games: {} considered, {} decided, {} tied (tie policy: {:?})",
        report.halftime.games_considered,
        report.halftime.games_decided,
        report.halftime.tied_games,
        report.tie_policy
    ));
    lines.push(format!(
        "Rows: {} read, {} used, {} dropped as incomplete",
        report.rows_read,
        report.rows_used,
        report.dropped.total()
    ));
    if !report.skipped_games.is_empty() {
        lines.push(format!(
            "Skipped games (not exactly two rows): {}",
            report.skipped_games.len()
        ));
    }
    if let Some(ext) = &report.extremes {
        lines.push(format!(
            "Fewest points: {} ({:.0}) | Most points: {} ({:.0})",
            ext.fewest.team_name, ext.fewest.total_points, ext.most.team_name, ext.most.total_points
        ));
    }
    lines.push(String::new());
    match &report.regression {
        RegressionOutcome::Fitted(fit) => lines.push(fit.summary()),
        RegressionOutcome::Degenerate { reason } => {
            lines.push(format!("Regression not reported: {reason}"))
        }
    }
    lines.join("\n")
}
