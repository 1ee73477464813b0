use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use ncaa_hoops::charts::{self, ChartView};
use ncaa_hoops::config::Config;
use ncaa_hoops::{dataset, export, pipeline};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let report = pipeline::analyze_file(&config.csv, config.analysis_options())
        .with_context(|| format!("analysis of {} failed", config.csv.display()))?;

    println!("{}", pipeline::render_text_report(&report));

    if let Some(path) = &config.cleaned_out {
        dataset::write_clean_rows(path, &report.clean_rows)?;
        info!(rows = report.clean_rows.len(), path = %path.display(), "cleaned rows written");
    }
    if let Some(path) = &config.xlsx {
        let summary = export::export_workbook(path, &report)?;
        info!(
            teams = summary.team_rows,
            games = summary.game_rows,
            terms = summary.regression_rows,
            path = %path.display(),
            "workbook written"
        );
    }
    if let Some(path) = &config.json {
        export::export_json(path, &report)?;
        info!(path = %path.display(), "json report written");
    }

    if config.no_charts {
        return Ok(());
    }
    if !std::io::stdout().is_terminal() {
        warn!("stdout is not a terminal; skipping charts");
        return Ok(());
    }

    let view = ChartView {
        win_p: report.halftime.win_p,
        loss_p: report.halftime.loss_p,
        extremes: report.extremes.clone(),
        headline: format!(
            "Leader at the half won {} of {} decided games",
            charts::format_pct(report.halftime.win_p),
            report.halftime.games_decided
        ),
    };
    charts::show_charts(&view).context("render charts")?;
    Ok(())
}
