use std::path::PathBuf;

use clap::Parser;

use crate::halftime::{CardinalityPolicy, TiePolicy};
use crate::pipeline::AnalysisOptions;

/// Half-time lead analysis over NCAA box-score results
#[derive(Parser, Debug, Clone)]
#[command(name = "ncaa_hoops", version, about)]
pub struct Config {
    /// Game results CSV (index, GAME_ID, Team_Name, 1st Half, ..., Total)
    #[arg(long, env = "HOOPS_CSV", default_value = "gameresults.csv")]
    pub csv: PathBuf,

    /// How tied half-time scores or totals are treated
    #[arg(long, env = "HOOPS_TIE_POLICY", value_enum, default_value_t = TiePolicy::Exclude)]
    pub tie_policy: TiePolicy,

    /// Skip games that do not have exactly two team rows instead of failing
    #[arg(long, env = "HOOPS_SKIP_INCOMPLETE_GAMES", default_value = "false")]
    pub skip_incomplete_games: bool,

    /// Print results only; do not open the interactive charts
    #[arg(long, env = "HOOPS_NO_CHARTS", default_value = "false")]
    pub no_charts: bool,

    /// Write the cleaned rows used for the analysis to this CSV
    #[arg(long, env = "HOOPS_CLEANED_OUT")]
    pub cleaned_out: Option<PathBuf>,

    /// Write team stats, per-game outcomes and the regression to an xlsx workbook
    #[arg(long, env = "HOOPS_XLSX")]
    pub xlsx: Option<PathBuf>,

    /// Write the full analysis report as JSON
    #[arg(long, env = "HOOPS_JSON")]
    pub json: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.csv.as_os_str().is_empty() {
            anyhow::bail!("csv path must not be empty");
        }
        for (flag, out) in [
            ("--cleaned-out", &self.cleaned_out),
            ("--xlsx", &self.xlsx),
            ("--json", &self.json),
        ] {
            if let Some(out) = out
                && out == &self.csv
            {
                anyhow::bail!("{flag} would overwrite the input file {}", self.csv.display());
            }
        }
        Ok(())
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            tie_policy: self.tie_policy,
            cardinality: if self.skip_incomplete_games {
                CardinalityPolicy::Skip
            } else {
                CardinalityPolicy::Strict
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::halftime::{CardinalityPolicy, TiePolicy};
    use clap::Parser;

    #[test]
    fn defaults_are_strict_and_exclusive() {
        let cfg = Config::try_parse_from(["ncaa_hoops"]).unwrap();
        assert_eq!(cfg.tie_policy, TiePolicy::Exclude);
        let opts = cfg.analysis_options();
        assert_eq!(opts.cardinality, CardinalityPolicy::Strict);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn legacy_and_skip_flags_parse() {
        let cfg = Config::try_parse_from([
            "ncaa_hoops",
            "--csv",
            "data/games.csv",
            "--tie-policy",
            "legacy",
            "--skip-incomplete-games",
        ])
        .unwrap();
        assert_eq!(cfg.tie_policy, TiePolicy::Legacy);
        assert_eq!(cfg.analysis_options().cardinality, CardinalityPolicy::Skip);
    }

    #[test]
    fn refuses_to_overwrite_input() {
        let cfg = Config::try_parse_from([
            "ncaa_hoops",
            "--csv",
            "games.csv",
            "--cleaned-out",
            "games.csv",
        ])
        .unwrap();
        assert!(cfg.validate().is_err());
    }
}
