use std::path::PathBuf;

use approx::assert_relative_eq;

use ncaa_hoops::AnalysisError;
use ncaa_hoops::dataset::read_game_rows;
use ncaa_hoops::halftime::{CardinalityPolicy, TiePolicy};
use ncaa_hoops::pipeline::{AnalysisOptions, RegressionOutcome, analyze_file, run_analysis};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn fixture_probability_excludes_tied_half() {
    let report = analyze_file(&fixture_path("gameresults.csv"), AnalysisOptions::default())
        .expect("fixture should analyse");

    assert_eq!(report.rows_read, 16);
    assert_eq!(report.rows_used, 14);
    assert_eq!(report.dropped.missing_total, 2);
    assert_eq!(report.dropped.total(), 2);

    let h = &report.halftime;
    assert_eq!(h.games_considered, 7);
    assert_eq!(h.games_decided, 6);
    assert_eq!(h.tied_games, 1);
    assert_relative_eq!(h.probability, 4.0 / 6.0, epsilon = 1e-12);
    assert_relative_eq!(h.win_p + h.loss_p, 1.0, epsilon = 1e-12);
}

#[test]
fn legacy_policy_reproduces_second_row_tie_break() {
    let opts = AnalysisOptions {
        tie_policy: TiePolicy::Legacy,
        ..AnalysisOptions::default()
    };
    let report = analyze_file(&fixture_path("gameresults.csv"), opts).unwrap();
    assert_eq!(report.halftime.games_decided, 7);
    assert_relative_eq!(report.halftime.probability, 5.0 / 7.0, epsilon = 1e-12);
    let tied = report
        .halftime
        .outcomes
        .iter()
        .find(|o| o.game_id == "1008")
        .unwrap();
    assert_eq!(tied.halftime_leader.as_deref(), Some("Kansas"));
}

#[test]
fn team_tables_use_cleaned_names() {
    let report = analyze_file(&fixture_path("gameresults.csv"), AnalysisOptions::default()).unwrap();

    let names: Vec<&str> = report.team_stats.iter().map(|s| s.team_name.as_str()).collect();
    assert_eq!(names, vec!["Duke", "Houston", "Kansas", "Longwood", "Vermont"]);

    let houston = report.team_stats.iter().find(|s| s.team_name == "Houston").unwrap();
    assert_eq!((houston.games, houston.wins), (3, 2));
    assert_eq!(houston.total_points, 203.0);
    assert_relative_eq!(houston.winning_percentage, 200.0 / 3.0, epsilon = 1e-9);

    let longwood = report.team_stats.iter().find(|s| s.team_name == "Longwood").unwrap();
    assert_eq!(longwood.winning_percentage, 0.0);

    let points: f64 = report.team_points.iter().map(|p| p.total_points).sum();
    let rows: f64 = report.clean_rows.iter().map(|r| r.total).sum();
    assert_eq!(points, rows);
    assert_eq!(points, 945.0);

    let ext = report.extremes.as_ref().unwrap();
    assert_eq!(ext.fewest.team_name, "Vermont");
    assert_eq!(ext.fewest.total_points, 132.0);
    assert_eq!(ext.most.team_name, "Duke");
    assert_eq!(ext.most.total_points, 225.0);

    for s in &report.team_stats {
        assert!((0.0..=100.0).contains(&s.winning_percentage));
    }
}

#[test]
fn regression_runs_on_team_table() {
    let report = analyze_file(&fixture_path("gameresults.csv"), AnalysisOptions::default()).unwrap();
    let fit = report.regression.fit().expect("fit should be reported");
    assert_eq!(fit.n_obs, 5);
    assert_eq!(fit.df_resid, 3);
    assert!(fit.coefficient("const").is_some());
    let slope = fit.coefficient("Total_Points").unwrap();
    assert!(slope.coef > 0.0);
    assert!((0.0..=1.0).contains(&fit.r_squared));
}

#[test]
fn broken_pairing_fails_fast_by_default() {
    let err = analyze_file(
        &fixture_path("gameresults_incomplete.csv"),
        AnalysisOptions::default(),
    )
    .unwrap_err();
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::GroupCardinality(bad)) => {
            assert_eq!(bad, &vec![("2002".to_string(), 1)]);
        }
        other => panic!("expected cardinality error, got {other:?}"),
    }
}

#[test]
fn broken_pairing_can_be_skipped() {
    let opts = AnalysisOptions {
        cardinality: CardinalityPolicy::Skip,
        ..AnalysisOptions::default()
    };
    let report = analyze_file(&fixture_path("gameresults_incomplete.csv"), opts).unwrap();
    assert_eq!(report.dropped.missing_first_half, 1);
    assert_eq!(report.skipped_games, vec![("2002".to_string(), 1)]);
    assert_eq!(report.rows_used, 6);
    assert_eq!(report.halftime.probability, 1.0);
    assert_eq!(report.halftime.loss_p, 0.0);

    // The orphaned Maryland row from game 2002 feeds neither table.
    let maryland = report.team_stats.iter().find(|s| s.team_name == "Maryland").unwrap();
    assert_eq!(maryland.games, 1);
    assert_eq!(maryland.total_points, 51.0);
    let alabama = report.team_stats.iter().find(|s| s.team_name == "Alabama").unwrap();
    assert_eq!(alabama.winning_percentage, 100.0);
}

#[test]
fn equal_points_flag_degenerate_regression() {
    let raw = "\
GAME_ID,Team_Name,1st Half,Total
1,Purdue,40,70
1,Iowa,30,60
2,Iowa,40,70
2,Illinois,30,60
3,Illinois,40,70
3,Purdue,30,60
";
    let rows = read_game_rows(raw.as_bytes()).unwrap();
    let report = run_analysis(&rows, AnalysisOptions::default()).unwrap();
    match &report.regression {
        RegressionOutcome::Degenerate { reason } => {
            assert!(reason.contains("Total_Points has zero variance"), "{reason}");
        }
        RegressionOutcome::Fitted(_) => panic!("zero-variance fit must not be reported"),
    }
}

#[test]
fn empty_after_cleaning_is_an_error() {
    let raw = "GAME_ID,Team_Name,1st Half,Total\n1,,40,70\n1,Iowa,,60\n";
    let rows = read_game_rows(raw.as_bytes()).unwrap();
    assert!(matches!(
        run_analysis(&rows, AnalysisOptions::default()),
        Err(AnalysisError::EmptyDataset)
    ));
}

#[test]
fn missing_file_names_the_path() {
    let err = analyze_file(&fixture_path("nope.csv"), AnalysisOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("nope.csv"));
}
