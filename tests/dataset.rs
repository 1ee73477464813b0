use std::path::PathBuf;

use ncaa_hoops::dataset::{COLUMNS, clean_rows, load_game_rows, write_clean_rows};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn fixture_loads_every_row() {
    let rows = load_game_rows(&fixture_path("gameresults.csv")).expect("fixture should load");
    assert_eq!(rows.len(), 16);
    assert_eq!(rows[7].first_ot, Some(7.0));
    assert_eq!(rows[12].total, None);
    assert_eq!(rows[12].team_name.as_deref(), Some("#8 Gonzaga (27-5)"));
}

#[test]
fn cleaned_rows_reload_with_the_same_shape() {
    let rows = load_game_rows(&fixture_path("gameresults.csv")).unwrap();
    let cleaned = clean_rows(&rows);
    assert_eq!(cleaned.rows.len(), 14);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("cleaned.csv");
    write_clean_rows(&out, &cleaned.rows).unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let header: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(header, COLUMNS);

    let reread = load_game_rows(&out).unwrap();
    assert_eq!(reread.len(), cleaned.rows.len());
    let again = clean_rows(&reread);
    assert_eq!(again.dropped.total(), 0);
    assert_eq!(again.rows[0].team_name, "Houston");
    assert_eq!(again.rows[0].raw_team_name, "Houston");
    assert_eq!(again.rows[6].first_ot, Some(9.0));
    assert_eq!(again.rows[0].first_ot, None);
}

#[test]
fn empty_cleaned_set_still_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("empty.csv");
    write_clean_rows(&out, &[]).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.trim_end(), COLUMNS.join(","));
    assert!(load_game_rows(&out).unwrap().is_empty());
}
