use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::team_names::clean_team_name;

/// Columns every results file must carry; the rest may be absent.
pub const REQUIRED_COLUMNS: [&str; 4] = ["GAME_ID", "Team_Name", "1st Half", "Total"];

pub const COLUMNS: [&str; 9] = [
    "index", "GAME_ID", "Team_Name", "1st Half", "2nd Half", "1st OT", "2nd OT", "3rd OT", "Total",
];

/// One team's line in a box score, as read from the results file.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRow {
    pub line: u64,
    pub index: Option<String>,
    pub game_id: Option<String>,
    pub team_name: Option<String>,
    pub first_half: Option<f64>,
    pub second_half: Option<f64>,
    pub first_ot: Option<f64>,
    pub second_ot: Option<f64>,
    pub third_ot: Option<f64>,
    pub total: Option<f64>,
}

/// A row that survived the required-field filter, with its name normalised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanGameRow {
    pub game_id: String,
    pub team_name: String,
    pub raw_team_name: String,
    pub first_half: f64,
    pub second_half: Option<f64>,
    pub first_ot: Option<f64>,
    pub second_ot: Option<f64>,
    pub third_ot: Option<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    pub missing_game_id: usize,
    pub missing_team_name: usize,
    pub missing_first_half: usize,
    pub missing_total: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.missing_game_id + self.missing_team_name + self.missing_first_half + self.missing_total
    }
}

#[derive(Debug, Clone)]
pub struct CleanedRows {
    pub rows: Vec<CleanGameRow>,
    pub dropped: DropCounts,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    index: Option<String>,
    #[serde(rename = "GAME_ID", default)]
    game_id: Option<String>,
    #[serde(rename = "Team_Name", default)]
    team_name: Option<String>,
    #[serde(rename = "1st Half", default)]
    first_half: Option<String>,
    #[serde(rename = "2nd Half", default)]
    second_half: Option<String>,
    #[serde(rename = "1st OT", default)]
    first_ot: Option<String>,
    #[serde(rename = "2nd OT", default)]
    second_ot: Option<String>,
    #[serde(rename = "3rd OT", default)]
    third_ot: Option<String>,
    #[serde(rename = "Total", default)]
    total: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutRecord<'a> {
    index: usize,
    #[serde(rename = "GAME_ID")]
    game_id: &'a str,
    #[serde(rename = "Team_Name")]
    team_name: &'a str,
    #[serde(rename = "1st Half")]
    first_half: f64,
    #[serde(rename = "2nd Half")]
    second_half: Option<f64>,
    #[serde(rename = "1st OT")]
    first_ot: Option<f64>,
    #[serde(rename = "2nd OT")]
    second_ot: Option<f64>,
    #[serde(rename = "3rd OT")]
    third_ot: Option<f64>,
    #[serde(rename = "Total")]
    total: f64,
}

pub fn load_game_rows(path: &Path) -> Result<Vec<GameRow>> {
    let file = File::open(path).with_context(|| format!("open results csv {}", path.display()))?;
    read_game_rows(file).with_context(|| format!("read results csv {}", path.display()))
}

pub fn read_game_rows<R: Read>(reader: R) -> Result<Vec<GameRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().context("read csv header")?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .into_iter()
        .find(|col| !headers.iter().any(|h| h == *col))
    {
        return Err(AnalysisError::MissingColumn(missing).into());
    }

    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record.context("read csv record")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawRecord = record
            .deserialize(Some(&headers))
            .with_context(|| format!("decode csv record on line {line}"))?;
        out.push(parse_record(raw, line)?);
    }
    Ok(out)
}

fn parse_record(raw: RawRecord, line: u64) -> Result<GameRow, AnalysisError> {
    Ok(GameRow {
        line,
        index: non_missing(raw.index),
        game_id: non_missing(raw.game_id),
        team_name: non_missing(raw.team_name),
        first_half: parse_number(raw.first_half, line, "1st Half")?,
        second_half: parse_number(raw.second_half, line, "2nd Half")?,
        first_ot: parse_number(raw.first_ot, line, "1st OT")?,
        second_ot: parse_number(raw.second_ot, line, "2nd OT")?,
        third_ot: parse_number(raw.third_ot, line, "3rd OT")?,
        total: parse_number(raw.total, line, "Total")?,
    })
}

fn non_missing(raw: Option<String>) -> Option<String> {
    let s = raw?;
    let t = s.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("nan") || t.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(t.to_string())
    }
}

fn parse_number(
    raw: Option<String>,
    line: u64,
    column: &'static str,
) -> Result<Option<f64>, AnalysisError> {
    let Some(value) = non_missing(raw) else {
        return Ok(None);
    };
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(AnalysisError::InvalidNumber {
            line,
            column,
            value,
        }),
    }
}

/// Drop rows missing a game id, team name, first-half score or total, and
/// normalise the names of the rest.
pub fn clean_rows(rows: &[GameRow]) -> CleanedRows {
    let mut dropped = DropCounts::default();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(game_id) = row.game_id.as_deref() else {
            dropped.missing_game_id += 1;
            continue;
        };
        let Some(raw_name) = row.team_name.as_deref() else {
            dropped.missing_team_name += 1;
            continue;
        };
        // A bare record such as "(28-5)" leaves nothing to name the team by.
        let team_name = clean_team_name(raw_name);
        if team_name.is_empty() {
            dropped.missing_team_name += 1;
            continue;
        }
        let Some(first_half) = row.first_half else {
            dropped.missing_first_half += 1;
            continue;
        };
        let Some(total) = row.total else {
            dropped.missing_total += 1;
            continue;
        };
        out.push(CleanGameRow {
            game_id: game_id.to_string(),
            team_name,
            raw_team_name: raw_name.to_string(),
            first_half,
            second_half: row.second_half,
            first_ot: row.first_ot,
            second_ot: row.second_ot,
            third_ot: row.third_ot,
            total,
        });
    }

    CleanedRows { rows: out, dropped }
}

pub fn write_clean_rows(path: &Path, rows: &[CleanGameRow]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("create cleaned csv {}", path.display()))?;
    write_clean_rows_to(file, rows).with_context(|| format!("write cleaned csv {}", path.display()))
}

pub fn write_clean_rows_to<W: Write>(writer: W, rows: &[CleanGameRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record(COLUMNS).context("write csv header")?;
    }
    for (index, row) in rows.iter().enumerate() {
        wtr.serialize(OutRecord {
            index,
            game_id: &row.game_id,
            team_name: &row.team_name,
            first_half: row.first_half,
            second_half: row.second_half,
            first_ot: row.first_ot,
            second_ot: row.second_ot,
            third_ot: row.third_ot,
            total: row.total,
        })
        .context("write csv record")?;
    }
    wtr.flush().context("flush csv writer")?;
    Ok(())
}
