use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::dataset::CleanGameRow;
use crate::halftime::{Game, TiePolicy};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStat {
    pub team_name: String,
    pub games: usize,
    pub wins: usize,
    pub winning_percentage: f64,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPoints {
    pub team_name: String,
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringExtremes {
    pub fewest: TeamPoints,
    pub most: TeamPoints,
}

/// Points scored per team across all of its rows, lowest first.
pub fn team_total_points(rows: &[CleanGameRow]) -> Vec<TeamPoints> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for row in rows {
        *totals.entry(row.team_name.as_str()).or_insert(0.0) += row.total;
    }
    let mut out: Vec<TeamPoints> = totals
        .into_iter()
        .map(|(team_name, total_points)| TeamPoints {
            team_name: team_name.to_string(),
            total_points,
        })
        .collect();
    out.sort_by(|a, b| {
        a.total_points
            .partial_cmp(&b.total_points)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
    out
}

pub fn scoring_extremes(points: &[TeamPoints]) -> Option<ScoringExtremes> {
    Some(ScoringExtremes {
        fewest: points.first()?.clone(),
        most: points.last()?.clone(),
    })
}

/// Index into `game.rows` of the row credited with the win.
///
/// Rows are ranked by total, highest first, with a stable sort; equal totals
/// give no winner unless `policy` is `Legacy`, which keeps file order.
pub fn ranked_winner(game: &Game<'_>, policy: TiePolicy) -> Option<usize> {
    let mut order = [0usize, 1];
    order.sort_by(|&i, &j| {
        game.rows[j]
            .total
            .partial_cmp(&game.rows[i].total)
            .unwrap_or(Ordering::Equal)
    });
    let top = order[0];
    let tied = game.rows[0].total == game.rows[1].total;
    if tied && policy == TiePolicy::Exclude {
        None
    } else {
        Some(top)
    }
}

/// Wins, games played, winning percentage and points for every team.
///
/// Both the win table and the points table come from the same cleaned rows,
/// so every team listed has a points total. Sorted by team name.
pub fn team_records(games: &[Game<'_>], policy: TiePolicy) -> Vec<TeamStat> {
    #[derive(Default)]
    struct Tally {
        games: usize,
        wins: usize,
        points: f64,
    }

    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for game in games {
        let winner = ranked_winner(game, policy);
        for (idx, row) in game.rows.iter().enumerate() {
            let tally = tallies.entry(row.team_name.as_str()).or_default();
            tally.games += 1;
            tally.points += row.total;
            if winner == Some(idx) {
                tally.wins += 1;
            }
        }
    }

    let mut out: Vec<TeamStat> = tallies
        .into_iter()
        .map(|(name, t)| TeamStat {
            team_name: name.to_string(),
            games: t.games,
            wins: t.wins,
            winning_percentage: 100.0 * t.wins as f64 / t.games as f64,
            total_points: t.points,
        })
        .collect();
    out.sort_by(|a, b| a.team_name.cmp(&b.team_name));
    out
}
