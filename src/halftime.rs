use std::collections::HashMap;

use serde::Serialize;

use crate::dataset::CleanGameRow;
use crate::error::AnalysisError;

/// How a dead heat on the first-half score or the final total is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// A tie means there is no leader (or no winner) and the game is left out.
    #[default]
    Exclude,
    /// Comparisons fall through to the second row on a tie, and the score
    /// ranking keeps file order, matching the historical notebook output.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardinalityPolicy {
    #[default]
    Strict,
    Skip,
}

/// Both team rows of one game, in file order.
#[derive(Debug, Clone, Copy)]
pub struct Game<'a> {
    pub game_id: &'a str,
    pub rows: [&'a CleanGameRow; 2],
}

#[derive(Debug, Clone)]
pub struct GroupedGames<'a> {
    pub games: Vec<Game<'a>>,
    pub skipped: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameOutcome {
    pub game_id: String,
    pub halftime_leader: Option<String>,
    pub winner: Option<String>,
    pub leader_won: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HalftimeSummary {
    pub probability: f64,
    pub win_p: f64,
    pub loss_p: f64,
    pub games_considered: usize,
    pub games_decided: usize,
    pub tied_games: usize,
    pub outcomes: Vec<GameOutcome>,
}

/// Group rows by game id, keeping the order in which games first appear.
pub fn group_games(
    rows: &[CleanGameRow],
    policy: CardinalityPolicy,
) -> Result<GroupedGames<'_>, AnalysisError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&CleanGameRow>)> = Vec::new();
    for row in rows {
        let slot = *index.entry(row.game_id.as_str()).or_insert_with(|| {
            groups.push((row.game_id.as_str(), Vec::with_capacity(2)));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }

    let mut games = Vec::with_capacity(groups.len());
    let mut bad = Vec::new();
    for (game_id, members) in groups {
        match members.as_slice() {
            [a, b] => games.push(Game {
                game_id,
                rows: [*a, *b],
            }),
            _ => bad.push((game_id.to_string(), members.len())),
        }
    }

    if !bad.is_empty() && policy == CardinalityPolicy::Strict {
        return Err(AnalysisError::GroupCardinality(bad));
    }
    Ok(GroupedGames {
        games,
        skipped: bad,
    })
}

fn pick(a: f64, b: f64, policy: TiePolicy) -> Option<usize> {
    if a > b {
        Some(0)
    } else if a < b || policy == TiePolicy::Legacy {
        Some(1)
    } else {
        None
    }
}

/// Indexes into `game.rows` of the half-time leader and the winner.
pub fn leader_and_winner(game: &Game<'_>, policy: TiePolicy) -> (Option<usize>, Option<usize>) {
    let [a, b] = game.rows;
    (
        pick(a.first_half, b.first_half, policy),
        pick(a.total, b.total, policy),
    )
}

/// Did the team ahead at the half also win? `None` when a tie leaves the
/// question unanswered under `policy`.
pub fn determine_winner(game: &Game<'_>, policy: TiePolicy) -> Option<bool> {
    match leader_and_winner(game, policy) {
        (Some(leader), Some(winner)) => Some(leader == winner),
        _ => None,
    }
}

pub fn game_outcome(game: &Game<'_>, policy: TiePolicy) -> GameOutcome {
    let (leader, winner) = leader_and_winner(game, policy);
    let name = |idx: Option<usize>| idx.map(|i| game.rows[i].team_name.clone());
    GameOutcome {
        game_id: game.game_id.to_string(),
        halftime_leader: name(leader),
        winner: name(winner),
        leader_won: determine_winner(game, policy),
    }
}

pub fn halftime_leader_win_probability(
    games: &[Game<'_>],
    policy: TiePolicy,
) -> Result<HalftimeSummary, AnalysisError> {
    let outcomes: Vec<GameOutcome> = games.iter().map(|g| game_outcome(g, policy)).collect();
    let decided: Vec<bool> = outcomes.iter().filter_map(|o| o.leader_won).collect();
    let tied_games = outcomes.len() - decided.len();

    if decided.is_empty() {
        return Err(AnalysisError::NoDecidedGames {
            considered: outcomes.len(),
            tied: tied_games,
        });
    }

    let wins = decided.iter().filter(|won| **won).count();
    let probability = wins as f64 / decided.len() as f64;
    Ok(HalftimeSummary {
        probability,
        win_p: probability,
        loss_p: 1.0 - probability,
        games_considered: outcomes.len(),
        games_decided: decided.len(),
        tied_games,
        outcomes,
    })
}
