use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no usable game rows after dropping incomplete records")]
    EmptyDataset,

    #[error(
        "{} game(s) do not have exactly two team rows: {}",
        .0.len(),
        format_groups(.0)
    )]
    GroupCardinality(Vec<(String, usize)>),

    #[error("no game had a distinct half-time leader and winner ({tied} tied, {considered} considered)")]
    NoDecidedGames { considered: usize, tied: usize },

    #[error("results file has no `{0}` column")]
    MissingColumn(&'static str),

    #[error("line {line}: column `{column}` is not a number: {value:?}")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("degenerate regression fit: {0}")]
    DegenerateFit(String),

    #[error("regression needs more than {params} observations, got {observations}")]
    InsufficientData { observations: usize, params: usize },
}

fn format_groups(groups: &[(String, usize)]) -> String {
    const SHOWN: usize = 8;
    let mut parts: Vec<String> = groups
        .iter()
        .take(SHOWN)
        .map(|(id, n)| format!("{id} ({n} rows)"))
        .collect();
    if groups.len() > SHOWN {
        parts.push(format!("... {} more", groups.len() - SHOWN));
    }
    parts.join(", ")
}
