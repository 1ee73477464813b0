pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod halftime;
pub mod pipeline;
pub mod regression;
pub mod team_names;
pub mod team_stats;

pub use error::AnalysisError;
