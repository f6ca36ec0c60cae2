pub mod catalog;
pub mod types;

pub use catalog::{build_rounds, find_round, latest_round, research_rounds};
pub use types::{BigJob, JtbdData, LittleJob, Outcome, ResearchRound};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("round {round}: no score for outcome {outcome}")]
    MissingScore { round: String, outcome: String },

    #[error("round {round}: invalid date: {source}")]
    InvalidDate {
        round: String,
        #[source]
        source: chrono::ParseError,
    },
}
