pub mod evolution;
pub mod jobs;
pub mod round;

pub use evolution::{
    build_evolution, evolution, sparkline, EvolutionQuery, EvolutionSort, OutcomeEvolution,
    SeriesPoint, SparkPoint,
};
pub use jobs::{job_summaries, BigJobSummary, LittleJobSummary};
pub use round::{flatten_round, round_outcomes, OutcomeRow, RoundQuery, RoundSort};
