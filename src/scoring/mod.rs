pub mod engine;

pub use engine::{
    calculate_opportunity_score, opportunity_level, score, OpportunityLevel, ScoreResult,
    HIGH_THRESHOLD, MEDIUM_THRESHOLD,
};
