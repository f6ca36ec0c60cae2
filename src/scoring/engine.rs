use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Scores at or above this are classified as high opportunity.
pub const HIGH_THRESHOLD: f64 = 12.0;

/// Scores at or above this (and below [`HIGH_THRESHOLD`]) are medium.
pub const MEDIUM_THRESHOLD: f64 = 9.0;

/// Opportunity score for an outcome: `importance + (importance - satisfaction)`.
///
/// Ratings are expected on a 0-10 scale but are not checked; out-of-range
/// inputs produce scores below 0 or above 20.
pub fn calculate_opportunity_score(importance: f64, satisfaction: f64) -> f64 {
    importance + (importance - satisfaction)
}

/// Discrete classification of an opportunity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityLevel {
    High,
    Medium,
    Low,
}

impl OpportunityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityLevel::High => "high",
            OpportunityLevel::Medium => "medium",
            OpportunityLevel::Low => "low",
        }
    }

    /// How well the market serves the outcome at this level
    pub fn zone_label(&self) -> &'static str {
        match self {
            OpportunityLevel::High => "Underserved",
            OpportunityLevel::Medium => "Appropriately Served",
            OpportunityLevel::Low => "Overserved",
        }
    }
}

impl fmt::Display for OpportunityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpportunityLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(OpportunityLevel::High),
            "medium" => Ok(OpportunityLevel::Medium),
            "low" => Ok(OpportunityLevel::Low),
            other => bail!("Unknown opportunity level '{}' (expected high, medium or low)", other),
        }
    }
}

/// Classify a score: high at >= 12, medium at >= 9, low otherwise.
pub fn opportunity_level(score: f64) -> OpportunityLevel {
    if score >= HIGH_THRESHOLD {
        OpportunityLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        OpportunityLevel::Medium
    } else {
        OpportunityLevel::Low
    }
}

/// Score and level for a single rating pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub score: f64,
    pub level: OpportunityLevel,
}

pub fn score(importance: f64, satisfaction: f64) -> ScoreResult {
    let score = calculate_opportunity_score(importance, satisfaction);
    ScoreResult {
        score,
        level: opportunity_level(score),
    }
}
