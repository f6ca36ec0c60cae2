use chrono::NaiveDate;

use crate::scoring::{calculate_opportunity_score, opportunity_level, OpportunityLevel};

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: f64,   // 0-10 scale
    pub satisfaction: f64, // 0-10 scale
}

impl Outcome {
    /// Always derived from the two ratings, never stored
    pub fn opportunity_score(&self) -> f64 {
        calculate_opportunity_score(self.importance, self.satisfaction)
    }

    pub fn level(&self) -> OpportunityLevel {
        opportunity_level(self.opportunity_score())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LittleJob {
    pub id: String,
    pub name: String,
    pub description: String,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BigJob {
    pub id: String,
    pub name: String,
    pub description: String,
    pub little_jobs: Vec<LittleJob>,
}

impl BigJob {
    pub fn outcome_count(&self) -> usize {
        self.little_jobs.iter().map(|lj| lj.outcomes.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JtbdData {
    pub big_jobs: Vec<BigJob>,
}

impl JtbdData {
    pub fn outcome_count(&self) -> usize {
        self.big_jobs.iter().map(BigJob::outcome_count).sum()
    }

    /// Find an outcome anywhere in the tree
    pub fn find_outcome(&self, outcome_id: &str) -> Option<&Outcome> {
        self.big_jobs
            .iter()
            .flat_map(|bj| bj.little_jobs.iter())
            .flat_map(|lj| lj.outcomes.iter())
            .find(|o| o.id == outcome_id)
    }
}

/// One immutable snapshot of importance/satisfaction ratings for the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchRound {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub description: String,
    pub data: JtbdData,
}
