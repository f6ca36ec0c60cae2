use std::cmp::Ordering;
use std::str::FromStr;

use anyhow::bail;

use crate::dataset::ResearchRound;
use crate::scoring::{opportunity_level, OpportunityLevel};

/// One outcome of a round, flattened with its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub big_job_id: String,
    pub big_job_name: String,
    pub little_job_id: String,
    pub little_job_name: String,
    pub importance: f64,
    pub satisfaction: f64,
    pub opportunity_score: f64,
}

impl OutcomeRow {
    pub fn level(&self) -> OpportunityLevel {
        opportunity_level(self.opportunity_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundSort {
    #[default]
    Opportunity,
    Importance,
    Satisfaction,
}

impl FromStr for RoundSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opportunity" => Ok(RoundSort::Opportunity),
            "importance" => Ok(RoundSort::Importance),
            "satisfaction" => Ok(RoundSort::Satisfaction),
            other => bail!(
                "Unknown sort '{}' (expected opportunity, importance or satisfaction)",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundQuery {
    pub big_job_id: Option<String>,
    pub little_job_id: Option<String>,
    pub level: Option<OpportunityLevel>,
    pub sort: RoundSort,
}

/// Descending by value; NaN sorts as equal
pub(crate) fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn flatten_round(round: &ResearchRound) -> Vec<OutcomeRow> {
    let mut rows = Vec::with_capacity(round.data.outcome_count());
    for bj in &round.data.big_jobs {
        for lj in &bj.little_jobs {
            for o in &lj.outcomes {
                rows.push(OutcomeRow {
                    id: o.id.clone(),
                    name: o.name.clone(),
                    description: o.description.clone(),
                    big_job_id: bj.id.clone(),
                    big_job_name: bj.name.clone(),
                    little_job_id: lj.id.clone(),
                    little_job_name: lj.name.clone(),
                    importance: o.importance,
                    satisfaction: o.satisfaction,
                    opportunity_score: o.opportunity_score(),
                });
            }
        }
    }
    rows
}

/// Outcomes of one round, filtered and sorted (stable, descending).
pub fn round_outcomes(round: &ResearchRound, query: &RoundQuery) -> Vec<OutcomeRow> {
    let mut rows: Vec<OutcomeRow> = flatten_round(round)
        .into_iter()
        .filter(|r| query.big_job_id.as_deref().map_or(true, |id| r.big_job_id == id))
        .filter(|r| query.little_job_id.as_deref().map_or(true, |id| r.little_job_id == id))
        .filter(|r| query.level.map_or(true, |level| r.level() == level))
        .collect();

    rows.sort_by(|a, b| match query.sort {
        RoundSort::Opportunity => desc(a.opportunity_score, b.opportunity_score),
        RoundSort::Importance => desc(a.importance, b.importance),
        RoundSort::Satisfaction => desc(a.satisfaction, b.satisfaction),
    });
    rows
}
