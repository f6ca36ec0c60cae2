use crate::dataset::{BigJob, LittleJob, Outcome, ResearchRound};
use crate::scoring::{opportunity_level, OpportunityLevel};

/// Per-little-job aggregates for one round.
#[derive(Debug, Clone, PartialEq)]
pub struct LittleJobSummary {
    pub id: String,
    pub name: String,
    pub outcome_count: usize,
    /// `None` when the job has no outcomes
    pub average_opportunity: Option<f64>,
    /// Outcomes classified as high opportunity
    pub high_count: usize,
}

/// Per-big-job aggregates for one round, averaged over all of its outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct BigJobSummary {
    pub id: String,
    pub name: String,
    pub outcome_count: usize,
    pub average_opportunity: Option<f64>,
    pub high_count: usize,
    pub little_jobs: Vec<LittleJobSummary>,
}

impl LittleJobSummary {
    pub fn level(&self) -> Option<OpportunityLevel> {
        self.average_opportunity.map(opportunity_level)
    }
}

impl BigJobSummary {
    pub fn level(&self) -> Option<OpportunityLevel> {
        self.average_opportunity.map(opportunity_level)
    }
}

fn average<'a>(outcomes: impl Iterator<Item = &'a Outcome>) -> (usize, Option<f64>, usize) {
    let (count, total, high) = outcomes.fold((0usize, 0.0, 0usize), |(n, sum, high), o| {
        let is_high = o.level() == OpportunityLevel::High;
        (n + 1, sum + o.opportunity_score(), high + usize::from(is_high))
    });
    let avg = (count > 0).then(|| total / count as f64);
    (count, avg, high)
}

fn summarize_little_job(lj: &LittleJob) -> LittleJobSummary {
    let (outcome_count, average_opportunity, high_count) = average(lj.outcomes.iter());
    LittleJobSummary {
        id: lj.id.clone(),
        name: lj.name.clone(),
        outcome_count,
        average_opportunity,
        high_count,
    }
}

fn summarize_big_job(bj: &BigJob) -> BigJobSummary {
    let (outcome_count, average_opportunity, high_count) =
        average(bj.little_jobs.iter().flat_map(|lj| lj.outcomes.iter()));
    BigJobSummary {
        id: bj.id.clone(),
        name: bj.name.clone(),
        outcome_count,
        average_opportunity,
        high_count,
        little_jobs: bj.little_jobs.iter().map(summarize_little_job).collect(),
    }
}

/// Outcome count, average opportunity and high-opportunity count for every
/// job of a round, in catalog order.
pub fn job_summaries(round: &ResearchRound) -> Vec<BigJobSummary> {
    round.data.big_jobs.iter().map(summarize_big_job).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{find_round, JtbdData};
    use chrono::NaiveDate;

    fn outcome(id: &str, importance: f64, satisfaction: f64) -> Outcome {
        Outcome {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            importance,
            satisfaction,
        }
    }

    fn little_job(id: &str, outcomes: Vec<Outcome>) -> LittleJob {
        LittleJob {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            outcomes,
        }
    }

    fn round_with(big_jobs: Vec<BigJob>) -> ResearchRound {
        ResearchRound {
            id: "test".to_string(),
            name: "Test".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: String::new(),
            data: JtbdData { big_jobs },
        }
    }

    #[test]
    fn test_averages_and_high_count() {
        let round = round_with(vec![BigJob {
            id: "b".to_string(),
            name: "b".to_string(),
            description: String::new(),
            little_jobs: vec![
                // 13.0 high, 9.0 medium
                little_job("l1", vec![outcome("o1", 9.0, 5.0), outcome("o2", 7.0, 5.0)]),
                // 12.0 high
                little_job("l2", vec![outcome("o3", 8.0, 4.0)]),
            ],
        }]);

        let summaries = job_summaries(&round);
        let bj = &summaries[0];
        assert_eq!(bj.outcome_count, 3);
        assert_eq!(bj.high_count, 2);
        assert!((bj.average_opportunity.unwrap() - 34.0 / 3.0).abs() < 1e-9);
        assert_eq!(bj.level(), Some(OpportunityLevel::Medium));

        assert_eq!(bj.little_jobs[0].average_opportunity, Some(11.0));
        assert_eq!(bj.little_jobs[0].high_count, 1);
        assert_eq!(bj.little_jobs[1].level(), Some(OpportunityLevel::High));
    }

    #[test]
    fn test_jobs_without_outcomes_have_no_average() {
        let round = round_with(vec![
            BigJob {
                id: "empty".to_string(),
                name: "empty".to_string(),
                description: String::new(),
                little_jobs: vec![],
            },
            BigJob {
                id: "partial".to_string(),
                name: "partial".to_string(),
                description: String::new(),
                little_jobs: vec![
                    little_job("none", vec![]),
                    little_job("some", vec![outcome("o", 9.0, 6.0)]),
                ],
            },
        ]);

        let summaries = job_summaries(&round);
        assert_eq!(summaries[0].outcome_count, 0);
        assert_eq!(summaries[0].average_opportunity, None);
        assert_eq!(summaries[0].level(), None);
        assert!(summaries[0].little_jobs.is_empty());

        let partial = &summaries[1];
        assert_eq!(partial.little_jobs[0].average_opportunity, None);
        assert_eq!(partial.little_jobs[0].high_count, 0);
        // the empty little job does not drag the big job average down
        assert_eq!(partial.average_opportunity, Some(12.0));
    }

    #[test]
    fn test_catalog_round() {
        let round = find_round("2024-2").unwrap();
        let summaries = job_summaries(round);
        assert_eq!(summaries.len(), 6);
        assert_eq!(
            summaries.iter().map(|s| s.outcome_count).sum::<usize>(),
            round.data.outcome_count()
        );

        let multicanal = &summaries[0];
        assert_eq!(multicanal.id, "multicanal");
        assert_eq!(multicanal.outcome_count, 5);
        let direct: f64 = round.data.big_jobs[0]
            .little_jobs
            .iter()
            .flat_map(|lj| lj.outcomes.iter())
            .map(Outcome::opportunity_score)
            .sum::<f64>()
            / 5.0;
        assert!((multicanal.average_opportunity.unwrap() - direct).abs() < 1e-9);
        // visibilidade-busca scores 16.0 in this round
        assert!(multicanal.little_jobs[0].high_count >= 1);
    }
}
