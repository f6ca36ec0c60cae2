use std::collections::HashMap;
use std::str::FromStr;

use anyhow::bail;
use chrono::NaiveDate;

use super::round::desc;
use crate::dataset::ResearchRound;
use crate::scoring::{opportunity_level, OpportunityLevel};

/// Ratings of one outcome in one round
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub round_id: String,
    pub round_name: String,
    pub date: NaiveDate,
    pub opportunity: f64,
    pub importance: f64,
    pub satisfaction: f64,
}

/// An outcome tracked across rounds, series ordered by round date.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeEvolution {
    pub id: String,
    pub name: String,
    pub big_job_id: String,
    pub big_job_name: String,
    pub little_job_id: String,
    pub little_job_name: String,
    pub series: Vec<SeriesPoint>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

impl OutcomeEvolution {
    pub fn average_opportunity(&self) -> f64 {
        mean(self.series.iter().map(|p| p.opportunity))
    }

    pub fn average_importance(&self) -> f64 {
        mean(self.series.iter().map(|p| p.importance))
    }

    pub fn average_satisfaction(&self) -> f64 {
        mean(self.series.iter().map(|p| p.satisfaction))
    }

    /// Last minus first opportunity; 0 with fewer than two points
    pub fn change(&self) -> f64 {
        match (self.series.first(), self.series.last()) {
            (Some(first), Some(last)) if self.series.len() > 1 => last.opportunity - first.opportunity,
            _ => 0.0,
        }
    }

    /// Opportunity in the most recent round
    pub fn current_opportunity(&self) -> f64 {
        self.series.last().map(|p| p.opportunity).unwrap_or(0.0)
    }

    pub fn level(&self) -> OpportunityLevel {
        opportunity_level(self.average_opportunity())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvolutionSort {
    OpportunityAvg,
    #[default]
    OpportunityChange,
    ImportanceAvg,
    SatisfactionAvg,
}

impl FromStr for EvolutionSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "opportunity_avg" | "opportunity" => Ok(EvolutionSort::OpportunityAvg),
            "opportunity_change" | "change" => Ok(EvolutionSort::OpportunityChange),
            "importance_avg" | "importance" => Ok(EvolutionSort::ImportanceAvg),
            "satisfaction_avg" | "satisfaction" => Ok(EvolutionSort::SatisfactionAvg),
            other => bail!(
                "Unknown sort '{}' (expected opportunity_avg, opportunity_change, importance_avg or satisfaction_avg)",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvolutionQuery {
    /// Round ids to include; `None` means every round
    pub rounds: Option<Vec<String>>,
    pub search: Option<String>,
    pub big_job_id: Option<String>,
    pub little_job_id: Option<String>,
    /// Matched against the level of the average opportunity
    pub level: Option<OpportunityLevel>,
    pub sort: EvolutionSort,
}

/// Build one series per (big job, little job, outcome) over the selected rounds.
pub fn build_evolution(rounds: &[ResearchRound], selected: Option<&[String]>) -> Vec<OutcomeEvolution> {
    let mut ordered: Vec<&ResearchRound> = rounds
        .iter()
        .filter(|r| selected.map_or(true, |ids| ids.iter().any(|id| *id == r.id)))
        .collect();
    ordered.sort_by_key(|r| r.date);

    let mut evolutions: Vec<OutcomeEvolution> = Vec::new();
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();

    for round in ordered {
        for bj in &round.data.big_jobs {
            for lj in &bj.little_jobs {
                for o in &lj.outcomes {
                    let key = (bj.id.clone(), lj.id.clone(), o.id.clone());
                    let slot = *index.entry(key).or_insert_with(|| {
                        evolutions.push(OutcomeEvolution {
                            id: o.id.clone(),
                            name: o.name.clone(),
                            big_job_id: bj.id.clone(),
                            big_job_name: bj.name.clone(),
                            little_job_id: lj.id.clone(),
                            little_job_name: lj.name.clone(),
                            series: Vec::new(),
                        });
                        evolutions.len() - 1
                    });
                    evolutions[slot].series.push(SeriesPoint {
                        round_id: round.id.clone(),
                        round_name: round.name.clone(),
                        date: round.date,
                        opportunity: o.opportunity_score(),
                        importance: o.importance,
                        satisfaction: o.satisfaction,
                    });
                }
            }
        }
    }

    evolutions
}

/// Cross-round view: build, filter, then sort (stable, descending).
pub fn evolution(rounds: &[ResearchRound], query: &EvolutionQuery) -> Vec<OutcomeEvolution> {
    let term = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut result: Vec<OutcomeEvolution> = build_evolution(rounds, query.rounds.as_deref())
        .into_iter()
        .filter(|e| {
            term.as_deref().map_or(true, |t| {
                e.name.to_lowercase().contains(t)
                    || e.big_job_name.to_lowercase().contains(t)
                    || e.little_job_name.to_lowercase().contains(t)
            })
        })
        .filter(|e| query.big_job_id.as_deref().map_or(true, |id| e.big_job_id == id))
        .filter(|e| query.little_job_id.as_deref().map_or(true, |id| e.little_job_id == id))
        .filter(|e| query.level.map_or(true, |level| e.level() == level))
        .collect();

    result.sort_by(|a, b| match query.sort {
        EvolutionSort::OpportunityAvg => desc(a.average_opportunity(), b.average_opportunity()),
        EvolutionSort::OpportunityChange => desc(a.change().abs(), b.change().abs()),
        EvolutionSort::ImportanceAvg => desc(a.average_importance(), b.average_importance()),
        EvolutionSort::SatisfactionAvg => desc(a.average_satisfaction(), b.average_satisfaction()),
    });
    result
}

#[derive(Debug, Clone, PartialEq)]
pub struct SparkPoint {
    pub label: String,
    pub score: f64,
}

/// Opportunity of one outcome per round, in catalog order.
///
/// Rounds where the outcome is missing or scores zero or less are skipped.
pub fn sparkline(rounds: &[ResearchRound], outcome_id: &str) -> Vec<SparkPoint> {
    rounds
        .iter()
        .filter_map(|round| {
            let score = round.data.find_outcome(outcome_id)?.opportunity_score();
            let label = round
                .name
                .split_whitespace()
                .nth(1)
                .unwrap_or(round.id.as_str())
                .to_string();
            Some(SparkPoint { label, score })
        })
        .filter(|p| p.score > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::research_rounds;

    fn find<'a>(evolutions: &'a [OutcomeEvolution], id: &str) -> &'a OutcomeEvolution {
        evolutions.iter().find(|e| e.id == id).unwrap()
    }

    #[test]
    fn test_one_series_per_outcome() {
        let evolutions = build_evolution(research_rounds(), None);
        assert_eq!(evolutions.len(), 23);
        for e in &evolutions {
            assert_eq!(e.series.len(), 7);
            for pair in e.series.windows(2) {
                assert!(pair[0].date < pair[1].date);
            }
        }
    }

    #[test]
    fn test_change_is_last_minus_first() {
        let evolutions = build_evolution(research_rounds(), None);
        let e = find(&evolutions, "tempo-atributos");
        // 2024-1: 9.2 + (9.2 - 9.9) = 8.5; 2027-1: 9.0 + (9.0 - 6.0) = 12.0
        assert!((e.series[0].opportunity - 8.5).abs() < 1e-9);
        assert!((e.current_opportunity() - 12.0).abs() < 1e-9);
        assert!((e.change() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_has_no_change() {
        let selected = vec!["2025-1".to_string()];
        let evolutions = build_evolution(research_rounds(), Some(selected.as_slice()));
        assert!(evolutions.iter().all(|e| e.series.len() == 1));
        assert!(evolutions.iter().all(|e| e.change() == 0.0));
    }

    #[test]
    fn test_averages() {
        let selected = vec!["2024-1".to_string(), "2024-2".to_string()];
        let evolutions = build_evolution(research_rounds(), Some(selected.as_slice()));
        let e = find(&evolutions, "evitar-ruptura");
        // (9.1 + 9.3) / 2, (5.2 + 5.8) / 2
        assert!((e.average_importance() - 9.2).abs() < 1e-9);
        assert!((e.average_satisfaction() - 5.5).abs() < 1e-9);
        // (13.0 + 12.8) / 2
        assert!((e.average_opportunity() - 12.9).abs() < 1e-9);
    }

    #[test]
    fn test_default_sort_is_absolute_change() {
        let result = evolution(research_rounds(), &EvolutionQuery::default());
        assert_eq!(result.len(), 23);
        for pair in result.windows(2) {
            assert!(pair[0].change().abs() >= pair[1].change().abs());
        }
    }

    #[test]
    fn test_sort_by_average_importance() {
        let query = EvolutionQuery {
            sort: EvolutionSort::ImportanceAvg,
            ..Default::default()
        };
        let result = evolution(research_rounds(), &query);
        for pair in result.windows(2) {
            assert!(pair[0].average_importance() >= pair[1].average_importance());
        }
    }

    #[test]
    fn test_search_matches_ancestor_names() {
        let query = EvolutionQuery {
            search: Some("LOGÍSTICA".to_string()),
            ..Default::default()
        };
        let result = evolution(research_rounds(), &query);
        // big job "Otimizar logística e fulfillment" (4 outcomes), plus outcome "Reduzir ocorrências logísticas"
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|e| e.big_job_id == "logistica-fulfillment"));
    }

    #[test]
    fn test_whitespace_search_keeps_everything() {
        let query = EvolutionQuery {
            search: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(evolution(research_rounds(), &query).len(), 23);
    }

    #[test]
    fn test_filters_by_job_and_level() {
        let query = EvolutionQuery {
            big_job_id: Some("financeiro-repasses".to_string()),
            little_job_id: Some("conciliacao".to_string()),
            ..Default::default()
        };
        let result = evolution(research_rounds(), &query);
        assert_eq!(result.len(), 2);

        let query = EvolutionQuery {
            level: Some(OpportunityLevel::High),
            ..Default::default()
        };
        let result = evolution(research_rounds(), &query);
        assert!(result.iter().all(|e| e.average_opportunity() >= 12.0));
        assert!(result.iter().any(|e| e.id == "visibilidade-busca"));
    }

    #[test]
    fn test_sparkline_labels_and_scores() {
        let points = sparkline(research_rounds(), "evitar-ruptura");
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].label, "Jan/2024");
        assert!((points[0].score - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_sparkline_unknown_outcome() {
        assert!(sparkline(research_rounds(), "nope").is_empty());
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(
            "opportunity-change".parse::<EvolutionSort>().unwrap(),
            EvolutionSort::OpportunityChange
        );
        assert_eq!(
            "satisfaction".parse::<EvolutionSort>().unwrap(),
            EvolutionSort::SatisfactionAvg
        );
        assert!("random".parse::<EvolutionSort>().is_err());
    }
}
