use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::dataset::ResearchRound;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    #[default]
    Active,
    Archived,
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityStatus::Active => f.write_str("active"),
            EntityStatus::Archived => f.write_str("archived"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    BigJob,
    LittleJob,
    Outcome,
}

impl EntityKind {
    /// Prefix used for generated ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::BigJob => "big",
            EntityKind::LittleJob => "little",
            EntityKind::Outcome => "outcome",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::BigJob => f.write_str("big job"),
            EntityKind::LittleJob => f.write_str("little job"),
            EntityKind::Outcome => f.write_str("outcome"),
        }
    }
}

/// The editable JTBD tree in its exported (nested) shape.
///
/// This is also the import schema: every entity needs `id`, `name`,
/// `status` and `orderIndex`; unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Hierarchy {
    pub big_jobs: Vec<AdminBigJob>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminBigJob {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: EntityStatus,
    pub order_index: usize,
    pub little_jobs: Vec<AdminLittleJob>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminLittleJob {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: EntityStatus,
    pub order_index: usize,
    pub outcomes: Vec<AdminOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminOutcome {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: EntityStatus,
    pub order_index: usize,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Entity counts for a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HierarchyStats {
    pub big_jobs: usize,
    pub little_jobs: usize,
    pub outcomes: usize,
    pub archived: usize,
}

impl Hierarchy {
    /// Admin copy of a research round: everything active, ordered as in the round.
    pub fn from_round(round: &ResearchRound) -> Self {
        let big_jobs = round
            .data
            .big_jobs
            .iter()
            .enumerate()
            .map(|(big_index, bj)| AdminBigJob {
                id: bj.id.clone(),
                name: bj.name.clone(),
                description: bj.description.clone(),
                status: EntityStatus::Active,
                order_index: big_index,
                little_jobs: bj
                    .little_jobs
                    .iter()
                    .enumerate()
                    .map(|(little_index, lj)| AdminLittleJob {
                        id: lj.id.clone(),
                        name: lj.name.clone(),
                        description: lj.description.clone(),
                        status: EntityStatus::Active,
                        order_index: little_index,
                        outcomes: lj
                            .outcomes
                            .iter()
                            .enumerate()
                            .map(|(outcome_index, o)| AdminOutcome {
                                id: o.id.clone(),
                                name: o.name.clone(),
                                description: o.description.clone(),
                                status: EntityStatus::Active,
                                order_index: outcome_index,
                                tags: BTreeSet::new(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Hierarchy { big_jobs }
    }

    pub fn stats(&self) -> HierarchyStats {
        let mut stats = HierarchyStats::default();
        for bj in &self.big_jobs {
            stats.big_jobs += 1;
            if bj.status == EntityStatus::Archived {
                stats.archived += 1;
            }
            for lj in &bj.little_jobs {
                stats.little_jobs += 1;
                if lj.status == EntityStatus::Archived {
                    stats.archived += 1;
                }
                for o in &lj.outcomes {
                    stats.outcomes += 1;
                    if o.status == EntityStatus::Archived {
                        stats.archived += 1;
                    }
                }
            }
        }
        stats
    }

    /// Every id in the tree, big jobs first within each branch
    pub fn all_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for bj in &self.big_jobs {
            ids.push(bj.id.as_str());
            for lj in &bj.little_jobs {
                ids.push(lj.id.as_str());
                ids.extend(lj.outcomes.iter().map(|o| o.id.as_str()));
            }
        }
        ids
    }
}

/// Input for a new big job. A missing or empty id is generated from the name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBigJob {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewLittleJob {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewOutcome {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Editable fields of a big job. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BigJobUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LittleJobUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutcomeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
}

/// Address of an entity: its own id plus the ids of its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPath<'a> {
    BigJob {
        id: &'a str,
    },
    LittleJob {
        big_job_id: &'a str,
        id: &'a str,
    },
    Outcome {
        big_job_id: &'a str,
        little_job_id: &'a str,
        id: &'a str,
    },
}

impl EntityPath<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityPath::BigJob { .. } => EntityKind::BigJob,
            EntityPath::LittleJob { .. } => EntityKind::LittleJob,
            EntityPath::Outcome { .. } => EntityKind::Outcome,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityPath::BigJob { id }
            | EntityPath::LittleJob { id, .. }
            | EntityPath::Outcome { id, .. } => id,
        }
    }
}

/// Which big jobs a filtered view keeps by status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    #[default]
    Active,
    Archived,
}

impl StatusFilter {
    pub fn accepts(&self, status: EntityStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == EntityStatus::Active,
            StatusFilter::Archived => status == EntityStatus::Archived,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "archived" => Ok(StatusFilter::Archived),
            other => bail!("Unknown status filter '{}' (expected all, active or archived)", other),
        }
    }
}
