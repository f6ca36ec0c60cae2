use super::types::{AdminBigJob, AdminLittleJob, AdminOutcome, Hierarchy, StatusFilter};

/// Status and free-text criteria for the admin tree view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyFilter {
    pub status: StatusFilter,
    pub search: String,
}

impl HierarchyFilter {
    pub fn new(status: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            status,
            search: search.into(),
        }
    }
}

fn contains(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

fn little_job_matches(lj: &AdminLittleJob, term: &str) -> bool {
    contains(&lj.name, term) || contains(&lj.description, term) || contains(&lj.id, term)
}

fn outcome_matches(o: &AdminOutcome, term: &str) -> bool {
    contains(&o.name, term)
        || contains(&o.description, term)
        || contains(&o.id, term)
        || o.tags.iter().any(|tag| contains(tag, term))
}

fn big_job_matches(bj: &AdminBigJob, term: &str) -> bool {
    contains(&bj.name, term)
        || contains(&bj.description, term)
        || contains(&bj.id, term)
        || bj.little_jobs.iter().any(|lj| little_job_matches(lj, term))
        || bj
            .little_jobs
            .iter()
            .flat_map(|lj| lj.outcomes.iter())
            .any(|o| outcome_matches(o, term))
}

/// Filtered copy of the big job list.
///
/// The status filter looks at big job status only. A big job survives the
/// search when it or any descendant matches, and is returned whole.
pub fn filter_hierarchy(hierarchy: &Hierarchy, filter: &HierarchyFilter) -> Hierarchy {
    let term = filter.search.trim().to_lowercase();

    let big_jobs = hierarchy
        .big_jobs
        .iter()
        .filter(|bj| filter.status.accepts(bj.status))
        .filter(|bj| term.is_empty() || big_job_matches(bj, &term))
        .cloned()
        .collect();

    Hierarchy { big_jobs }
}
