use std::collections::HashSet;

use super::types::Hierarchy;
use super::validation::validate_fields;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid hierarchy: {}", .0.join("; "))]
    Schema(Vec<String>),
}

pub fn to_json(hierarchy: &Hierarchy) -> serde_json::Result<String> {
    serde_json::to_string_pretty(hierarchy)
}

/// Parse and validate a hierarchy document without touching any store.
pub fn parse_hierarchy(json: &str) -> Result<Hierarchy, ImportError> {
    let hierarchy: Hierarchy = serde_json::from_str(json)?;
    validate_hierarchy(&hierarchy).map_err(ImportError::Schema)?;
    Ok(hierarchy)
}

fn check_entity<'a>(
    errors: &mut Vec<String>,
    seen: &mut HashSet<&'a str>,
    path: &str,
    id: &'a str,
    name: &str,
    description: &str,
) {
    if id.trim().is_empty() {
        errors.push(format!("{}.id: must not be empty", path));
    } else if !seen.insert(id) {
        errors.push(format!("{}.id: duplicate id '{}'", path, id));
    }
    for err in validate_fields(Some(name), Some(description)) {
        errors.push(format!("{}.{}", path, err));
    }
}

/// Check every entity against the field limits and the global id rule.
/// Returns all errors at once, each prefixed with its JSON path.
pub fn validate_hierarchy(hierarchy: &Hierarchy) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (b, bj) in hierarchy.big_jobs.iter().enumerate() {
        let bj_path = format!("bigJobs[{}]", b);
        check_entity(&mut errors, &mut seen, &bj_path, &bj.id, &bj.name, &bj.description);

        for (l, lj) in bj.little_jobs.iter().enumerate() {
            let lj_path = format!("{}.littleJobs[{}]", bj_path, l);
            check_entity(&mut errors, &mut seen, &lj_path, &lj.id, &lj.name, &lj.description);

            for (o, oc) in lj.outcomes.iter().enumerate() {
                let oc_path = format!("{}.outcomes[{}]", lj_path, o);
                check_entity(&mut errors, &mut seen, &oc_path, &oc.id, &oc.name, &oc.description);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
