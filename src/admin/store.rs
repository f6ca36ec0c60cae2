//! The editable JTBD tree.
//!
//! Entities live in flat maps keyed by id. Children point at their parents
//! by id and parents keep the ordered list of child ids; the nested
//! [`Hierarchy`] is a projection built on demand.

use std::collections::{BTreeSet, HashMap};

use serde_json::{json, Value};

use super::audit::{AuditAction, AuditLog};
use super::filter::{filter_hierarchy, HierarchyFilter};
use super::io::{parse_hierarchy, to_json, ImportError};
use super::types::{
    AdminBigJob, AdminLittleJob, AdminOutcome, BigJobUpdate, EntityKind, EntityPath,
    EntityStatus, Hierarchy, LittleJobUpdate, NewBigJob, NewLittleJob, NewOutcome,
    OutcomeUpdate,
};
use super::validation::{blank_id, duplicate_id, generate_id, validate_fields, ValidationError};
use super::AdminError;
use crate::dataset::{research_rounds, ResearchRound};

#[derive(Debug, Clone)]
struct BigJobNode {
    name: String,
    description: String,
    status: EntityStatus,
    order_index: usize,
    little_job_ids: Vec<String>,
}

#[derive(Debug, Clone)]
struct LittleJobNode {
    big_job_id: String,
    name: String,
    description: String,
    status: EntityStatus,
    order_index: usize,
    outcome_ids: Vec<String>,
}

#[derive(Debug, Clone)]
struct OutcomeNode {
    big_job_id: String,
    little_job_id: String,
    name: String,
    description: String,
    status: EntityStatus,
    order_index: usize,
    tags: BTreeSet<String>,
}

/// In-memory admin copy of the hierarchy, plus its audit trail.
///
/// Every failed operation leaves the tree exactly as it was.
#[derive(Debug, Clone)]
pub struct HierarchyStore {
    big_job_order: Vec<String>,
    big_jobs: HashMap<String, BigJobNode>,
    little_jobs: HashMap<String, LittleJobNode>,
    outcomes: HashMap<String, OutcomeNode>,
    audit: AuditLog,
    unsaved_changes: bool,
    baseline: Hierarchy,
}

impl HierarchyStore {
    /// Store seeded from (and discarding back to) `baseline`.
    pub fn new(baseline: Hierarchy) -> Result<Self, ImportError> {
        super::io::validate_hierarchy(&baseline).map_err(ImportError::Schema)?;
        let mut store = Self {
            big_job_order: Vec::new(),
            big_jobs: HashMap::new(),
            little_jobs: HashMap::new(),
            outcomes: HashMap::new(),
            audit: AuditLog::new(),
            unsaved_changes: false,
            baseline: Hierarchy::default(),
        };
        store.load(&baseline);
        store.baseline = baseline;
        Ok(store)
    }

    pub fn from_round(round: &ResearchRound) -> Result<Self, ImportError> {
        Self::new(Hierarchy::from_round(round))
    }

    /// Store seeded from the first research round
    pub fn from_catalog() -> Result<Self, ImportError> {
        match research_rounds().first() {
            Some(round) => Self::from_round(round),
            None => Self::new(Hierarchy::default()),
        }
    }

    fn load(&mut self, hierarchy: &Hierarchy) {
        self.big_job_order.clear();
        self.big_jobs.clear();
        self.little_jobs.clear();
        self.outcomes.clear();

        for bj in &hierarchy.big_jobs {
            for lj in &bj.little_jobs {
                for o in &lj.outcomes {
                    self.outcomes.insert(
                        o.id.clone(),
                        OutcomeNode {
                            big_job_id: bj.id.clone(),
                            little_job_id: lj.id.clone(),
                            name: o.name.clone(),
                            description: o.description.clone(),
                            status: o.status,
                            order_index: o.order_index,
                            tags: o.tags.clone(),
                        },
                    );
                }
                self.little_jobs.insert(
                    lj.id.clone(),
                    LittleJobNode {
                        big_job_id: bj.id.clone(),
                        name: lj.name.clone(),
                        description: lj.description.clone(),
                        status: lj.status,
                        order_index: lj.order_index,
                        outcome_ids: lj.outcomes.iter().map(|o| o.id.clone()).collect(),
                    },
                );
            }
            self.big_jobs.insert(
                bj.id.clone(),
                BigJobNode {
                    name: bj.name.clone(),
                    description: bj.description.clone(),
                    status: bj.status,
                    order_index: bj.order_index,
                    little_job_ids: bj.little_jobs.iter().map(|lj| lj.id.clone()).collect(),
                },
            );
            self.big_job_order.push(bj.id.clone());
        }
    }

    // ---- queries ----

    /// Unfiltered nested view of the tree
    pub fn hierarchy(&self) -> Hierarchy {
        let big_jobs = self
            .big_job_order
            .iter()
            .filter_map(|id| self.project_big_job(id))
            .collect();
        Hierarchy { big_jobs }
    }

    pub fn filtered(&self, filter: &HierarchyFilter) -> Hierarchy {
        filter_hierarchy(&self.hierarchy(), filter)
    }

    fn project_big_job(&self, id: &str) -> Option<AdminBigJob> {
        let node = self.big_jobs.get(id)?;
        Some(AdminBigJob {
            id: id.to_string(),
            name: node.name.clone(),
            description: node.description.clone(),
            status: node.status,
            order_index: node.order_index,
            little_jobs: node
                .little_job_ids
                .iter()
                .filter_map(|lj_id| self.project_little_job(lj_id))
                .collect(),
        })
    }

    fn project_little_job(&self, id: &str) -> Option<AdminLittleJob> {
        let node = self.little_jobs.get(id)?;
        Some(AdminLittleJob {
            id: id.to_string(),
            name: node.name.clone(),
            description: node.description.clone(),
            status: node.status,
            order_index: node.order_index,
            outcomes: node
                .outcome_ids
                .iter()
                .filter_map(|o_id| self.project_outcome(o_id))
                .collect(),
        })
    }

    fn project_outcome(&self, id: &str) -> Option<AdminOutcome> {
        let node = self.outcomes.get(id)?;
        Some(AdminOutcome {
            id: id.to_string(),
            name: node.name.clone(),
            description: node.description.clone(),
            status: node.status,
            order_index: node.order_index,
            tags: node.tags.clone(),
        })
    }

    pub fn big_job(&self, id: &str) -> Option<AdminBigJob> {
        self.project_big_job(id)
    }

    pub fn little_job(&self, big_job_id: &str, id: &str) -> Option<AdminLittleJob> {
        self.little_job_node(big_job_id, id)?;
        self.project_little_job(id)
    }

    pub fn outcome(&self, big_job_id: &str, little_job_id: &str, id: &str) -> Option<AdminOutcome> {
        self.outcome_node(big_job_id, little_job_id, id)?;
        self.project_outcome(id)
    }

    /// Kind of the entity holding `id`, if any
    pub fn kind_of(&self, id: &str) -> Option<EntityKind> {
        if self.big_jobs.contains_key(id) {
            Some(EntityKind::BigJob)
        } else if self.little_jobs.contains_key(id) {
            Some(EntityKind::LittleJob)
        } else if self.outcomes.contains_key(id) {
            Some(EntityKind::Outcome)
        } else {
            None
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.kind_of(id).is_some()
    }

    /// True when no entity other than `exclude` uses `id`.
    pub fn is_id_unique(&self, id: &str, exclude: Option<&str>) -> bool {
        exclude == Some(id) || !self.contains_id(id)
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    fn little_job_node(&self, big_job_id: &str, id: &str) -> Option<&LittleJobNode> {
        self.big_jobs.get(big_job_id)?;
        self.little_jobs
            .get(id)
            .filter(|lj| lj.big_job_id == big_job_id)
    }

    fn outcome_node(&self, big_job_id: &str, little_job_id: &str, id: &str) -> Option<&OutcomeNode> {
        self.little_job_node(big_job_id, little_job_id)?;
        self.outcomes
            .get(id)
            .filter(|o| o.little_job_id == little_job_id && o.big_job_id == big_job_id)
    }

    // ---- validation ----

    /// Field limits plus, when an id is supplied, non-blankness and global uniqueness.
    pub fn validate_entity(
        &self,
        id: Option<&str>,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Vec<ValidationError> {
        let mut errors = validate_fields(name, description);
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            if id.trim().is_empty() {
                errors.push(blank_id());
            } else if !self.is_id_unique(id, None) {
                errors.push(duplicate_id(id));
            }
        }
        errors
    }

    fn check(&self, errors: Vec<ValidationError>, kind: EntityKind) -> Result<(), AdminError> {
        if errors.is_empty() {
            Ok(())
        } else {
            tracing::warn!(
                entity = %kind,
                errors = errors.len(),
                "rejected invalid {}",
                kind
            );
            Err(AdminError::Validation(errors))
        }
    }

    /// The supplied id, or one generated from the name that no entity uses yet.
    fn resolve_id(&self, requested: Option<String>, name: &str, kind: EntityKind) -> String {
        if let Some(id) = requested.filter(|id| !id.is_empty()) {
            return id;
        }
        let base = generate_id(name, kind);
        if self.is_id_unique(&base, None) {
            return base;
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| self.is_id_unique(candidate, None))
            .unwrap_or(base)
    }

    fn record(
        &mut self,
        action: AuditAction,
        kind: EntityKind,
        id: &str,
        name: &str,
        changes: Value,
    ) {
        tracing::debug!(action = action.as_str(), entity = %kind, id, "hierarchy changed");
        self.audit.record(action, kind, id, name, changes);
        self.unsaved_changes = true;
    }

    // ---- create ----

    pub fn create_big_job(&mut self, data: NewBigJob) -> Result<String, AdminError> {
        let errors = self.validate_entity(
            data.id.as_deref(),
            Some(&data.name),
            data.description.as_deref(),
        );
        self.check(errors, EntityKind::BigJob)?;

        let id = self.resolve_id(data.id, &data.name, EntityKind::BigJob);
        let node = BigJobNode {
            name: data.name,
            description: data.description.unwrap_or_default(),
            status: EntityStatus::Active,
            order_index: self.big_job_order.len(),
            little_job_ids: Vec::new(),
        };
        let name = node.name.clone();
        self.big_jobs.insert(id.clone(), node);
        self.big_job_order.push(id.clone());

        self.record(AuditAction::Create, EntityKind::BigJob, &id, &name, json!({}));
        Ok(id)
    }

    pub fn create_little_job(
        &mut self,
        big_job_id: &str,
        data: NewLittleJob,
    ) -> Result<String, AdminError> {
        let errors = self.validate_entity(
            data.id.as_deref(),
            Some(&data.name),
            data.description.as_deref(),
        );
        self.check(errors, EntityKind::LittleJob)?;

        let order_index = self
            .big_jobs
            .get(big_job_id)
            .map(|bj| bj.little_job_ids.len())
            .ok_or_else(|| AdminError::not_found(EntityKind::BigJob, big_job_id))?;

        let id = self.resolve_id(data.id, &data.name, EntityKind::LittleJob);
        let node = LittleJobNode {
            big_job_id: big_job_id.to_string(),
            name: data.name,
            description: data.description.unwrap_or_default(),
            status: EntityStatus::Active,
            order_index,
            outcome_ids: Vec::new(),
        };
        let name = node.name.clone();
        self.little_jobs.insert(id.clone(), node);
        if let Some(parent) = self.big_jobs.get_mut(big_job_id) {
            parent.little_job_ids.push(id.clone());
        }

        self.record(AuditAction::Create, EntityKind::LittleJob, &id, &name, json!({}));
        Ok(id)
    }

    pub fn create_outcome(
        &mut self,
        big_job_id: &str,
        little_job_id: &str,
        data: NewOutcome,
    ) -> Result<String, AdminError> {
        let errors = self.validate_entity(
            data.id.as_deref(),
            Some(&data.name),
            data.description.as_deref(),
        );
        self.check(errors, EntityKind::Outcome)?;

        let order_index = self
            .little_job_node(big_job_id, little_job_id)
            .map(|lj| lj.outcome_ids.len())
            .ok_or_else(|| AdminError::not_found(EntityKind::LittleJob, little_job_id))?;

        let id = self.resolve_id(data.id, &data.name, EntityKind::Outcome);
        let node = OutcomeNode {
            big_job_id: big_job_id.to_string(),
            little_job_id: little_job_id.to_string(),
            name: data.name,
            description: data.description.unwrap_or_default(),
            status: EntityStatus::Active,
            order_index,
            tags: data.tags,
        };
        let name = node.name.clone();
        self.outcomes.insert(id.clone(), node);
        if let Some(parent) = self.little_jobs.get_mut(little_job_id) {
            parent.outcome_ids.push(id.clone());
        }

        self.record(AuditAction::Create, EntityKind::Outcome, &id, &name, json!({}));
        Ok(id)
    }

    // ---- update ----

    pub fn update_big_job(&mut self, id: &str, update: BigJobUpdate) -> Result<(), AdminError> {
        let errors = validate_fields(update.name.as_deref(), update.description.as_deref());
        self.check(errors, EntityKind::BigJob)?;

        let changes = serde_json::to_value(&update)?;
        let node = self
            .big_jobs
            .get_mut(id)
            .ok_or_else(|| AdminError::not_found(EntityKind::BigJob, id))?;
        if let Some(name) = update.name {
            node.name = name;
        }
        if let Some(description) = update.description {
            node.description = description;
        }
        if let Some(status) = update.status {
            node.status = status;
        }
        let name = node.name.clone();

        self.record(AuditAction::Update, EntityKind::BigJob, id, &name, changes);
        Ok(())
    }

    pub fn update_little_job(
        &mut self,
        big_job_id: &str,
        id: &str,
        update: LittleJobUpdate,
    ) -> Result<(), AdminError> {
        let errors = validate_fields(update.name.as_deref(), update.description.as_deref());
        self.check(errors, EntityKind::LittleJob)?;

        if self.little_job_node(big_job_id, id).is_none() {
            return Err(AdminError::not_found(EntityKind::LittleJob, id));
        }
        let changes = serde_json::to_value(&update)?;
        let node = self
            .little_jobs
            .get_mut(id)
            .ok_or_else(|| AdminError::not_found(EntityKind::LittleJob, id))?;
        if let Some(name) = update.name {
            node.name = name;
        }
        if let Some(description) = update.description {
            node.description = description;
        }
        if let Some(status) = update.status {
            node.status = status;
        }
        let name = node.name.clone();

        self.record(AuditAction::Update, EntityKind::LittleJob, id, &name, changes);
        Ok(())
    }

    pub fn update_outcome(
        &mut self,
        big_job_id: &str,
        little_job_id: &str,
        id: &str,
        update: OutcomeUpdate,
    ) -> Result<(), AdminError> {
        let errors = validate_fields(update.name.as_deref(), update.description.as_deref());
        self.check(errors, EntityKind::Outcome)?;

        if self.outcome_node(big_job_id, little_job_id, id).is_none() {
            return Err(AdminError::not_found(EntityKind::Outcome, id));
        }
        let changes = serde_json::to_value(&update)?;
        let node = self
            .outcomes
            .get_mut(id)
            .ok_or_else(|| AdminError::not_found(EntityKind::Outcome, id))?;
        if let Some(name) = update.name {
            node.name = name;
        }
        if let Some(description) = update.description {
            node.description = description;
        }
        if let Some(status) = update.status {
            node.status = status;
        }
        if let Some(tags) = update.tags {
            node.tags = tags;
        }
        let name = node.name.clone();

        self.record(AuditAction::Update, EntityKind::Outcome, id, &name, changes);
        Ok(())
    }

    /// Set `status = archived` on one entity. Children keep their own status.
    pub fn archive_entity(&mut self, path: EntityPath<'_>) -> Result<(), AdminError> {
        let status = Some(EntityStatus::Archived);
        match path {
            EntityPath::BigJob { id } => self.update_big_job(
                id,
                BigJobUpdate {
                    status,
                    ..Default::default()
                },
            ),
            EntityPath::LittleJob { big_job_id, id } => self.update_little_job(
                big_job_id,
                id,
                LittleJobUpdate {
                    status,
                    ..Default::default()
                },
            ),
            EntityPath::Outcome {
                big_job_id,
                little_job_id,
                id,
            } => self.update_outcome(
                big_job_id,
                little_job_id,
                id,
                OutcomeUpdate {
                    status,
                    ..Default::default()
                },
            ),
        }
    }

    // ---- delete ----

    /// Remove a little job and its outcomes from the arena. Returns outcomes removed.
    fn remove_little_job(&mut self, id: &str) -> usize {
        let Some(node) = self.little_jobs.remove(id) else {
            return 0;
        };
        let mut removed = 0;
        for outcome_id in &node.outcome_ids {
            if self.outcomes.remove(outcome_id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Delete a big job and everything under it. Returns the number of outcomes destroyed.
    pub fn delete_big_job(&mut self, id: &str) -> Result<usize, AdminError> {
        let node = self
            .big_jobs
            .remove(id)
            .ok_or_else(|| AdminError::not_found(EntityKind::BigJob, id))?;
        self.big_job_order.retain(|bj_id| bj_id != id);

        let deleted_outcomes: usize = node
            .little_job_ids
            .iter()
            .map(|lj_id| self.remove_little_job(lj_id))
            .sum();

        self.record(
            AuditAction::Delete,
            EntityKind::BigJob,
            id,
            &node.name,
            json!({ "deletedOutcomes": deleted_outcomes }),
        );
        Ok(deleted_outcomes)
    }

    pub fn delete_little_job(&mut self, big_job_id: &str, id: &str) -> Result<usize, AdminError> {
        let name = self
            .little_job_node(big_job_id, id)
            .map(|lj| lj.name.clone())
            .ok_or_else(|| AdminError::not_found(EntityKind::LittleJob, id))?;

        let deleted_outcomes = self.remove_little_job(id);
        if let Some(parent) = self.big_jobs.get_mut(big_job_id) {
            parent.little_job_ids.retain(|lj_id| lj_id != id);
        }

        self.record(
            AuditAction::Delete,
            EntityKind::LittleJob,
            id,
            &name,
            json!({ "deletedOutcomes": deleted_outcomes }),
        );
        Ok(deleted_outcomes)
    }

    pub fn delete_outcome(
        &mut self,
        big_job_id: &str,
        little_job_id: &str,
        id: &str,
    ) -> Result<usize, AdminError> {
        if self.outcome_node(big_job_id, little_job_id, id).is_none() {
            return Err(AdminError::not_found(EntityKind::Outcome, id));
        }
        let node = self
            .outcomes
            .remove(id)
            .ok_or_else(|| AdminError::not_found(EntityKind::Outcome, id))?;
        if let Some(parent) = self.little_jobs.get_mut(little_job_id) {
            parent.outcome_ids.retain(|o_id| o_id != id);
        }

        self.record(AuditAction::Delete, EntityKind::Outcome, id, &node.name, json!({}));
        Ok(1)
    }

    // ---- export / import / session ----

    pub fn export_hierarchy(&self) -> Result<String, AdminError> {
        Ok(to_json(&self.hierarchy())?)
    }

    /// Replace the whole tree with a validated document. On error nothing changes.
    pub fn import_hierarchy(&mut self, json: &str) -> Result<(), ImportError> {
        let hierarchy = match parse_hierarchy(json) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = %e, "import rejected");
                return Err(e);
            }
        };
        self.load(&hierarchy);
        self.unsaved_changes = true;
        tracing::debug!(big_jobs = hierarchy.big_jobs.len(), "hierarchy imported");
        Ok(())
    }

    /// Nothing is persisted; this only clears the pending-changes flag.
    pub fn save_changes(&mut self) {
        self.unsaved_changes = false;
    }

    /// Rebuild the tree from the baseline. The audit log is kept.
    pub fn discard_changes(&mut self) {
        let baseline = self.baseline.clone();
        self.load(&baseline);
        self.unsaved_changes = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{AuditAction, StatusFilter};
    use pretty_assertions::assert_eq;

    fn store() -> HierarchyStore {
        HierarchyStore::from_catalog().unwrap()
    }

    fn new_big(name: &str) -> NewBigJob {
        NewBigJob {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn new_little(name: &str) -> NewLittleJob {
        NewLittleJob {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn new_outcome(name: &str) -> NewOutcome {
        NewOutcome {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_baseline_loaded() {
        let s = store();
        let h = s.hierarchy();
        assert_eq!(h.stats().big_jobs, 6);
        assert_eq!(h.stats().outcomes, 23);
        assert!(!s.has_unsaved_changes());
        assert!(s.audit_log().is_empty());
    }

    #[test]
    fn test_create_big_job_appends_with_generated_id() {
        let mut s = store();
        let id = s.create_big_job(new_big("Expandir Catálogo")).unwrap();
        assert_eq!(id, "big-expandir-catlogo");

        let h = s.hierarchy();
        let last = h.big_jobs.last().unwrap();
        assert_eq!(last.id, id);
        assert_eq!(last.order_index, 6);
        assert_eq!(last.status, EntityStatus::Active);
        assert!(last.little_jobs.is_empty());
        assert!(s.has_unsaved_changes());

        let entry = s.audit_log().latest().unwrap();
        assert_eq!(entry.action, AuditAction::Create);
        assert_eq!(entry.entity_id, id);
        assert_eq!(entry.entity_name, "Expandir Catálogo");
    }

    #[test]
    fn test_create_with_explicit_id() {
        let mut s = store();
        let id = s
            .create_big_job(NewBigJob {
                id: Some("custom".to_string()),
                name: "Custom".to_string(),
                description: Some("desc".to_string()),
            })
            .unwrap();
        assert_eq!(id, "custom");
        assert_eq!(s.big_job("custom").unwrap().description, "desc");
    }

    #[test]
    fn test_duplicate_explicit_id_rejected_without_mutation() {
        let mut s = store();
        let before = s.hierarchy();

        // an outcome id, so the check has to span all three kinds
        let err = s
            .create_little_job(
                "aumentar-vendas",
                NewLittleJob {
                    id: Some("evitar-ruptura".to_string()),
                    name: "Duplicate".to_string(),
                    description: None,
                },
            )
            .unwrap_err();

        match err {
            AdminError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, crate::admin::Field::Id);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(s.hierarchy(), before);
        assert!(s.audit_log().is_empty());
        assert!(!s.has_unsaved_changes());
    }

    #[test]
    fn test_blank_explicit_id_rejected_and_export_stays_importable() {
        let mut s = store();
        let err = s
            .create_big_job(NewBigJob {
                id: Some("   ".to_string()),
                name: "Blank id".to_string(),
                description: None,
            })
            .unwrap_err();
        assert_eq!(err.validation_errors().len(), 1);
        assert_eq!(err.validation_errors()[0].field, crate::admin::Field::Id);
        assert!(!s.contains_id("   "));

        let exported = s.export_hierarchy().unwrap();
        let mut other = store();
        other.import_hierarchy(&exported).unwrap();
        assert_eq!(other.hierarchy(), s.hierarchy());
    }

    #[test]
    fn test_generated_ids_are_disambiguated() {
        let mut s = store();
        let a = s.create_big_job(new_big("Same Name")).unwrap();
        let b = s.create_big_job(new_big("Same Name")).unwrap();
        let c = s.create_big_job(new_big("Same Name")).unwrap();
        assert_eq!(a, "big-same-name");
        assert_eq!(b, "big-same-name-2");
        assert_eq!(c, "big-same-name-3");
    }

    #[test]
    fn test_generated_id_unique_among_existing() {
        let mut s = store();
        let big = s.create_big_job(new_big("Novo")).unwrap();
        let little = s.create_little_job(&big, new_little("Novo")).unwrap();
        for _ in 0..5 {
            let before: Vec<String> =
                s.hierarchy().all_ids().iter().map(|id| id.to_string()).collect();
            let id = s.create_outcome(&big, &little, new_outcome("Novo")).unwrap();
            assert!(!before.contains(&id));
        }
    }

    #[test]
    fn test_create_validation_errors() {
        let mut s = store();
        let err = s
            .create_big_job(NewBigJob {
                id: None,
                name: "x".to_string(),
                description: Some("d".repeat(501)),
            })
            .unwrap_err();
        match err {
            AdminError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_create_little_job_missing_parent() {
        let mut s = store();
        let err = s.create_little_job("nope", new_little("Valid name")).unwrap_err();
        assert!(matches!(err, AdminError::NotFound { kind: EntityKind::BigJob, .. }));
        assert!(s.audit_log().is_empty());
    }

    #[test]
    fn test_create_outcome_order_and_tags() {
        let mut s = store();
        let id = s
            .create_outcome(
                "multicanal",
                "controlar-estoque",
                NewOutcome {
                    id: None,
                    name: "Alertar estoque baixo".to_string(),
                    description: None,
                    tags: BTreeSet::from(["estoque".to_string()]),
                },
            )
            .unwrap();

        let lj = s.little_job("multicanal", "controlar-estoque").unwrap();
        assert_eq!(lj.outcomes.len(), 3);
        let created = lj.outcomes.last().unwrap();
        assert_eq!(created.id, id);
        assert_eq!(created.order_index, 2);
        assert!(created.tags.contains("estoque"));
    }

    #[test]
    fn test_create_outcome_wrong_parent_pair() {
        let mut s = store();
        // controlar-estoque belongs to multicanal, not aumentar-vendas
        let err = s
            .create_outcome("aumentar-vendas", "controlar-estoque", new_outcome("Valid"))
            .unwrap_err();
        assert!(matches!(err, AdminError::NotFound { .. }));
    }

    #[test]
    fn test_update_merges_supplied_fields() {
        let mut s = store();
        let before = s.big_job("multicanal").unwrap();
        s.update_big_job(
            "multicanal",
            BigJobUpdate {
                name: Some("Gerir multicanal".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let after = s.big_job("multicanal").unwrap();
        assert_eq!(after.name, "Gerir multicanal");
        assert_eq!(after.description, before.description);
        assert_eq!(after.order_index, before.order_index);
        assert_eq!(after.little_jobs, before.little_jobs);

        let entry = s.audit_log().latest().unwrap();
        assert_eq!(entry.action, AuditAction::Update);
        assert_eq!(entry.changes, json!({"name": "Gerir multicanal"}));
    }

    #[test]
    fn test_update_validates_only_supplied_fields() {
        let mut s = store();
        assert!(s
            .update_outcome(
                "multicanal",
                "controlar-estoque",
                "evitar-ruptura",
                OutcomeUpdate {
                    tags: Some(BTreeSet::from(["ruptura".to_string()])),
                    ..Default::default()
                },
            )
            .is_ok());

        let err = s
            .update_little_job(
                "multicanal",
                "controlar-estoque",
                LittleJobUpdate {
                    name: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
        assert_eq!(
            s.little_job("multicanal", "controlar-estoque").unwrap().name,
            "Controlar estoque"
        );
    }

    #[test]
    fn test_update_missing_entity() {
        let mut s = store();
        let err = s.update_big_job("nope", BigJobUpdate::default()).unwrap_err();
        assert!(matches!(err, AdminError::NotFound { .. }));

        let err = s
            .update_little_job("nope", "controlar-estoque", LittleJobUpdate::default())
            .unwrap_err();
        assert!(matches!(err, AdminError::NotFound { .. }));
        assert!(s.audit_log().is_empty());
    }

    #[test]
    fn test_delete_big_job_cascades() {
        let mut s = store();
        let before = s.big_job("multicanal").unwrap();
        let descendant_ids: Vec<String> = before
            .little_jobs
            .iter()
            .flat_map(|lj| {
                std::iter::once(lj.id.clone()).chain(lj.outcomes.iter().map(|o| o.id.clone()))
            })
            .collect();

        let deleted = s.delete_big_job("multicanal").unwrap();
        assert_eq!(deleted, 5);

        assert!(!s.contains_id("multicanal"));
        for id in &descendant_ids {
            assert!(!s.contains_id(id), "{id} still present");
        }
        assert!(!s.hierarchy().all_ids().contains(&"evitar-ruptura"));
        assert_eq!(s.hierarchy().big_jobs.len(), 5);

        let entry = s.audit_log().latest().unwrap();
        assert_eq!(entry.action, AuditAction::Delete);
        assert_eq!(entry.entity_name, "Gerir operação multicanal");
        assert_eq!(entry.changes["deletedOutcomes"], 5);
    }

    #[test]
    fn test_deleted_ids_can_be_reused() {
        let mut s = store();
        s.delete_big_job("aumentar-vendas").unwrap();
        assert!(s.is_id_unique("competitividade-preco", None));
    }

    #[test]
    fn test_delete_missing_big_job() {
        let mut s = store();
        assert!(matches!(
            s.delete_big_job("nope"),
            Err(AdminError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_little_job_and_outcome() {
        let mut s = store();
        let removed = s.delete_little_job("multicanal", "preparar-listagem").unwrap();
        assert_eq!(removed, 3);
        assert!(!s.contains_id("tempo-atributos"));
        assert_eq!(s.big_job("multicanal").unwrap().little_jobs.len(), 1);

        s.delete_outcome("multicanal", "controlar-estoque", "evitar-ruptura")
            .unwrap();
        let lj = s.little_job("multicanal", "controlar-estoque").unwrap();
        assert_eq!(lj.outcomes.len(), 1);
        assert_eq!(lj.outcomes[0].id, "sincronizar-multiplos");

        assert!(s
            .delete_outcome("multicanal", "controlar-estoque", "evitar-ruptura")
            .is_err());
    }

    #[test]
    fn test_archive_does_not_cascade() {
        let mut s = store();
        s.archive_entity(EntityPath::Outcome {
            big_job_id: "multicanal",
            little_job_id: "controlar-estoque",
            id: "sincronizar-multiplos",
        })
        .unwrap();
        s.archive_entity(EntityPath::BigJob { id: "multicanal" })
            .unwrap();

        let bj = s.big_job("multicanal").unwrap();
        assert_eq!(bj.status, EntityStatus::Archived);
        for lj in &bj.little_jobs {
            assert_eq!(lj.status, EntityStatus::Active);
        }
        let outcomes = &bj.little_jobs[1].outcomes;
        assert_eq!(outcomes[0].status, EntityStatus::Active);
        assert_eq!(outcomes[1].status, EntityStatus::Archived);
    }

    #[test]
    fn test_archive_little_job_missing_parent() {
        let mut s = store();
        let err = s
            .archive_entity(EntityPath::LittleJob {
                big_job_id: "aumentar-vendas",
                id: "controlar-estoque",
            })
            .unwrap_err();
        assert!(matches!(err, AdminError::NotFound { .. }));
    }

    #[test]
    fn test_filtered_view() {
        let mut s = store();
        s.archive_entity(EntityPath::BigJob { id: "aumentar-vendas" })
            .unwrap();

        let active = s.filtered(&HierarchyFilter::default());
        assert_eq!(active.big_jobs.len(), 5);

        let found = s.filtered(&HierarchyFilter::new(StatusFilter::All, "ruptura"));
        assert!(found.big_jobs.iter().any(|bj| bj.id == "multicanal"));
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut s = store();
        s.create_big_job(new_big("Expandir catálogo")).unwrap();
        s.archive_entity(EntityPath::BigJob { id: "multicanal" })
            .unwrap();
        let exported = s.export_hierarchy().unwrap();
        let snapshot = s.hierarchy();

        let mut other = store();
        other.import_hierarchy(&exported).unwrap();
        assert_eq!(other.hierarchy(), snapshot);
        assert!(other.has_unsaved_changes());
        assert!(other.audit_log().is_empty());
    }

    #[test]
    fn test_import_failure_keeps_state() {
        let mut s = store();
        s.delete_big_job("aumentar-vendas").unwrap();
        let before = s.hierarchy();

        assert!(matches!(
            s.import_hierarchy("{ nope"),
            Err(ImportError::Parse(_))
        ));

        let mut dup = before.clone();
        dup.big_jobs[0].id = dup.big_jobs[1].id.clone();
        let json = serde_json::to_string(&dup).unwrap();
        assert!(matches!(
            s.import_hierarchy(&json),
            Err(ImportError::Schema(_))
        ));

        assert_eq!(s.hierarchy(), before);
    }

    #[test]
    fn test_save_and_discard() {
        let mut s = store();
        let baseline = s.hierarchy();

        s.delete_big_job("multicanal").unwrap();
        assert!(s.has_unsaved_changes());
        s.save_changes();
        assert!(!s.has_unsaved_changes());
        assert_ne!(s.hierarchy(), baseline);

        s.create_big_job(new_big("Outro")).unwrap();
        s.discard_changes();
        assert_eq!(s.hierarchy(), baseline);
        assert!(!s.has_unsaved_changes());
        assert_eq!(s.audit_log().len(), 2);
    }

    #[test]
    fn test_is_id_unique_with_exclude() {
        let s = store();
        assert!(!s.is_id_unique("nps", None));
        assert!(s.is_id_unique("nps", Some("nps")));
        assert!(s.is_id_unique("brand-new", None));
        assert_eq!(s.kind_of("reviews"), Some(EntityKind::LittleJob));
    }

    #[test]
    fn test_new_rejects_invalid_baseline() {
        let mut h = Hierarchy::from_round(&research_rounds()[0]);
        h.big_jobs[1].id = "multicanal".to_string();
        assert!(HierarchyStore::new(h).is_err());
    }
}
