//! Batches of store operations read from YAML or JSON.
//!
//! ```yaml
//! - op: create_little_job
//!   big_job: multicanal
//!   data: { name: "Responder perguntas de compradores" }
//! - op: archive
//!   kind: outcome
//!   id: evitar-ruptura
//!   big_job: multicanal
//!   little_job: controlar-estoque
//! - op: delete_big_job
//!   id: aumentar-vendas
//! ```

use serde::Deserialize;

use super::store::HierarchyStore;
use super::types::{
    BigJobUpdate, EntityKind, EntityPath, LittleJobUpdate, NewBigJob, NewLittleJob, NewOutcome,
    OutcomeUpdate,
};
use super::AdminError;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Operation {
    CreateBigJob {
        data: NewBigJob,
    },
    CreateLittleJob {
        big_job: String,
        data: NewLittleJob,
    },
    CreateOutcome {
        big_job: String,
        little_job: String,
        data: NewOutcome,
    },
    UpdateBigJob {
        id: String,
        data: BigJobUpdate,
    },
    UpdateLittleJob {
        big_job: String,
        id: String,
        data: LittleJobUpdate,
    },
    UpdateOutcome {
        big_job: String,
        little_job: String,
        id: String,
        data: OutcomeUpdate,
    },
    DeleteBigJob {
        id: String,
    },
    DeleteLittleJob {
        big_job: String,
        id: String,
    },
    DeleteOutcome {
        big_job: String,
        little_job: String,
        id: String,
    },
    Archive {
        kind: EntityKind,
        id: String,
        #[serde(default)]
        big_job: Option<String>,
        #[serde(default)]
        little_job: Option<String>,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateBigJob { .. } => "create_big_job",
            Operation::CreateLittleJob { .. } => "create_little_job",
            Operation::CreateOutcome { .. } => "create_outcome",
            Operation::UpdateBigJob { .. } => "update_big_job",
            Operation::UpdateLittleJob { .. } => "update_little_job",
            Operation::UpdateOutcome { .. } => "update_outcome",
            Operation::DeleteBigJob { .. } => "delete_big_job",
            Operation::DeleteLittleJob { .. } => "delete_little_job",
            Operation::DeleteOutcome { .. } => "delete_outcome",
            Operation::Archive { .. } => "archive",
        }
    }

    /// Run against the store. Each operation is all-or-nothing.
    pub fn apply(self, store: &mut HierarchyStore) -> Result<(), AdminError> {
        match self {
            Operation::CreateBigJob { data } => store.create_big_job(data).map(drop),
            Operation::CreateLittleJob { big_job, data } => {
                store.create_little_job(&big_job, data).map(drop)
            }
            Operation::CreateOutcome {
                big_job,
                little_job,
                data,
            } => store.create_outcome(&big_job, &little_job, data).map(drop),
            Operation::UpdateBigJob { id, data } => store.update_big_job(&id, data),
            Operation::UpdateLittleJob { big_job, id, data } => {
                store.update_little_job(&big_job, &id, data)
            }
            Operation::UpdateOutcome {
                big_job,
                little_job,
                id,
                data,
            } => store.update_outcome(&big_job, &little_job, &id, data),
            Operation::DeleteBigJob { id } => store.delete_big_job(&id).map(drop),
            Operation::DeleteLittleJob { big_job, id } => {
                store.delete_little_job(&big_job, &id).map(drop)
            }
            Operation::DeleteOutcome {
                big_job,
                little_job,
                id,
            } => store.delete_outcome(&big_job, &little_job, &id).map(drop),
            Operation::Archive {
                kind,
                id,
                big_job,
                little_job,
            } => {
                let path = match (kind, big_job.as_deref(), little_job.as_deref()) {
                    (EntityKind::BigJob, _, _) => EntityPath::BigJob { id: &id },
                    (EntityKind::LittleJob, Some(big_job_id), _) => EntityPath::LittleJob {
                        big_job_id,
                        id: &id,
                    },
                    (EntityKind::Outcome, Some(big_job_id), Some(little_job_id)) => {
                        EntityPath::Outcome {
                            big_job_id,
                            little_job_id,
                            id: &id,
                        }
                    }
                    (kind, _, _) => return Err(AdminError::IncompletePath(kind)),
                };
                store.archive_entity(path)
            }
        }
    }
}

/// Outcome of running a batch
#[derive(Debug, Default)]
pub struct ScriptReport {
    pub applied: usize,
    /// (position in the batch, operation name, error)
    pub failures: Vec<(usize, &'static str, AdminError)>,
}

/// Apply every operation in order. A failed operation is reported and skipped.
pub fn apply_script(store: &mut HierarchyStore, operations: Vec<Operation>) -> ScriptReport {
    let mut report = ScriptReport::default();
    for (index, op) in operations.into_iter().enumerate() {
        let name = op.name();
        match op.apply(store) {
            Ok(()) => report.applied += 1,
            Err(e) => {
                tracing::warn!(index, op = name, error = %e, "operation failed");
                report.failures.push((index, name, e));
            }
        }
    }
    report
}

/// Parse a batch from YAML (JSON is valid YAML too)
pub fn parse_script(content: &str) -> anyhow::Result<Vec<Operation>> {
    Ok(serde_saphyr::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::EntityStatus;

    fn store() -> HierarchyStore {
        HierarchyStore::from_catalog().unwrap()
    }

    #[test]
    fn test_parse_and_apply() {
        let yaml = r#"
- op: create_little_job
  big_job: multicanal
  data:
    name: "Responder perguntas"
- op: update_outcome
  big_job: multicanal
  little_job: controlar-estoque
  id: evitar-ruptura
  data:
    tags: [estoque, critico]
- op: archive
  kind: bigJob
  id: aumentar-vendas
- op: delete_outcome
  big_job: multicanal
  little_job: preparar-listagem
  id: taxa-aprovacao
"#;
        let ops = parse_script(yaml).unwrap();
        assert_eq!(ops.len(), 4);

        let mut s = store();
        let report = apply_script(&mut s, ops);
        assert_eq!(report.applied, 4);
        assert!(report.failures.is_empty());

        assert!(s.contains_id("little-responder-perguntas"));
        assert!(!s.contains_id("taxa-aprovacao"));
        assert_eq!(
            s.big_job("aumentar-vendas").unwrap().status,
            EntityStatus::Archived
        );
        let o = s
            .outcome("multicanal", "controlar-estoque", "evitar-ruptura")
            .unwrap();
        assert_eq!(o.tags.len(), 2);
        assert_eq!(s.audit_log().len(), 4);
    }

    #[test]
    fn test_failures_are_reported_and_skipped() {
        let ops = vec![
            Operation::DeleteBigJob {
                id: "nope".to_string(),
            },
            Operation::CreateBigJob {
                data: NewBigJob {
                    name: "Novo big job".to_string(),
                    ..Default::default()
                },
            },
            Operation::Archive {
                kind: EntityKind::Outcome,
                id: "nps".to_string(),
                big_job: Some("pos-venda-reputacao".to_string()),
                little_job: None,
            },
        ];

        let mut s = store();
        let report = apply_script(&mut s, ops);
        assert_eq!(report.applied, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].0, 0);
        assert!(matches!(report.failures[1].2, AdminError::IncompletePath(EntityKind::Outcome)));
        assert!(s.contains_id("big-novo-big-job"));
    }

    #[test]
    fn test_update_data_rejects_id_field() {
        let yaml = r#"
- op: update_big_job
  id: multicanal
  data:
    id: renamed
"#;
        assert!(parse_script(yaml).is_err());
    }

    #[test]
    fn test_misspelled_parent_key_rejected() {
        let yaml = r#"
- op: archive
  kind: outcome
  id: evitar-ruptura
  big_job: multicanal
  litle_job: controlar-estoque
"#;
        assert!(parse_script(yaml).is_err());
    }

    #[test]
    fn test_unknown_op_rejected() {
        assert!(parse_script("- op: rename\n  id: x\n").is_err());
    }
}
