//! Editable admin copy of the JTBD hierarchy.

pub mod audit;
pub mod filter;
pub mod io;
pub mod script;
pub mod store;
pub mod types;
pub mod validation;

pub use audit::{AuditAction, AuditEntry, AuditLog, AUDIT_LOG_CAPACITY};
pub use filter::{filter_hierarchy, HierarchyFilter};
pub use io::{parse_hierarchy, validate_hierarchy, ImportError};
pub use script::{apply_script, parse_script, Operation, ScriptReport};
pub use store::HierarchyStore;
pub use types::{
    AdminBigJob, AdminLittleJob, AdminOutcome, BigJobUpdate, EntityKind, EntityPath,
    EntityStatus, Hierarchy, HierarchyStats, LittleJobUpdate, NewBigJob, NewLittleJob,
    NewOutcome, OutcomeUpdate, StatusFilter,
};
pub use validation::{generate_id, validate_fields, Field, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{0} path is missing a parent id")]
    IncompletePath(EntityKind),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AdminError {
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        AdminError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Field errors, empty for other variants
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            AdminError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
