use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::types::EntityKind;

/// Entries kept before the oldest are dropped
pub const AUDIT_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub entity_name: String,
    pub changes: Value,
}

/// Newest-first log of store mutations, bounded at [`AUDIT_LOG_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
    sequence: u64,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        action: AuditAction,
        entity_type: EntityKind,
        entity_id: &str,
        entity_name: &str,
        changes: Value,
    ) -> &AuditEntry {
        let timestamp = Utc::now();
        self.sequence += 1;
        // Millisecond timestamps collide within a burst; the sequence keeps ids unique
        let id = format!("{}-{}", timestamp.timestamp_millis(), self.sequence);

        self.entries.push_front(AuditEntry {
            id,
            timestamp,
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            entity_name: entity_name.to_string(),
            changes,
        });
        self.entries.truncate(AUDIT_LOG_CAPACITY);

        &self.entries[0]
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&AuditEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
