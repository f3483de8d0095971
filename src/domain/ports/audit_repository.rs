//! Repository port for the append-only workflow history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{WorkflowAction, WorkflowHistoryEntry};

/// Filter for querying history entries.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub entity_kind: Option<String>,
    pub entity_id: Option<Uuid>,
    pub action: Option<WorkflowAction>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Append-only history store. Rows are never updated or deleted.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append one immutable entry.
    async fn append(&self, entry: &WorkflowHistoryEntry) -> DomainResult<()>;

    /// Query entries, newest first.
    async fn query(&self, filter: HistoryFilter) -> DomainResult<Vec<WorkflowHistoryEntry>>;

    /// All entries for one entity, oldest first.
    async fn list_for_entity(
        &self,
        entity_kind: &str,
        entity_id: Uuid,
    ) -> DomainResult<Vec<WorkflowHistoryEntry>>;
}
