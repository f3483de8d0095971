//! Repository port for repair request persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    RepairPriority, RepairRequest, RepairStatus, WorkflowHistoryEntry,
};

/// Filters for querying repair requests.
#[derive(Debug, Clone, Default)]
pub struct RepairFilter {
    pub status: Option<RepairStatus>,
    pub priority: Option<RepairPriority>,
    pub mold_id: Option<Uuid>,
    pub requester_org: Option<Uuid>,
    pub executor_org: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Repository port for repair requests.
///
/// The store provides read-modify-write with isolation; the engine relies on
/// `commit_transition` for the compare-and-swap that keeps two concurrent
/// transitions from both succeeding.
#[async_trait]
pub trait RepairRequestRepository: Send + Sync {
    /// Insert a new request together with its creation history entry,
    /// atomically.
    async fn create(&self, request: &RepairRequest, entry: &WorkflowHistoryEntry)
        -> DomainResult<()>;

    /// Get a request by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<RepairRequest>>;

    /// Persist a transition: the mutated request and its history entry
    /// commit as one transaction, guarded by a compare-and-swap on the
    /// stored `version`. Fails with `Conflict` if the row's version no
    /// longer matches `expected_version`.
    async fn commit_transition(
        &self,
        request: &RepairRequest,
        expected_version: u64,
        entry: &WorkflowHistoryEntry,
    ) -> DomainResult<()>;

    /// List requests matching the filter, newest first.
    async fn list(&self, filter: RepairFilter) -> DomainResult<Vec<RepairRequest>>;

    /// Count requests per status.
    async fn count_by_status(
        &self,
    ) -> DomainResult<std::collections::HashMap<RepairStatus, u64>>;
}
