//! Audit recorder service.
//!
//! Wraps the append-only history store with the two error contracts the
//! workflow needs: `record` propagates failures (the entry IS the business
//! action), `record_best_effort` swallows them and reports through tracing
//! so a logging fault never aborts a committed transition.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Actor, WorkflowAction, WorkflowHistoryEntry, REPAIR_REQUEST_KIND};
use crate::domain::ports::{AuditLogRepository, HistoryFilter};

pub struct AuditRecorder<A: AuditLogRepository> {
    repo: Arc<A>,
}

impl<A: AuditLogRepository> AuditRecorder<A> {
    pub fn new(repo: Arc<A>) -> Self {
        Self { repo }
    }

    /// Append an entry; failures propagate to the caller.
    pub async fn record(&self, entry: &WorkflowHistoryEntry) -> DomainResult<()> {
        self.repo.append(entry).await
    }

    /// Append a manual audit note for an entity.
    pub async fn record_note(
        &self,
        entity_kind: &str,
        entity_id: Uuid,
        actor: &Actor,
        comment: impl Into<String>,
    ) -> DomainResult<WorkflowHistoryEntry> {
        let entry = WorkflowHistoryEntry::record(entity_kind, entity_id, WorkflowAction::Note, actor)
            .with_comment(comment);
        self.repo.append(&entry).await?;
        Ok(entry)
    }

    /// Append an entry without failing the caller. Storage errors are
    /// reported via tracing only.
    pub async fn record_best_effort(&self, entry: &WorkflowHistoryEntry) {
        if let Err(err) = self.repo.append(entry).await {
            tracing::warn!(
                entity_kind = %entry.entity_kind,
                entity_id = %entry.entity_id,
                action = entry.action.as_str(),
                error = %err,
                "failed to append audit entry"
            );
        }
    }

    /// Full history of one repair request, oldest first.
    pub async fn history_for(&self, request_id: Uuid) -> DomainResult<Vec<WorkflowHistoryEntry>> {
        self.repo.list_for_entity(REPAIR_REQUEST_KIND, request_id).await
    }

    /// Query entries across entities.
    pub async fn query(&self, filter: HistoryFilter) -> DomainResult<Vec<WorkflowHistoryEntry>> {
        self.repo.query(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteAuditLogRepository};
    use crate::domain::models::ActorRole;

    async fn setup_recorder() -> (AuditRecorder<SqliteAuditLogRepository>, sqlx::SqlitePool) {
        let pool = create_migrated_test_pool().await.unwrap();
        (
            AuditRecorder::new(Arc::new(SqliteAuditLogRepository::new(pool.clone()))),
            pool,
        )
    }

    #[tokio::test]
    async fn test_record_note_and_history() {
        let (recorder, _pool) = setup_recorder().await;
        let actor = Actor::new(Uuid::new_v4(), Uuid::new_v4(), ActorRole::Coordinator);
        let request_id = Uuid::new_v4();

        recorder
            .record_note(REPAIR_REQUEST_KIND, request_id, &actor, "reviewed on site")
            .await
            .unwrap();

        let history = recorder.history_for(request_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, WorkflowAction::Note);
        assert_eq!(history[0].comment.as_deref(), Some("reviewed on site"));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_storage_failure() {
        let (recorder, pool) = setup_recorder().await;
        let actor = Actor::new(Uuid::new_v4(), Uuid::new_v4(), ActorRole::Executor);
        let entry = WorkflowHistoryEntry::record(
            REPAIR_REQUEST_KIND,
            Uuid::new_v4(),
            WorkflowAction::Note,
            &actor,
        );

        // Break the store; the best-effort path must not propagate the error.
        sqlx::query("DROP TABLE workflow_history")
            .execute(&pool)
            .await
            .unwrap();
        recorder.record_best_effort(&entry).await;

        // The propagating path surfaces the same failure.
        assert!(recorder.record(&entry).await.is_err());
    }
}
