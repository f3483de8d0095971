//! SQLite implementation of the AuditLogRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{WorkflowAction, WorkflowHistoryEntry};
use crate::domain::ports::{AuditLogRepository, HistoryFilter};

#[derive(Clone)]
pub struct SqliteAuditLogRepository {
    pool: SqlitePool,
}

impl SqliteAuditLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for SqliteAuditLogRepository {
    async fn append(&self, entry: &WorkflowHistoryEntry) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO workflow_history
               (id, entity_kind, entity_id, action, actor_id, actor_org,
                previous_value, new_value, comment, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.entity_kind)
        .bind(entry.entity_id.to_string())
        .bind(entry.action.as_str())
        .bind(entry.actor_id.to_string())
        .bind(entry.actor_org.to_string())
        .bind(&entry.previous_value)
        .bind(&entry.new_value)
        .bind(&entry.comment)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn query(&self, filter: HistoryFilter) -> DomainResult<Vec<WorkflowHistoryEntry>> {
        let mut query = String::from("SELECT * FROM workflow_history WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(kind) = &filter.entity_kind {
            query.push_str(" AND entity_kind = ?");
            bindings.push(kind.clone());
        }
        if let Some(entity_id) = &filter.entity_id {
            query.push_str(" AND entity_id = ?");
            bindings.push(entity_id.to_string());
        }
        if let Some(action) = &filter.action {
            query.push_str(" AND action = ?");
            bindings.push(action.as_str().to_string());
        }
        if let Some(since) = &filter.since {
            query.push_str(" AND created_at >= ?");
            bindings.push(since.to_rfc3339());
        }
        if let Some(until) = &filter.until {
            query.push_str(" AND created_at <= ?");
            bindings.push(until.to_rfc3339());
        }

        query.push_str(" ORDER BY created_at DESC");

        if let Some(limit) = filter.limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        let mut q = sqlx::query_as::<_, HistoryRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<HistoryRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_for_entity(
        &self,
        entity_kind: &str,
        entity_id: Uuid,
    ) -> DomainResult<Vec<WorkflowHistoryEntry>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"SELECT * FROM workflow_history
               WHERE entity_kind = ? AND entity_id = ?
               ORDER BY created_at ASC"#,
        )
        .bind(entity_kind)
        .bind(entity_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: String,
    entity_kind: String,
    entity_id: String,
    action: String,
    actor_id: String,
    actor_org: String,
    previous_value: Option<String>,
    new_value: Option<String>,
    comment: Option<String>,
    created_at: String,
}

impl TryFrom<HistoryRow> for WorkflowHistoryEntry {
    type Error = DomainError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let action = WorkflowAction::parse_str(&row.action)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid action: {}", row.action)))?;

        Ok(WorkflowHistoryEntry {
            id: parse_uuid(&row.id)?,
            entity_kind: row.entity_kind,
            entity_id: parse_uuid(&row.entity_id)?,
            action,
            actor_id: parse_uuid(&row.actor_id)?,
            actor_org: parse_uuid(&row.actor_org)?,
            previous_value: row.previous_value,
            new_value: row.new_value,
            comment: row.comment,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
