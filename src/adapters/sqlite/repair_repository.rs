//! SQLite implementation of the RepairRequestRepository.
//!
//! Transitions commit the mutated row and its history entry in one
//! transaction, guarded by a compare-and-swap on the `version` column.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_optional_datetime, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    IssueCategory, LiabilityRecord, RepairPriority, RepairRequest, RepairStatus,
    WorkflowHistoryEntry,
};
use crate::domain::ports::{RepairFilter, RepairRequestRepository};

#[derive(Clone)]
pub struct SqliteRepairRequestRepository {
    pool: SqlitePool,
}

impl SqliteRepairRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn append_history(
        tx: &mut Transaction<'_, Sqlite>,
        entry: &WorkflowHistoryEntry,
    ) -> DomainResult<()> {
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
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RepairRequestRepository for SqliteRepairRequestRepository {
    async fn create(
        &self,
        request: &RepairRequest,
        entry: &WorkflowHistoryEntry,
    ) -> DomainResult<()> {
        let liability_json = request
            .liability
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO repair_requests
               (id, mold_id, requester_id, requester_org, executor_org, assignee_id,
                coordinator_id, title, description, category, priority, status,
                estimated_days, repair_cost, liability_ratio, satisfaction_score,
                rejection_reason, liability, requested_at, accepted_at, started_at,
                completed_at, confirmed_at, rejected_at, version, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(request.id.to_string())
        .bind(request.mold_id.to_string())
        .bind(request.requester_id.to_string())
        .bind(request.requester_org.to_string())
        .bind(request.executor_org.to_string())
        .bind(request.assignee_id.map(|id| id.to_string()))
        .bind(request.coordinator_id.map(|id| id.to_string()))
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.category.as_str())
        .bind(request.priority.as_str())
        .bind(request.status.as_str())
        .bind(request.estimated_days.map(i64::from))
        .bind(request.repair_cost)
        .bind(request.liability_ratio.map(i64::from))
        .bind(request.satisfaction_score.map(i64::from))
        .bind(&request.rejection_reason)
        .bind(&liability_json)
        .bind(request.requested_at.to_rfc3339())
        .bind(request.accepted_at.map(|t| t.to_rfc3339()))
        .bind(request.started_at.map(|t| t.to_rfc3339()))
        .bind(request.completed_at.map(|t| t.to_rfc3339()))
        .bind(request.confirmed_at.map(|t| t.to_rfc3339()))
        .bind(request.rejected_at.map(|t| t.to_rfc3339()))
        .bind(request.version as i64)
        .bind(request.created_at.to_rfc3339())
        .bind(request.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        Self::append_history(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<RepairRequest>> {
        let row: Option<RepairRequestRow> =
            sqlx::query_as("SELECT * FROM repair_requests WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn commit_transition(
        &self,
        request: &RepairRequest,
        expected_version: u64,
        entry: &WorkflowHistoryEntry,
    ) -> DomainResult<()> {
        let liability_json = request
            .liability
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"UPDATE repair_requests SET
               assignee_id = ?, coordinator_id = ?, status = ?, estimated_days = ?,
               repair_cost = ?, liability_ratio = ?, satisfaction_score = ?,
               rejection_reason = ?, liability = ?, accepted_at = ?, started_at = ?,
               completed_at = ?, confirmed_at = ?, rejected_at = ?, version = ?,
               updated_at = ?
               WHERE id = ? AND version = ?"#,
        )
        .bind(request.assignee_id.map(|id| id.to_string()))
        .bind(request.coordinator_id.map(|id| id.to_string()))
        .bind(request.status.as_str())
        .bind(request.estimated_days.map(i64::from))
        .bind(request.repair_cost)
        .bind(request.liability_ratio.map(i64::from))
        .bind(request.satisfaction_score.map(i64::from))
        .bind(&request.rejection_reason)
        .bind(&liability_json)
        .bind(request.accepted_at.map(|t| t.to_rfc3339()))
        .bind(request.started_at.map(|t| t.to_rfc3339()))
        .bind(request.completed_at.map(|t| t.to_rfc3339()))
        .bind(request.confirmed_at.map(|t| t.to_rfc3339()))
        .bind(request.rejected_at.map(|t| t.to_rfc3339()))
        .bind(request.version as i64)
        .bind(request.updated_at.to_rfc3339())
        .bind(request.id.to_string())
        .bind(expected_version as i64)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing row from a lost race.
            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT 1 FROM repair_requests WHERE id = ?")
                    .bind(request.id.to_string())
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Err(match exists {
                Some(_) => DomainError::Conflict {
                    entity: "repair_request".to_string(),
                    id: request.id,
                },
                None => DomainError::NotFound(request.id),
            });
        }

        Self::append_history(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list(&self, filter: RepairFilter) -> DomainResult<Vec<RepairRequest>> {
        let mut query = String::from("SELECT * FROM repair_requests WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(status) = &filter.status {
            query.push_str(" AND status = ?");
            bindings.push(status.as_str().to_string());
        }
        if let Some(priority) = &filter.priority {
            query.push_str(" AND priority = ?");
            bindings.push(priority.as_str().to_string());
        }
        if let Some(mold_id) = &filter.mold_id {
            query.push_str(" AND mold_id = ?");
            bindings.push(mold_id.to_string());
        }
        if let Some(org) = &filter.requester_org {
            query.push_str(" AND requester_org = ?");
            bindings.push(org.to_string());
        }
        if let Some(org) = &filter.executor_org {
            query.push_str(" AND executor_org = ?");
            bindings.push(org.to_string());
        }

        query.push_str(" ORDER BY created_at DESC");

        if let Some(limit) = filter.limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        let mut q = sqlx::query_as::<_, RepairRequestRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<RepairRequestRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_by_status(&self) -> DomainResult<HashMap<RepairStatus, u64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM repair_requests GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = HashMap::new();
        for (status_str, count) in rows {
            if let Some(status) = RepairStatus::from_str(&status_str) {
                counts.insert(status, count as u64);
            }
        }
        Ok(counts)
    }
}

#[derive(sqlx::FromRow)]
struct RepairRequestRow {
    id: String,
    mold_id: String,
    requester_id: String,
    requester_org: String,
    executor_org: String,
    assignee_id: Option<String>,
    coordinator_id: Option<String>,
    title: String,
    description: String,
    category: String,
    priority: String,
    status: String,
    estimated_days: Option<i64>,
    repair_cost: Option<i64>,
    liability_ratio: Option<i64>,
    satisfaction_score: Option<i64>,
    rejection_reason: Option<String>,
    liability: Option<String>,
    requested_at: String,
    accepted_at: Option<String>,
    started_at: Option<String>,
    completed_at: Option<String>,
    confirmed_at: Option<String>,
    rejected_at: Option<String>,
    version: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<RepairRequestRow> for RepairRequest {
    type Error = DomainError;

    fn try_from(row: RepairRequestRow) -> Result<Self, Self::Error> {
        let status = RepairStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid status: {}", row.status)))?;
        let priority = RepairPriority::from_str(&row.priority)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid priority: {}", row.priority)))?;
        let category = IssueCategory::from_str(&row.category)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid category: {}", row.category)))?;

        let liability: Option<LiabilityRecord> = row
            .liability
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        Ok(RepairRequest {
            id: parse_uuid(&row.id)?,
            mold_id: parse_uuid(&row.mold_id)?,
            requester_id: parse_uuid(&row.requester_id)?,
            requester_org: parse_uuid(&row.requester_org)?,
            executor_org: parse_uuid(&row.executor_org)?,
            assignee_id: parse_optional_uuid(row.assignee_id)?,
            coordinator_id: parse_optional_uuid(row.coordinator_id)?,
            title: row.title,
            description: row.description,
            category,
            priority,
            status,
            estimated_days: row.estimated_days.map(|d| d as u32),
            repair_cost: row.repair_cost,
            liability_ratio: row.liability_ratio.map(|r| r as u8),
            satisfaction_score: row.satisfaction_score.map(|s| s as u8),
            rejection_reason: row.rejection_reason,
            liability,
            requested_at: parse_datetime(&row.requested_at)?,
            accepted_at: parse_optional_datetime(row.accepted_at)?,
            started_at: parse_optional_datetime(row.started_at)?,
            completed_at: parse_optional_datetime(row.completed_at)?,
            confirmed_at: parse_optional_datetime(row.confirmed_at)?,
            rejected_at: parse_optional_datetime(row.rejected_at)?,
            version: row.version as u64,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
