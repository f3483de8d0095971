//! SQLite implementation of the NotificationRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AlertCategory, AlertSeverity, Notification};
use crate::domain::ports::NotificationRepository;

#[derive(Clone)]
pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn insert(&self, notification: &Notification) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO notifications
               (id, recipient_id, category, severity, title, body, request_id, read, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(notification.id.to_string())
        .bind(notification.recipient_id.to_string())
        .bind(notification.category.as_str())
        .bind(notification.severity.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.request_id.map(|id| id.to_string()))
        .bind(i32::from(notification.read))
        .bind(notification.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unread_exists_since(
        &self,
        recipient_id: Uuid,
        category: AlertCategory,
        request_id: Option<Uuid>,
        since: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"SELECT 1 FROM notifications
               WHERE recipient_id = ? AND category = ? AND read = 0
                 AND created_at >= ?
                 AND ((request_id IS NULL AND ? IS NULL) OR request_id = ?)
               LIMIT 1"#,
        )
        .bind(recipient_id.to_string())
        .bind(category.as_str())
        .bind(since.to_rfc3339())
        .bind(request_id.map(|id| id.to_string()))
        .bind(request_id.map(|id| id.to_string()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
    ) -> DomainResult<Vec<Notification>> {
        let query = if unread_only {
            "SELECT * FROM notifications WHERE recipient_id = ? AND read = 0 ORDER BY created_at DESC"
        } else {
            "SELECT * FROM notifications WHERE recipient_id = ? ORDER BY created_at DESC"
        };

        let rows: Vec<NotificationRow> = sqlx::query_as(query)
            .bind(recipient_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET read = 1 WHERE id = ? AND recipient_id = ?",
        )
        .bind(id.to_string())
        .bind(recipient_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, recipient_id: Uuid) -> DomainResult<()> {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE id = ? AND recipient_id = ?",
        )
        .bind(id.to_string())
        .bind(recipient_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(id));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: String,
    recipient_id: String,
    category: String,
    severity: String,
    title: String,
    body: String,
    request_id: Option<String>,
    read: i64,
    created_at: String,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DomainError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let category = AlertCategory::parse_str(&row.category)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid category: {}", row.category)))?;
        let severity = AlertSeverity::parse_str(&row.severity)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid severity: {}", row.severity)))?;

        Ok(Notification {
            id: parse_uuid(&row.id)?,
            recipient_id: parse_uuid(&row.recipient_id)?,
            category,
            severity,
            title: row.title,
            body: row.body,
            request_id: parse_optional_uuid(row.request_id)?,
            read: row.read != 0,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_repo() -> SqliteNotificationRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteNotificationRepository::new(pool)
    }

    fn sample_notification(recipient: Uuid, request: Option<Uuid>) -> Notification {
        Notification::new(
            recipient,
            AlertCategory::RepairCompleted,
            AlertSeverity::Info,
            "Repair completed",
            "Mold 42 repair finished",
            request,
        )
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let repo = setup_test_repo().await;
        let recipient = Uuid::new_v4();

        repo.insert(&sample_notification(recipient, None)).await.unwrap();

        let all = repo.list_for_recipient(recipient, false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].read);
    }

    #[tokio::test]
    async fn test_mark_read_scoped_to_recipient() {
        let repo = setup_test_repo().await;
        let recipient = Uuid::new_v4();
        let notification = sample_notification(recipient, None);
        repo.insert(&notification).await.unwrap();

        // Another recipient cannot flip the flag.
        let err = repo.mark_read(notification.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        repo.mark_read(notification.id, recipient).await.unwrap();
        let unread = repo.list_for_recipient(recipient, true).await.unwrap();
        assert!(unread.is_empty());
    }

    #[tokio::test]
    async fn test_unread_exists_since() {
        let repo = setup_test_repo().await;
        let recipient = Uuid::new_v4();
        let request = Uuid::new_v4();
        let notification = sample_notification(recipient, Some(request));
        repo.insert(&notification).await.unwrap();

        let since = Utc::now() - chrono::Duration::hours(24);
        assert!(repo
            .unread_exists_since(recipient, AlertCategory::RepairCompleted, Some(request), since)
            .await
            .unwrap());

        // Different category, no match.
        assert!(!repo
            .unread_exists_since(recipient, AlertCategory::RepairStarted, Some(request), since)
            .await
            .unwrap());

        // Read notifications don't suppress new ones.
        repo.mark_read(notification.id, recipient).await.unwrap();
        assert!(!repo
            .unread_exists_since(recipient, AlertCategory::RepairCompleted, Some(request), since)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = setup_test_repo().await;
        let recipient = Uuid::new_v4();
        let notification = sample_notification(recipient, None);
        repo.insert(&notification).await.unwrap();

        repo.delete(notification.id, recipient).await.unwrap();
        let all = repo.list_for_recipient(recipient, false).await.unwrap();
        assert!(all.is_empty());
    }
}
