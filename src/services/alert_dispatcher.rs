//! Alert/notification dispatcher.
//!
//! Turns one workflow event into addressed notification records for every
//! resolved recipient, suppressing duplicates inside a rolling window: an
//! existing unread notification for the same `(request, category)` within
//! the window makes the call a no-op for that recipient.

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AlertCategory, AlertSeverity, Notification};
use crate::domain::ports::{NotificationRepository, RecipientResolver, RecipientSelector};

/// Default deduplication window.
pub const DEFAULT_DEDUP_WINDOW_HOURS: u64 = 24;

pub struct AlertDispatcher<N: NotificationRepository, R: RecipientResolver> {
    notifications: Arc<N>,
    resolver: Arc<R>,
    dedup_window: Duration,
}

impl<N: NotificationRepository, R: RecipientResolver> AlertDispatcher<N, R> {
    pub fn new(notifications: Arc<N>, resolver: Arc<R>) -> Self {
        Self {
            notifications,
            resolver,
            dedup_window: Duration::hours(DEFAULT_DEDUP_WINDOW_HOURS as i64),
        }
    }

    /// Override the deduplication window (hours).
    pub fn with_dedup_window_hours(mut self, hours: u64) -> Self {
        self.dedup_window = Duration::hours(hours as i64);
        self
    }

    /// Dispatch one event to every recipient behind the given selectors.
    ///
    /// Returns the ids of the notifications actually inserted; deduplicated
    /// recipients contribute no id.
    pub async fn dispatch(
        &self,
        selectors: &[RecipientSelector],
        category: AlertCategory,
        severity: AlertSeverity,
        title: &str,
        body: &str,
        request_id: Option<Uuid>,
    ) -> DomainResult<Vec<Uuid>> {
        let resolved =
            futures::future::join_all(selectors.iter().map(|s| self.resolver.resolve(*s))).await;

        let mut recipients: Vec<Uuid> = Vec::new();
        for result in resolved {
            for id in result? {
                if !recipients.contains(&id) {
                    recipients.push(id);
                }
            }
        }

        let since = Utc::now() - self.dedup_window;
        let mut created = Vec::new();

        for recipient in recipients {
            let duplicate = self
                .notifications
                .unread_exists_since(recipient, category, request_id, since)
                .await?;
            if duplicate {
                tracing::debug!(
                    recipient = %recipient,
                    category = category.as_str(),
                    "notification suppressed by dedup window"
                );
                continue;
            }

            let notification =
                Notification::new(recipient, category, severity, title, body, request_id);
            self.notifications.insert(&notification).await?;
            created.push(notification.id);
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::directory::StaticDirectory;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteNotificationRepository};
    use sqlx::SqlitePool;

    async fn setup(
        org: Uuid,
        members: Vec<Uuid>,
    ) -> (AlertDispatcher<SqliteNotificationRepository, StaticDirectory>, SqlitePool) {
        let pool = create_migrated_test_pool().await.unwrap();
        let notifications = Arc::new(SqliteNotificationRepository::new(pool.clone()));
        let resolver = Arc::new(StaticDirectory::new().with_org(org, members));
        (AlertDispatcher::new(notifications, resolver), pool)
    }

    #[tokio::test]
    async fn test_fan_out_to_org_members() {
        let org = Uuid::new_v4();
        let members = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let (dispatcher, _pool) = setup(org, members).await;

        let created = dispatcher
            .dispatch(
                &[RecipientSelector::OrgMembers(org)],
                AlertCategory::RepairRequested,
                AlertSeverity::Info,
                "New repair request",
                "Gate wear on mold 42",
                Some(Uuid::new_v4()),
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 3);
    }

    #[tokio::test]
    async fn test_dedup_window_collapses_duplicates() {
        let org = Uuid::new_v4();
        let member = Uuid::new_v4();
        let (dispatcher, pool) = setup(org, vec![member]).await;
        let request_id = Some(Uuid::new_v4());

        let first = dispatcher
            .dispatch(
                &[RecipientSelector::OrgMembers(org)],
                AlertCategory::RepairCompleted,
                AlertSeverity::Info,
                "Repair completed",
                "Done",
                request_id,
            )
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        // Same subject and category inside the window: suppressed.
        let second = dispatcher
            .dispatch(
                &[RecipientSelector::OrgMembers(org)],
                AlertCategory::RepairCompleted,
                AlertSeverity::Info,
                "Repair completed",
                "Done",
                request_id,
            )
            .await
            .unwrap();
        assert!(second.is_empty());

        // Age the stored row past the window; the next call inserts again.
        let aged = (Utc::now() - Duration::hours(25)).to_rfc3339();
        sqlx::query("UPDATE notifications SET created_at = ?")
            .bind(aged)
            .execute(&pool)
            .await
            .unwrap();

        let third = dispatcher
            .dispatch(
                &[RecipientSelector::OrgMembers(org)],
                AlertCategory::RepairCompleted,
                AlertSeverity::Info,
                "Repair completed",
                "Done",
                request_id,
            )
            .await
            .unwrap();
        assert_eq!(third.len(), 1);
    }

    #[tokio::test]
    async fn test_different_category_not_suppressed() {
        let org = Uuid::new_v4();
        let member = Uuid::new_v4();
        let (dispatcher, _pool) = setup(org, vec![member]).await;
        let request_id = Some(Uuid::new_v4());

        dispatcher
            .dispatch(
                &[RecipientSelector::OrgMembers(org)],
                AlertCategory::RepairStarted,
                AlertSeverity::Info,
                "Repair started",
                "Work underway",
                request_id,
            )
            .await
            .unwrap();

        let other = dispatcher
            .dispatch(
                &[RecipientSelector::OrgMembers(org)],
                AlertCategory::RepairCompleted,
                AlertSeverity::Info,
                "Repair completed",
                "Done",
                request_id,
            )
            .await
            .unwrap();
        assert_eq!(other.len(), 1);
    }

    #[tokio::test]
    async fn test_overlapping_selectors_deduplicate_recipients() {
        let org = Uuid::new_v4();
        let member = Uuid::new_v4();
        let (dispatcher, _pool) = setup(org, vec![member]).await;

        let created = dispatcher
            .dispatch(
                &[
                    RecipientSelector::OrgMembers(org),
                    RecipientSelector::User(member),
                ],
                AlertCategory::RepairRejected,
                AlertSeverity::Warning,
                "Repair rejected",
                "Out of scope",
                Some(Uuid::new_v4()),
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 1);
    }
}
