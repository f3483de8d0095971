//! Repository port for notification persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AlertCategory, Notification};

/// Notification store. Created by the dispatcher, mutated only by the
/// recipient (read flag) or deleted by the recipient.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a new notification.
    async fn insert(&self, notification: &Notification) -> DomainResult<()>;

    /// Whether an unread notification with the same subject and category
    /// exists for the recipient since the given instant. Used for the
    /// rolling deduplication window.
    async fn unread_exists_since(
        &self,
        recipient_id: Uuid,
        category: AlertCategory,
        request_id: Option<Uuid>,
        since: DateTime<Utc>,
    ) -> DomainResult<bool>;

    /// List a recipient's notifications, newest first.
    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
    ) -> DomainResult<Vec<Notification>>;

    /// Flip the read flag. Only the recipient may do this; the caller is
    /// expected to pass the recipient's own id.
    async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> DomainResult<()>;

    /// Delete a notification, recipient-scoped.
    async fn delete(&self, id: Uuid, recipient_id: Uuid) -> DomainResult<()>;
}
