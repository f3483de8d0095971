//! Notification records produced by the alert dispatcher.
//!
//! Fire-and-forget: rows are written by the dispatcher and polled by
//! clients. Only the recipient mutates them (read flag) or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repair_request::RepairPriority;

/// What kind of workflow event a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    RepairRequested,
    RepairAccepted,
    RepairStarted,
    RepairCompleted,
    RepairConfirmed,
    RepairRejected,
    LiabilityOpened,
    LiabilityResolved,
}

impl AlertCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RepairRequested => "repair_requested",
            Self::RepairAccepted => "repair_accepted",
            Self::RepairStarted => "repair_started",
            Self::RepairCompleted => "repair_completed",
            Self::RepairConfirmed => "repair_confirmed",
            Self::RepairRejected => "repair_rejected",
            Self::LiabilityOpened => "liability_opened",
            Self::LiabilityResolved => "liability_resolved",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "repair_requested" => Some(Self::RepairRequested),
            "repair_accepted" => Some(Self::RepairAccepted),
            "repair_started" => Some(Self::RepairStarted),
            "repair_completed" => Some(Self::RepairCompleted),
            "repair_confirmed" => Some(Self::RepairConfirmed),
            "repair_rejected" => Some(Self::RepairRejected),
            "liability_opened" => Some(Self::LiabilityOpened),
            "liability_resolved" => Some(Self::LiabilityResolved),
            _ => None,
        }
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl From<RepairPriority> for AlertSeverity {
    fn from(priority: RepairPriority) -> Self {
        match priority {
            RepairPriority::Low | RepairPriority::Normal => Self::Info,
            RepairPriority::High => Self::Warning,
            RepairPriority::Urgent => Self::Critical,
        }
    }
}

/// A notification addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    pub title: String,
    pub body: String,
    /// Originating repair request, when there is one
    pub request_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_id: Uuid,
        category: AlertCategory,
        severity: AlertSeverity,
        title: impl Into<String>,
        body: impl Into<String>,
        request_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            category,
            severity,
            title: title.into(),
            body: body.into(),
            request_id,
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_priority() {
        assert_eq!(AlertSeverity::from(RepairPriority::Low), AlertSeverity::Info);
        assert_eq!(AlertSeverity::from(RepairPriority::Normal), AlertSeverity::Info);
        assert_eq!(AlertSeverity::from(RepairPriority::High), AlertSeverity::Warning);
        assert_eq!(AlertSeverity::from(RepairPriority::Urgent), AlertSeverity::Critical);
    }

    #[test]
    fn test_category_round_trip() {
        for category in [
            AlertCategory::RepairRequested,
            AlertCategory::RepairAccepted,
            AlertCategory::RepairStarted,
            AlertCategory::RepairCompleted,
            AlertCategory::RepairConfirmed,
            AlertCategory::RepairRejected,
            AlertCategory::LiabilityOpened,
            AlertCategory::LiabilityResolved,
        ] {
            assert_eq!(AlertCategory::parse_str(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_new_notification_unread() {
        let n = Notification::new(
            Uuid::new_v4(),
            AlertCategory::RepairRequested,
            AlertSeverity::Info,
            "New repair request",
            "Gate wear on mold 42",
            Some(Uuid::new_v4()),
        );
        assert!(!n.read);
    }
}
