//! Append-only workflow history.
//!
//! Every state-changing action leaves one immutable row: who acted, what
//! changed, previous and new value, when. History is a fact about the past;
//! unlike current state it is never overwritten by corrective action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::Actor;

/// Entity kind tag used by the workflow engine's own writes.
pub const REPAIR_REQUEST_KIND: &str = "repair_request";

/// Action recorded in a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Created,
    Accepted,
    Started,
    Completed,
    Confirmed,
    Rejected,
    LiabilityOpened,
    LiabilityResolved,
    /// Manual audit entry filed outside the transition operations
    Note,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Accepted => "accepted",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::LiabilityOpened => "liability_opened",
            Self::LiabilityResolved => "liability_resolved",
            Self::Note => "note",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "created" => Some(Self::Created),
            "accepted" => Some(Self::Accepted),
            "started" => Some(Self::Started),
            "completed" => Some(Self::Completed),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            "liability_opened" => Some(Self::LiabilityOpened),
            "liability_resolved" => Some(Self::LiabilityResolved),
            "note" => Some(Self::Note),
            _ => None,
        }
    }
}

/// One immutable audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowHistoryEntry {
    pub id: Uuid,
    /// Entity kind, `"repair_request"` for engine writes
    pub entity_kind: String,
    pub entity_id: Uuid,
    pub action: WorkflowAction,
    pub actor_id: Uuid,
    pub actor_org: Uuid,
    /// Status (or other value) before the action
    pub previous_value: Option<String>,
    /// Status (or other value) after the action
    pub new_value: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkflowHistoryEntry {
    /// Entry for a repair-request transition.
    pub fn transition(
        request_id: Uuid,
        action: WorkflowAction,
        actor: &Actor,
        previous: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_kind: REPAIR_REQUEST_KIND.to_string(),
            entity_id: request_id,
            action,
            actor_id: actor.id,
            actor_org: actor.org,
            previous_value: Some(previous.into()),
            new_value: Some(new.into()),
            comment: None,
            created_at: Utc::now(),
        }
    }

    /// Entry for an arbitrary entity and action.
    pub fn record(
        entity_kind: impl Into<String>,
        entity_id: Uuid,
        action: WorkflowAction,
        actor: &Actor,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_kind: entity_kind.into(),
            entity_id,
            action,
            actor_id: actor.id,
            actor_org: actor.org,
            previous_value: None,
            new_value: None,
            comment: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a free-text comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}
