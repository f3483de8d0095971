//! Liability negotiation record.
//!
//! Stored as a JSON column on the repair request: the record exists only
//! once a discussion has been opened, and its resolution fields are filled
//! exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repair_request::RepairStatus;

/// Fault/cost allocation negotiated between the parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilityRecord {
    /// Actor that opened the discussion
    pub opened_by: Uuid,
    /// Status the request was in when the discussion was opened
    pub opened_from: RepairStatus,
    /// Why the discussion was opened
    pub reason: String,
    /// Ratio proposed at opening, percent
    pub proposed_ratio: Option<u8>,
    pub opened_at: DateTime<Utc>,
    /// Agreed ratio, percent; set at resolution
    pub final_ratio: Option<u8>,
    /// Resolution narrative; set at resolution
    pub resolution: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl LiabilityRecord {
    /// Open a new discussion.
    pub fn open(
        opened_by: Uuid,
        opened_from: RepairStatus,
        reason: impl Into<String>,
        proposed_ratio: Option<u8>,
    ) -> Self {
        Self {
            opened_by,
            opened_from,
            reason: reason.into(),
            proposed_ratio,
            opened_at: Utc::now(),
            final_ratio: None,
            resolution: None,
            resolved_by: None,
            resolved_at: None,
        }
    }

    /// Record the resolution.
    pub fn resolve(&mut self, resolved_by: Uuid, final_ratio: u8, resolution: impl Into<String>) {
        self.final_ratio = Some(final_ratio);
        self.resolution = Some(resolution.into());
        self.resolved_by = Some(resolved_by);
        self.resolved_at = Some(Utc::now());
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}
