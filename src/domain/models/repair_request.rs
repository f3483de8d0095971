//! Repair request domain model.
//!
//! A repair request is the aggregate root of the workflow: it travels from
//! a requesting production site through acceptance and execution by a mold
//! maker to confirmation, with an optional liability-negotiation detour.
//! Status only ever changes through the workflow engine's named operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::liability::LiabilityRecord;

/// Status of a repair request in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    /// Filed by the requesting party, awaiting the executing org
    Requested,
    /// Accepted by the executing org, not yet started
    Accepted,
    /// Repair work underway
    InProgress,
    /// Work finished, awaiting requester confirmation
    Completed,
    /// Requester confirmed the repair (terminal)
    Confirmed,
    /// Rejected before work started (terminal)
    Rejected,
    /// Fault/cost allocation under negotiation; execution paused
    LiabilityDiscussion,
}

impl Default for RepairStatus {
    fn default() -> Self {
        Self::Requested
    }
}

impl RepairStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::LiabilityDiscussion => "liability_discussion",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "requested" => Some(Self::Requested),
            "accepted" => Some(Self::Accepted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            "liability_discussion" => Some(Self::LiabilityDiscussion),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> Vec<RepairStatus> {
        match self {
            Self::Requested => vec![Self::Accepted, Self::Rejected],
            Self::Accepted => vec![Self::InProgress],
            Self::InProgress => vec![Self::Completed, Self::LiabilityDiscussion],
            Self::Completed => vec![Self::Confirmed, Self::LiabilityDiscussion],
            Self::LiabilityDiscussion => vec![Self::InProgress],
            Self::Confirmed => vec![],
            Self::Rejected => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Priority of a repair request, ordered from least to most pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairPriority {
    Low = 1,
    Normal = 2,
    High = 3,
    Urgent = 4,
}

impl Default for RepairPriority {
    fn default() -> Self {
        Self::Normal
    }
}

impl RepairPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            "urgent" | "critical" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Kind of defect the request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Wear,
    Crack,
    Dimension,
    Surface,
    Mechanism,
    Other,
}

impl Default for IssueCategory {
    fn default() -> Self {
        Self::Other
    }
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wear => "wear",
            Self::Crack => "crack",
            Self::Dimension => "dimension",
            Self::Surface => "surface",
            Self::Mechanism => "mechanism",
            Self::Other => "other",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wear" => Some(Self::Wear),
            "crack" => Some(Self::Crack),
            "dimension" => Some(Self::Dimension),
            "surface" => Some(Self::Surface),
            "mechanism" => Some(Self::Mechanism),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Inclusive range for satisfaction scores recorded at confirmation.
pub const SATISFACTION_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Inclusive range for liability ratios (percent).
pub const LIABILITY_RANGE: std::ops::RangeInclusive<u8> = 0..=100;

/// A repair request travelling through the cross-organization workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairRequest {
    /// Unique identifier
    pub id: Uuid,
    /// Subject mold; opaque to the engine
    pub mold_id: Uuid,
    /// Actor that filed the request
    pub requester_id: Uuid,
    /// Organization of the requester
    pub requester_org: Uuid,
    /// Mold maker the request is addressed to
    pub executor_org: Uuid,
    /// Executor actor recorded at acceptance
    pub assignee_id: Option<Uuid>,
    /// Coordinating-authority actor, stamped the first time one acts
    pub coordinator_id: Option<Uuid>,
    /// Short human-readable title
    pub title: String,
    /// Free-text description of the defect
    pub description: String,
    /// Kind of defect
    pub category: IssueCategory,
    /// Priority
    pub priority: RepairPriority,
    /// Current workflow status
    pub status: RepairStatus,
    /// Executor's estimate recorded at acceptance
    pub estimated_days: Option<u32>,
    /// Repair cost in minor currency units
    pub repair_cost: Option<i64>,
    /// Agreed liability ratio, percent attributed to the requester side
    pub liability_ratio: Option<u8>,
    /// Requester satisfaction recorded at confirmation (1-5)
    pub satisfaction_score: Option<u8>,
    /// Reason recorded at rejection
    pub rejection_reason: Option<String>,
    /// Liability negotiation record, present once a discussion was opened
    pub liability: Option<LiabilityRecord>,
    /// When filed
    pub requested_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    /// Version for optimistic locking
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepairRequest {
    /// Create a new request in `Requested` state, attributed to a requester.
    pub fn new(
        mold_id: Uuid,
        requester_id: Uuid,
        requester_org: Uuid,
        executor_org: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            mold_id,
            requester_id,
            requester_org,
            executor_org,
            assignee_id: None,
            coordinator_id: None,
            title: title.into(),
            description: description.into(),
            category: IssueCategory::default(),
            priority: RepairPriority::default(),
            status: RepairStatus::default(),
            estimated_days: None,
            repair_cost: None,
            liability_ratio: None,
            satisfaction_score: None,
            rejection_reason: None,
            liability: None,
            requested_at: now,
            accepted_at: None,
            started_at: None,
            completed_at: None,
            confirmed_at: None,
            rejected_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the issue category.
    pub fn with_category(mut self, category: IssueCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: RepairPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Check if can transition to given status.
    pub fn can_transition_to(&self, new_status: RepairStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to a new status, stamping the matching timestamp and
    /// bumping the optimistic-locking version.
    pub fn transition_to(&mut self, new_status: RepairStatus) -> Result<(), String> {
        if !self.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }

        let now = Utc::now();
        self.status = new_status;
        self.updated_at = now;
        self.version += 1;

        match new_status {
            RepairStatus::Accepted => self.accepted_at = Some(now),
            RepairStatus::InProgress => {
                // Re-entered from a liability resolution: keep the original start.
                if self.started_at.is_none() {
                    self.started_at = Some(now);
                }
            }
            RepairStatus::Completed => self.completed_at = Some(now),
            RepairStatus::Confirmed => self.confirmed_at = Some(now),
            RepairStatus::Rejected => self.rejected_at = Some(now),
            RepairStatus::Requested | RepairStatus::LiabilityDiscussion => {}
        }

        Ok(())
    }

    /// Check if the request is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the given organization is a party to this request.
    pub fn involves_org(&self, org: Uuid) -> bool {
        self.requester_org == org || self.executor_org == org
    }

    /// Validate intrinsic fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title cannot be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description cannot be empty".to_string());
        }
        if self.requester_org == self.executor_org {
            return Err("requester and executor organizations must differ".to_string());
        }
        if let Some(ratio) = self.liability_ratio {
            if !LIABILITY_RANGE.contains(&ratio) {
                return Err(format!("liability_ratio {ratio} outside 0-100"));
            }
        }
        if let Some(score) = self.satisfaction_score {
            if !SATISFACTION_RANGE.contains(&score) {
                return Err(format!("satisfaction_score {score} outside 1-5"));
            }
        }
        if self.confirmed_at.is_some() && self.rejected_at.is_some() {
            return Err("request cannot be both confirmed and rejected".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> RepairRequest {
        RepairRequest::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Gate wear",
            "Gate insert worn beyond tolerance",
        )
    }

    #[test]
    fn test_new_request_is_requested() {
        let req = sample_request();
        assert_eq!(req.status, RepairStatus::Requested);
        assert_eq!(req.version, 1);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut req = sample_request();

        req.transition_to(RepairStatus::Accepted).unwrap();
        assert!(req.accepted_at.is_some());

        req.transition_to(RepairStatus::InProgress).unwrap();
        assert!(req.started_at.is_some());

        req.transition_to(RepairStatus::Completed).unwrap();
        assert!(req.completed_at.is_some());

        req.transition_to(RepairStatus::Confirmed).unwrap();
        assert!(req.confirmed_at.is_some());
        assert!(req.is_terminal());
        assert_eq!(req.version, 5);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut req = sample_request();
        assert!(req.transition_to(RepairStatus::InProgress).is_err());
        assert_eq!(req.status, RepairStatus::Requested);
    }

    #[test]
    fn test_liability_detour_preserves_started_at() {
        let mut req = sample_request();
        req.transition_to(RepairStatus::Accepted).unwrap();
        req.transition_to(RepairStatus::InProgress).unwrap();
        let started = req.started_at;

        req.transition_to(RepairStatus::LiabilityDiscussion).unwrap();
        req.transition_to(RepairStatus::InProgress).unwrap();
        assert_eq!(req.started_at, started);
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        assert!(RepairStatus::Confirmed.valid_transitions().is_empty());
        assert!(RepairStatus::Rejected.valid_transitions().is_empty());
    }

    #[test]
    fn test_execution_blocked_during_liability_discussion() {
        let status = RepairStatus::LiabilityDiscussion;
        assert!(!status.can_transition_to(RepairStatus::Completed));
        assert!(!status.can_transition_to(RepairStatus::Confirmed));
        assert!(status.can_transition_to(RepairStatus::InProgress));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(RepairPriority::Low < RepairPriority::Normal);
        assert!(RepairPriority::Normal < RepairPriority::High);
        assert!(RepairPriority::High < RepairPriority::Urgent);
    }

    #[test]
    fn test_validate_same_org_rejected() {
        let org = Uuid::new_v4();
        let req = RepairRequest::new(Uuid::new_v4(), Uuid::new_v4(), org, org, "t", "d");
        assert!(req.validate().is_err());
    }
}
