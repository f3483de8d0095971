//! Authenticated actors invoking workflow operations.
//!
//! Authentication itself lives outside this crate; callers attach an
//! already-verified identity to every operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of an actor within the repair workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Files repair requests (e.g. a production site).
    Requester,
    /// Performs the physical repair (e.g. a mold maker).
    Executor,
    /// Oversight between requester and executor (e.g. a mold-development office).
    Coordinator,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::Executor => "executor",
            Self::Coordinator => "coordinator",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "requester" => Some(Self::Requester),
            "executor" => Some(Self::Executor),
            "coordinator" => Some(Self::Coordinator),
            _ => None,
        }
    }
}

/// An authenticated actor: identity, organization, and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub org: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: Uuid, org: Uuid, role: ActorRole) -> Self {
        Self { id, org, role }
    }

    pub fn is_requester(&self) -> bool {
        self.role == ActorRole::Requester
    }

    pub fn is_executor(&self) -> bool {
        self.role == ActorRole::Executor
    }

    pub fn is_coordinator(&self) -> bool {
        self.role == ActorRole::Coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [ActorRole::Requester, ActorRole::Executor, ActorRole::Coordinator] {
            assert_eq!(ActorRole::parse_str(role.as_str()), Some(role));
        }
        assert_eq!(ActorRole::parse_str("supervisor"), None);
    }
}
