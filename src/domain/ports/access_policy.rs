//! Authorization port.
//!
//! One polymorphic capability checked once per operation entry, in place of
//! per-route role conditionals.

use crate::domain::errors::DomainResult;
use crate::domain::models::{Actor, RepairRequest};

/// Named workflow operations, as seen by authorization and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Accept,
    Start,
    Complete,
    Confirm,
    Reject,
    OpenLiabilityDiscussion,
    ResolveLiability,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Accept => "accept",
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Confirm => "confirm",
            Self::Reject => "reject",
            Self::OpenLiabilityDiscussion => "open_liability_discussion",
            Self::ResolveLiability => "resolve_liability",
        }
    }
}

/// Authorization capability consulted at every operation entry.
pub trait AccessPolicy: Send + Sync {
    /// Check that `actor` may perform `operation` on `request`.
    ///
    /// `request` is `None` only for `Create`, where no aggregate exists yet.
    /// Fails with `Unauthorized` naming the operation and reason.
    fn authorize(
        &self,
        operation: Operation,
        actor: &Actor,
        request: Option<&RepairRequest>,
    ) -> DomainResult<()>;
}
