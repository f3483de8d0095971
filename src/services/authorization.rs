//! Role-based authorization policy.
//!
//! One capability checked at every operation entry, parameterized by
//! operation, actor role, actor organization, and the target request.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Actor, RepairRequest};
use crate::domain::ports::{AccessPolicy, Operation};

/// The standard three-party policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl RolePolicy {
    pub fn new() -> Self {
        Self
    }

    fn deny(operation: Operation, reason: impl Into<String>) -> DomainError {
        DomainError::Unauthorized {
            operation: operation.as_str().to_string(),
            reason: reason.into(),
        }
    }
}

impl AccessPolicy for RolePolicy {
    fn authorize(
        &self,
        operation: Operation,
        actor: &Actor,
        request: Option<&RepairRequest>,
    ) -> DomainResult<()> {
        match operation {
            Operation::Create => {
                if actor.is_requester() {
                    Ok(())
                } else {
                    Err(Self::deny(operation, "only a requesting party may file a repair request"))
                }
            }
            Operation::Accept | Operation::Start | Operation::Complete => {
                let request = request.ok_or_else(|| Self::deny(operation, "no target request"))?;
                if actor.is_executor() && actor.org == request.executor_org {
                    Ok(())
                } else {
                    Err(Self::deny(operation, "reserved for the executing organization"))
                }
            }
            Operation::Confirm => {
                let request = request.ok_or_else(|| Self::deny(operation, "no target request"))?;
                if actor.is_requester() && actor.org == request.requester_org {
                    Ok(())
                } else {
                    Err(Self::deny(operation, "reserved for the requesting organization"))
                }
            }
            Operation::Reject => {
                let request = request.ok_or_else(|| Self::deny(operation, "no target request"))?;
                if actor.is_coordinator()
                    || (actor.is_executor() && actor.org == request.executor_org)
                {
                    Ok(())
                } else {
                    Err(Self::deny(
                        operation,
                        "reserved for the coordinating authority or the executing organization",
                    ))
                }
            }
            Operation::OpenLiabilityDiscussion => {
                let request = request.ok_or_else(|| Self::deny(operation, "no target request"))?;
                if actor.is_coordinator() || request.involves_org(actor.org) {
                    Ok(())
                } else {
                    Err(Self::deny(operation, "actor is not a party to this request"))
                }
            }
            Operation::ResolveLiability => {
                if actor.is_coordinator() {
                    Ok(())
                } else {
                    Err(Self::deny(operation, "reserved for the coordinating authority"))
                }
            }
        }
    }
}
