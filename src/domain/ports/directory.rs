//! Collaborator ports: directory lookup and mold reference data.
//!
//! Both concerns live outside the engine. The directory resolves recipient
//! selectors to concrete user identities for notification fan-out; the mold
//! catalog supplies display names for notification text and is never used
//! for control flow.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;

/// Who a dispatch call should reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientSelector {
    /// All active members of an organization
    OrgMembers(Uuid),
    /// A single user
    User(Uuid),
}

/// Resolves recipient selectors to user identities.
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    /// Resolve a selector to a set of user ids. Unknown organizations
    /// resolve to the empty set.
    async fn resolve(&self, selector: RecipientSelector) -> DomainResult<Vec<Uuid>>;
}

/// Read-only mold reference data.
#[async_trait]
pub trait MoldCatalog: Send + Sync {
    /// Human-readable name for a mold, if known.
    async fn display_name(&self, mold_id: Uuid) -> DomainResult<Option<String>>;
}
