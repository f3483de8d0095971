//! Static in-process implementations of the directory and catalog ports.
//!
//! The real deployments back these with the company/user directory service.
//! The static variants cover CLI wiring and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::ports::{MoldCatalog, RecipientResolver, RecipientSelector};

/// Directory with a fixed org-to-members roster.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    members: HashMap<Uuid, Vec<Uuid>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the active members of an organization.
    pub fn with_org(mut self, org: Uuid, members: Vec<Uuid>) -> Self {
        self.members.insert(org, members);
        self
    }
}

#[async_trait]
impl RecipientResolver for StaticDirectory {
    async fn resolve(&self, selector: RecipientSelector) -> DomainResult<Vec<Uuid>> {
        match selector {
            RecipientSelector::OrgMembers(org) => {
                Ok(self.members.get(&org).cloned().unwrap_or_default())
            }
            RecipientSelector::User(id) => Ok(vec![id]),
        }
    }
}

/// Directory that addresses organizations as their own inbox: an
/// org-members selector resolves to the organization id itself. Used where
/// no user directory is wired in and notifications land in a shared
/// org-level inbox.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrgInboxDirectory;

#[async_trait]
impl RecipientResolver for OrgInboxDirectory {
    async fn resolve(&self, selector: RecipientSelector) -> DomainResult<Vec<Uuid>> {
        match selector {
            RecipientSelector::OrgMembers(org) => Ok(vec![org]),
            RecipientSelector::User(id) => Ok(vec![id]),
        }
    }
}

/// Catalog that knows no molds; notification text falls back to the raw id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMoldCatalog;

#[async_trait]
impl MoldCatalog for NullMoldCatalog {
    async fn display_name(&self, _mold_id: Uuid) -> DomainResult<Option<String>> {
        Ok(None)
    }
}

/// Catalog backed by a fixed name table.
#[derive(Debug, Clone, Default)]
pub struct StaticMoldCatalog {
    names: HashMap<Uuid, String>,
}

impl StaticMoldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mold(mut self, mold_id: Uuid, name: impl Into<String>) -> Self {
        self.names.insert(mold_id, name.into());
        self
    }
}

#[async_trait]
impl MoldCatalog for StaticMoldCatalog {
    async fn display_name(&self, mold_id: Uuid) -> DomainResult<Option<String>> {
        Ok(self.names.get(&mold_id).cloned())
    }
}
