//! Adapters: concrete implementations of the domain ports.

pub mod directory;
pub mod sqlite;

pub use directory::{NullMoldCatalog, OrgInboxDirectory, StaticDirectory, StaticMoldCatalog};
