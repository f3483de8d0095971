//! Ports: trait contracts between the domain and the outside world.

pub mod access_policy;
pub mod audit_repository;
pub mod directory;
pub mod notification_repository;
pub mod repair_repository;

pub use access_policy::{AccessPolicy, Operation};
pub use audit_repository::{AuditLogRepository, HistoryFilter};
pub use directory::{MoldCatalog, RecipientResolver, RecipientSelector};
pub use notification_repository::NotificationRepository;
pub use repair_repository::{RepairFilter, RepairRequestRepository};
