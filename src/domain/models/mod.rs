//! Domain models for the moldflow workflow engine.

pub mod actor;
pub mod config;
pub mod history;
pub mod liability;
pub mod notification;
pub mod repair_request;

pub use actor::{Actor, ActorRole};
pub use config::{AlertConfig, Config, DatabaseConfig, LoggingConfig};
pub use history::{WorkflowAction, WorkflowHistoryEntry, REPAIR_REQUEST_KIND};
pub use liability::LiabilityRecord;
pub use notification::{AlertCategory, AlertSeverity, Notification};
pub use repair_request::{
    IssueCategory, RepairPriority, RepairRequest, RepairStatus, LIABILITY_RANGE,
    SATISFACTION_RANGE,
};
