//! Moldflow - Repair Workflow Engine
//!
//! Moldflow tracks industrial mold (tooling) repair requests across three
//! parties: a requesting production site, a coordinating mold-development
//! office, and an executing mold maker. The core is a transactional state
//! machine with an audit trail and deduplicated notification fan-out.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic, models, and ports
//! - **Service Layer** (`services`): Workflow engine, dispatcher, recorder, policy
//! - **Adapters** (`adapters`): SQLite repositories, directory stubs
//! - **Infrastructure Layer** (`infrastructure`): Config and logging bootstrap
//! - **CLI Layer** (`cli`): Command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Actor, ActorRole, AlertCategory, AlertSeverity, Config, IssueCategory, LiabilityRecord,
    Notification, RepairPriority, RepairRequest, RepairStatus, WorkflowAction,
    WorkflowHistoryEntry,
};
pub use domain::ports::{
    AccessPolicy, AuditLogRepository, MoldCatalog, NotificationRepository, Operation,
    RecipientResolver, RecipientSelector, RepairFilter, RepairRequestRepository,
};
pub use infrastructure::{ConfigError, ConfigLoader};
pub use services::{
    AlertDispatcher, AuditRecorder, QuickAction, RolePolicy, TransitionOutcome, WorkflowEngine,
};
