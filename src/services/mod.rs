//! Services: the workflow engine and its supporting fabric.

pub mod alert_dispatcher;
pub mod audit_recorder;
pub mod authorization;
pub mod workflow_engine;

pub use alert_dispatcher::{AlertDispatcher, DEFAULT_DEDUP_WINDOW_HOURS};
pub use audit_recorder::AuditRecorder;
pub use authorization::RolePolicy;
pub use workflow_engine::{
    AcceptRequest, CompleteRequest, ConfirmRequest, CreateRequest, OpenLiabilityRequest,
    QuickAction, ResolveLiabilityRequest, TransitionOutcome, WorkflowEngine,
};
