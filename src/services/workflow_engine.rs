//! Repair workflow state machine.
//!
//! The engine owns every status change a repair request goes through. Each
//! operation loads the current record, checks authorization and the status
//! precondition, validates its payload, then commits the mutation together
//! with its history entry in one compare-and-swap transaction. Notification
//! fan-out runs after the commit and never fails the operation.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Actor, AlertCategory, AlertSeverity, IssueCategory, LiabilityRecord, RepairPriority,
    RepairRequest, RepairStatus, WorkflowAction, WorkflowHistoryEntry, LIABILITY_RANGE,
    SATISFACTION_RANGE,
};
use crate::domain::ports::{
    AccessPolicy, MoldCatalog, NotificationRepository, Operation, RecipientResolver,
    RecipientSelector, RepairFilter, RepairRequestRepository,
};
use crate::services::alert_dispatcher::AlertDispatcher;

/// UI affordances the caller may surface after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Accept,
    Start,
    Complete,
    Confirm,
    OpenLiabilityDiscussion,
    ResolveLiability,
}

impl QuickAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Confirm => "confirm",
            Self::OpenLiabilityDiscussion => "open_liability_discussion",
            Self::ResolveLiability => "resolve_liability",
        }
    }

    /// Actions available from a given status.
    pub fn for_status(status: RepairStatus) -> Vec<QuickAction> {
        match status {
            RepairStatus::Requested => vec![Self::Accept],
            RepairStatus::Accepted => vec![Self::Start],
            RepairStatus::InProgress => vec![Self::Complete, Self::OpenLiabilityDiscussion],
            RepairStatus::Completed => vec![Self::Confirm, Self::OpenLiabilityDiscussion],
            RepairStatus::LiabilityDiscussion => vec![Self::ResolveLiability],
            RepairStatus::Confirmed | RepairStatus::Rejected => vec![],
        }
    }
}

/// Result of a transition operation.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub request: RepairRequest,
    pub hints: Vec<QuickAction>,
}

impl TransitionOutcome {
    fn new(request: RepairRequest) -> Self {
        let hints = QuickAction::for_status(request.status);
        Self { request, hints }
    }
}

/// Payload for `create`.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub mold_id: Uuid,
    pub executor_org: Uuid,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub priority: RepairPriority,
}

/// Payload for `accept`.
#[derive(Debug, Clone, Default)]
pub struct AcceptRequest {
    pub estimated_days: Option<u32>,
    pub comment: Option<String>,
}

/// Payload for `complete`.
#[derive(Debug, Clone, Default)]
pub struct CompleteRequest {
    pub repair_cost: Option<i64>,
    /// Fast-path ratio, only valid while no liability discussion exists
    pub liability_ratio: Option<u8>,
    pub comment: Option<String>,
}

/// Payload for `confirm`.
#[derive(Debug, Clone, Default)]
pub struct ConfirmRequest {
    pub satisfaction_score: Option<u8>,
    pub comment: Option<String>,
}

/// Payload for `open_liability_discussion`.
#[derive(Debug, Clone)]
pub struct OpenLiabilityRequest {
    pub reason: String,
    pub proposed_ratio: Option<u8>,
}

/// Payload for `resolve_liability`.
#[derive(Debug, Clone)]
pub struct ResolveLiabilityRequest {
    pub final_ratio: u8,
    pub resolution: String,
}

/// The workflow engine over its collaborator ports.
pub struct WorkflowEngine<S, N, R, C, P>
where
    S: RepairRequestRepository,
    N: NotificationRepository,
    R: RecipientResolver,
    C: MoldCatalog,
    P: AccessPolicy,
{
    repo: Arc<S>,
    dispatcher: AlertDispatcher<N, R>,
    catalog: Arc<C>,
    policy: P,
}

impl<S, N, R, C, P> WorkflowEngine<S, N, R, C, P>
where
    S: RepairRequestRepository,
    N: NotificationRepository,
    R: RecipientResolver,
    C: MoldCatalog,
    P: AccessPolicy,
{
    pub fn new(repo: Arc<S>, dispatcher: AlertDispatcher<N, R>, catalog: Arc<C>, policy: P) -> Self {
        Self { repo, dispatcher, catalog, policy }
    }

    /// File a new repair request.
    pub async fn create(&self, actor: &Actor, payload: CreateRequest) -> DomainResult<TransitionOutcome> {
        self.policy.authorize(Operation::Create, actor, None)?;

        let request = RepairRequest::new(
            payload.mold_id,
            actor.id,
            actor.org,
            payload.executor_org,
            payload.title,
            payload.description,
        )
        .with_category(payload.category)
        .with_priority(payload.priority);

        request.validate().map_err(DomainError::Validation)?;

        let entry = WorkflowHistoryEntry::transition(
            request.id,
            WorkflowAction::Created,
            actor,
            "",
            request.status.as_str(),
        );
        self.repo.create(&request, &entry).await?;

        self.notify(
            &request,
            &[RecipientSelector::OrgMembers(request.executor_org)],
            AlertCategory::RepairRequested,
            "New repair request",
        )
        .await;

        Ok(TransitionOutcome::new(request))
    }

    /// Accept a requested repair on behalf of the executing organization.
    pub async fn accept(
        &self,
        request_id: Uuid,
        actor: &Actor,
        payload: AcceptRequest,
    ) -> DomainResult<TransitionOutcome> {
        let mut request = self.load(request_id).await?;
        self.policy.authorize(Operation::Accept, actor, Some(&request))?;
        Self::ensure_status(&request, Operation::Accept, &[RepairStatus::Requested])?;

        let expected = request.version;
        let previous = request.status;
        request.assignee_id = Some(actor.id);
        request.estimated_days = payload.estimated_days;
        Self::apply(&mut request, RepairStatus::Accepted, Operation::Accept)?;

        let entry = Self::entry(&request, WorkflowAction::Accepted, actor, previous, payload.comment);
        self.repo.commit_transition(&request, expected, &entry).await?;

        self.notify(
            &request,
            &[RecipientSelector::OrgMembers(request.requester_org)],
            AlertCategory::RepairAccepted,
            "Repair request accepted",
        )
        .await;

        Ok(TransitionOutcome::new(request))
    }

    /// Begin the physical repair.
    pub async fn start(&self, request_id: Uuid, actor: &Actor) -> DomainResult<TransitionOutcome> {
        let mut request = self.load(request_id).await?;
        self.policy.authorize(Operation::Start, actor, Some(&request))?;
        Self::ensure_status(&request, Operation::Start, &[RepairStatus::Accepted])?;

        let expected = request.version;
        let previous = request.status;
        Self::apply(&mut request, RepairStatus::InProgress, Operation::Start)?;

        let entry = Self::entry(&request, WorkflowAction::Started, actor, previous, None);
        self.repo.commit_transition(&request, expected, &entry).await?;

        self.notify(
            &request,
            &[RecipientSelector::OrgMembers(request.requester_org)],
            AlertCategory::RepairStarted,
            "Repair started",
        )
        .await;

        Ok(TransitionOutcome::new(request))
    }

    /// Finish the repair, optionally recording cost and the undisputed
    /// liability ratio.
    pub async fn complete(
        &self,
        request_id: Uuid,
        actor: &Actor,
        payload: CompleteRequest,
    ) -> DomainResult<TransitionOutcome> {
        let mut request = self.load(request_id).await?;
        self.policy.authorize(Operation::Complete, actor, Some(&request))?;
        Self::ensure_status(&request, Operation::Complete, &[RepairStatus::InProgress])?;

        if let Some(cost) = payload.repair_cost {
            if cost < 0 {
                return Err(DomainError::Validation(format!("repair_cost {cost} is negative")));
            }
        }
        if let Some(ratio) = payload.liability_ratio {
            Self::check_ratio(ratio, "liability_ratio")?;
            // Once a discussion exists the sub-flow is the sole ratio writer.
            if request.liability.is_some() {
                return Err(DomainError::Validation(
                    "liability_ratio must be settled through the open liability discussion"
                        .to_string(),
                ));
            }
        }

        let expected = request.version;
        let previous = request.status;
        // A re-completion after a liability detour keeps earlier values
        // unless the payload carries new ones.
        if let Some(cost) = payload.repair_cost {
            request.repair_cost = Some(cost);
        }
        if let Some(ratio) = payload.liability_ratio {
            request.liability_ratio = Some(ratio);
        }
        Self::apply(&mut request, RepairStatus::Completed, Operation::Complete)?;

        let entry = Self::entry(&request, WorkflowAction::Completed, actor, previous, payload.comment);
        self.repo.commit_transition(&request, expected, &entry).await?;

        self.notify(
            &request,
            &[RecipientSelector::OrgMembers(request.requester_org)],
            AlertCategory::RepairCompleted,
            "Repair completed",
        )
        .await;

        Ok(TransitionOutcome::new(request))
    }

    /// Confirm a completed repair on behalf of the requesting organization.
    pub async fn confirm(
        &self,
        request_id: Uuid,
        actor: &Actor,
        payload: ConfirmRequest,
    ) -> DomainResult<TransitionOutcome> {
        let mut request = self.load(request_id).await?;
        self.policy.authorize(Operation::Confirm, actor, Some(&request))?;
        Self::ensure_status(&request, Operation::Confirm, &[RepairStatus::Completed])?;

        if let Some(score) = payload.satisfaction_score {
            if !SATISFACTION_RANGE.contains(&score) {
                return Err(DomainError::Validation(format!(
                    "satisfaction_score {score} outside 1-5"
                )));
            }
        }

        let expected = request.version;
        let previous = request.status;
        request.satisfaction_score = payload.satisfaction_score;
        Self::apply(&mut request, RepairStatus::Confirmed, Operation::Confirm)?;

        let entry = Self::entry(&request, WorkflowAction::Confirmed, actor, previous, payload.comment);
        self.repo.commit_transition(&request, expected, &entry).await?;

        self.notify(
            &request,
            &[RecipientSelector::OrgMembers(request.executor_org)],
            AlertCategory::RepairConfirmed,
            "Repair confirmed",
        )
        .await;

        Ok(TransitionOutcome::new(request))
    }

    /// Reject a requested repair before work starts.
    pub async fn reject(
        &self,
        request_id: Uuid,
        actor: &Actor,
        reason: String,
    ) -> DomainResult<TransitionOutcome> {
        let mut request = self.load(request_id).await?;
        self.policy.authorize(Operation::Reject, actor, Some(&request))?;
        Self::ensure_status(&request, Operation::Reject, &[RepairStatus::Requested])?;

        if reason.trim().is_empty() {
            return Err(DomainError::Validation("rejection reason cannot be empty".to_string()));
        }

        let expected = request.version;
        let previous = request.status;
        request.rejection_reason = Some(reason.clone());
        Self::stamp_coordinator(&mut request, actor);
        Self::apply(&mut request, RepairStatus::Rejected, Operation::Reject)?;

        let entry = Self::entry(&request, WorkflowAction::Rejected, actor, previous, Some(reason));
        self.repo.commit_transition(&request, expected, &entry).await?;

        self.notify(
            &request,
            &[RecipientSelector::OrgMembers(request.requester_org)],
            AlertCategory::RepairRejected,
            "Repair request rejected",
        )
        .await;

        Ok(TransitionOutcome::new(request))
    }

    /// Open a liability discussion, pausing the execution pipeline.
    pub async fn open_liability_discussion(
        &self,
        request_id: Uuid,
        actor: &Actor,
        payload: OpenLiabilityRequest,
    ) -> DomainResult<TransitionOutcome> {
        let mut request = self.load(request_id).await?;
        self.policy.authorize(Operation::OpenLiabilityDiscussion, actor, Some(&request))?;
        Self::ensure_status(
            &request,
            Operation::OpenLiabilityDiscussion,
            &[RepairStatus::InProgress, RepairStatus::Completed],
        )?;

        if payload.reason.trim().is_empty() {
            return Err(DomainError::Validation("liability reason cannot be empty".to_string()));
        }
        if let Some(ratio) = payload.proposed_ratio {
            Self::check_ratio(ratio, "proposed_ratio")?;
        }

        let expected = request.version;
        let previous = request.status;
        Self::stamp_coordinator(&mut request, actor);
        request.liability = Some(LiabilityRecord::open(
            actor.id,
            previous,
            payload.reason.clone(),
            payload.proposed_ratio,
        ));
        Self::apply(&mut request, RepairStatus::LiabilityDiscussion, Operation::OpenLiabilityDiscussion)?;

        let entry = Self::entry(
            &request,
            WorkflowAction::LiabilityOpened,
            actor,
            previous,
            Some(payload.reason),
        );
        self.repo.commit_transition(&request, expected, &entry).await?;

        self.notify(
            &request,
            &[
                RecipientSelector::OrgMembers(request.requester_org),
                RecipientSelector::OrgMembers(request.executor_org),
            ],
            AlertCategory::LiabilityOpened,
            "Liability discussion opened",
        )
        .await;

        Ok(TransitionOutcome::new(request))
    }

    /// Resolve the open liability discussion and resume execution.
    pub async fn resolve_liability(
        &self,
        request_id: Uuid,
        actor: &Actor,
        payload: ResolveLiabilityRequest,
    ) -> DomainResult<TransitionOutcome> {
        let mut request = self.load(request_id).await?;
        self.policy.authorize(Operation::ResolveLiability, actor, Some(&request))?;
        Self::ensure_status(
            &request,
            Operation::ResolveLiability,
            &[RepairStatus::LiabilityDiscussion],
        )?;

        Self::check_ratio(payload.final_ratio, "final_liability_ratio")?;
        if payload.resolution.trim().is_empty() {
            return Err(DomainError::Validation("resolution narrative cannot be empty".to_string()));
        }
        let mut record = request.liability.clone().ok_or_else(|| {
            DomainError::Validation("no open liability discussion on this request".to_string())
        })?;

        let expected = request.version;
        let previous = request.status;
        record.resolve(actor.id, payload.final_ratio, payload.resolution.clone());
        request.liability = Some(record);
        request.liability_ratio = Some(payload.final_ratio);
        Self::stamp_coordinator(&mut request, actor);
        Self::apply(&mut request, RepairStatus::InProgress, Operation::ResolveLiability)?;

        let entry = Self::entry(
            &request,
            WorkflowAction::LiabilityResolved,
            actor,
            previous,
            Some(payload.resolution),
        );
        self.repo.commit_transition(&request, expected, &entry).await?;

        self.notify(
            &request,
            &[
                RecipientSelector::OrgMembers(request.requester_org),
                RecipientSelector::OrgMembers(request.executor_org),
            ],
            AlertCategory::LiabilityResolved,
            "Liability discussion resolved",
        )
        .await;

        Ok(TransitionOutcome::new(request))
    }

    /// Get a request by id.
    pub async fn get(&self, request_id: Uuid) -> DomainResult<RepairRequest> {
        self.load(request_id).await
    }

    /// List requests matching the filter.
    pub async fn list(&self, filter: RepairFilter) -> DomainResult<Vec<RepairRequest>> {
        self.repo.list(filter).await
    }

    /// Count requests per status.
    pub async fn count_by_status(
        &self,
    ) -> DomainResult<std::collections::HashMap<RepairStatus, u64>> {
        self.repo.count_by_status().await
    }

    async fn load(&self, request_id: Uuid) -> DomainResult<RepairRequest> {
        self.repo
            .get(request_id)
            .await?
            .ok_or(DomainError::NotFound(request_id))
    }

    fn ensure_status(
        request: &RepairRequest,
        operation: Operation,
        allowed: &[RepairStatus],
    ) -> DomainResult<()> {
        if allowed.contains(&request.status) {
            Ok(())
        } else {
            Err(DomainError::InvalidStateTransition {
                operation: operation.as_str().to_string(),
                current: request.status.as_str().to_string(),
            })
        }
    }

    fn apply(
        request: &mut RepairRequest,
        new_status: RepairStatus,
        operation: Operation,
    ) -> DomainResult<()> {
        request
            .transition_to(new_status)
            .map_err(|_| DomainError::InvalidStateTransition {
                operation: operation.as_str().to_string(),
                current: request.status.as_str().to_string(),
            })
    }

    fn check_ratio(ratio: u8, field: &str) -> DomainResult<()> {
        if LIABILITY_RANGE.contains(&ratio) {
            Ok(())
        } else {
            Err(DomainError::Validation(format!("{field} {ratio} outside 0-100")))
        }
    }

    /// Record the coordinating authority on first contact.
    fn stamp_coordinator(request: &mut RepairRequest, actor: &Actor) {
        if actor.is_coordinator() && request.coordinator_id.is_none() {
            request.coordinator_id = Some(actor.id);
        }
    }

    fn entry(
        request: &RepairRequest,
        action: WorkflowAction,
        actor: &Actor,
        previous: RepairStatus,
        comment: Option<String>,
    ) -> WorkflowHistoryEntry {
        let mut entry = WorkflowHistoryEntry::transition(
            request.id,
            action,
            actor,
            previous.as_str(),
            request.status.as_str(),
        );
        if let Some(comment) = comment {
            entry = entry.with_comment(comment);
        }
        entry
    }

    /// Post-commit notification fan-out. Failures are logged, never
    /// propagated: the transition has already durably committed.
    async fn notify(
        &self,
        request: &RepairRequest,
        selectors: &[RecipientSelector],
        category: AlertCategory,
        title: &str,
    ) {
        let mold = self.mold_label(request.mold_id).await;
        let body = format!("{} (mold {}): {}", title, mold, request.title);
        let severity = AlertSeverity::from(request.priority);

        if let Err(err) = self
            .dispatcher
            .dispatch(selectors, category, severity, title, &body, Some(request.id))
            .await
        {
            tracing::error!(
                request_id = %request.id,
                category = category.as_str(),
                error = %err,
                "notification dispatch failed after committed transition"
            );
        }
    }

    async fn mold_label(&self, mold_id: Uuid) -> String {
        match self.catalog.display_name(mold_id).await {
            Ok(Some(name)) => name,
            Ok(None) => mold_id.to_string(),
            Err(err) => {
                tracing::warn!(mold_id = %mold_id, error = %err, "mold catalog lookup failed");
                mold_id.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::directory::{StaticDirectory, StaticMoldCatalog};
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteNotificationRepository, SqliteRepairRequestRepository,
    };
    use crate::domain::models::ActorRole;
    use crate::services::authorization::RolePolicy;

    type TestEngine = WorkflowEngine<
        SqliteRepairRequestRepository,
        SqliteNotificationRepository,
        StaticDirectory,
        StaticMoldCatalog,
        RolePolicy,
    >;

    struct Fixture {
        engine: TestEngine,
        notifications: Arc<SqliteNotificationRepository>,
        requester: Actor,
        executor: Actor,
        coordinator: Actor,
        requester_member: Uuid,
        executor_member: Uuid,
    }

    async fn setup() -> Fixture {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = Arc::new(SqliteRepairRequestRepository::new(pool.clone()));
        let notifications = Arc::new(SqliteNotificationRepository::new(pool));

        let requester = Actor::new(Uuid::new_v4(), Uuid::new_v4(), ActorRole::Requester);
        let executor = Actor::new(Uuid::new_v4(), Uuid::new_v4(), ActorRole::Executor);
        let coordinator = Actor::new(Uuid::new_v4(), Uuid::new_v4(), ActorRole::Coordinator);
        let requester_member = Uuid::new_v4();
        let executor_member = Uuid::new_v4();

        let directory = Arc::new(
            StaticDirectory::new()
                .with_org(requester.org, vec![requester_member])
                .with_org(executor.org, vec![executor_member]),
        );
        let dispatcher = AlertDispatcher::new(notifications.clone(), directory);
        let catalog = Arc::new(StaticMoldCatalog::new());

        Fixture {
            engine: WorkflowEngine::new(repo, dispatcher, catalog, RolePolicy::new()),
            notifications,
            requester,
            executor,
            coordinator,
            requester_member,
            executor_member,
        }
    }

    fn create_payload(executor_org: Uuid) -> CreateRequest {
        CreateRequest {
            mold_id: Uuid::new_v4(),
            executor_org,
            title: "Gate wear".to_string(),
            description: "Gate insert worn beyond tolerance".to_string(),
            category: IssueCategory::Wear,
            priority: RepairPriority::Normal,
        }
    }

    async fn create_in_progress(fx: &Fixture) -> Uuid {
        let outcome = fx
            .engine
            .create(&fx.requester, create_payload(fx.executor.org))
            .await
            .unwrap();
        let id = outcome.request.id;
        fx.engine.accept(id, &fx.executor, AcceptRequest::default()).await.unwrap();
        fx.engine.start(id, &fx.executor).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_end_to_end_success_path() {
        let fx = setup().await;

        let outcome = fx
            .engine
            .create(&fx.requester, create_payload(fx.executor.org))
            .await
            .unwrap();
        assert_eq!(outcome.request.status, RepairStatus::Requested);
        assert_eq!(outcome.hints, vec![QuickAction::Accept]);
        let id = outcome.request.id;

        let outcome = fx
            .engine
            .accept(id, &fx.executor, AcceptRequest { estimated_days: Some(5), comment: None })
            .await
            .unwrap();
        assert_eq!(outcome.request.status, RepairStatus::Accepted);
        assert_eq!(outcome.request.assignee_id, Some(fx.executor.id));
        assert_eq!(outcome.request.estimated_days, Some(5));

        let outcome = fx.engine.start(id, &fx.executor).await.unwrap();
        assert_eq!(outcome.request.status, RepairStatus::InProgress);

        let outcome = fx
            .engine
            .complete(
                id,
                &fx.executor,
                CompleteRequest { repair_cost: Some(120_000), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(outcome.request.status, RepairStatus::Completed);
        assert_eq!(outcome.request.repair_cost, Some(120_000));

        // One notification reached the requester org.
        let inbox = fx
            .notifications
            .list_for_recipient(fx.requester_member, true)
            .await
            .unwrap();
        assert!(inbox.iter().any(|n| n.category == AlertCategory::RepairCompleted));

        let outcome = fx
            .engine
            .confirm(id, &fx.requester, ConfirmRequest { satisfaction_score: Some(4), comment: None })
            .await
            .unwrap();
        assert_eq!(outcome.request.status, RepairStatus::Confirmed);
        assert!(outcome.request.confirmed_at.is_some());
        assert!(outcome.request.rejected_at.is_none());
        assert!(outcome.request.completed_at.unwrap() <= outcome.request.confirmed_at.unwrap());
        assert!(outcome.hints.is_empty());

        // Terminal: a second confirm fails on the precondition.
        let err = fx
            .engine
            .confirm(id, &fx.requester, ConfirmRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
    }

    #[tokio::test]
    async fn test_liability_detour() {
        let fx = setup().await;
        let id = create_in_progress(&fx).await;

        let outcome = fx
            .engine
            .open_liability_discussion(
                id,
                &fx.requester,
                OpenLiabilityRequest { reason: "cost dispute".to_string(), proposed_ratio: None },
            )
            .await
            .unwrap();
        assert_eq!(outcome.request.status, RepairStatus::LiabilityDiscussion);
        assert_eq!(outcome.hints, vec![QuickAction::ResolveLiability]);

        // Execution is paused while the dispute is open.
        let err = fx
            .engine
            .complete(id, &fx.executor, CompleteRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));

        let outcome = fx
            .engine
            .resolve_liability(
                id,
                &fx.coordinator,
                ResolveLiabilityRequest { final_ratio: 50, resolution: "split".to_string() },
            )
            .await
            .unwrap();
        assert_eq!(outcome.request.status, RepairStatus::InProgress);
        assert_eq!(outcome.request.liability_ratio, Some(50));
        assert_eq!(outcome.request.coordinator_id, Some(fx.coordinator.id));
        let record = outcome.request.liability.unwrap();
        assert!(record.is_resolved());
        assert_eq!(record.final_ratio, Some(50));
    }

    #[tokio::test]
    async fn test_resolve_liability_rejects_out_of_range_ratio() {
        let fx = setup().await;
        let id = create_in_progress(&fx).await;
        fx.engine
            .open_liability_discussion(
                id,
                &fx.requester,
                OpenLiabilityRequest { reason: "dispute".to_string(), proposed_ratio: None },
            )
            .await
            .unwrap();

        let err = fx
            .engine
            .resolve_liability(
                id,
                &fx.coordinator,
                ResolveLiabilityRequest { final_ratio: 150, resolution: "split".to_string() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Status unchanged by the failed call.
        let request = fx.engine.get(id).await.unwrap();
        assert_eq!(request.status, RepairStatus::LiabilityDiscussion);
        assert_eq!(request.liability_ratio, None);
    }

    #[tokio::test]
    async fn test_inline_ratio_blocked_after_discussion() {
        let fx = setup().await;
        let id = create_in_progress(&fx).await;

        fx.engine
            .open_liability_discussion(
                id,
                &fx.executor,
                OpenLiabilityRequest { reason: "dispute".to_string(), proposed_ratio: Some(30) },
            )
            .await
            .unwrap();
        fx.engine
            .resolve_liability(
                id,
                &fx.coordinator,
                ResolveLiabilityRequest { final_ratio: 30, resolution: "agreed".to_string() },
            )
            .await
            .unwrap();

        // The discussion is the sole ratio writer from here on.
        let err = fx
            .engine
            .complete(
                id,
                &fx.executor,
                CompleteRequest { liability_ratio: Some(60), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Completing without a ratio keeps the agreed one.
        let outcome = fx
            .engine
            .complete(id, &fx.executor, CompleteRequest::default())
            .await
            .unwrap();
        assert_eq!(outcome.request.liability_ratio, Some(30));
    }

    #[tokio::test]
    async fn test_reject_only_from_requested() {
        let fx = setup().await;

        let outcome = fx
            .engine
            .create(&fx.requester, create_payload(fx.executor.org))
            .await
            .unwrap();
        let id = outcome.request.id;

        let err = fx.engine.reject(id, &fx.coordinator, String::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let outcome = fx
            .engine
            .reject(id, &fx.coordinator, "mold scheduled for scrapping".to_string())
            .await
            .unwrap();
        assert_eq!(outcome.request.status, RepairStatus::Rejected);
        assert!(outcome.request.rejected_at.is_some());
        assert!(outcome.request.confirmed_at.is_none());
        assert_eq!(outcome.request.coordinator_id, Some(fx.coordinator.id));

        // A second request that already advanced cannot be rejected.
        let id = create_in_progress(&fx).await;
        let err = fx
            .engine
            .reject(id, &fx.coordinator, "too late".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
    }

    #[tokio::test]
    async fn test_unauthorized_actor_rejected_before_state_checks() {
        let fx = setup().await;
        let outcome = fx
            .engine
            .create(&fx.requester, create_payload(fx.executor.org))
            .await
            .unwrap();
        let id = outcome.request.id;

        // A different executor org may not accept.
        let stranger = Actor::new(Uuid::new_v4(), Uuid::new_v4(), ActorRole::Executor);
        let err = fx
            .engine
            .accept(id, &stranger, AcceptRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_not_found() {
        let fx = setup().await;
        let err = fx.engine.start(Uuid::new_v4(), &fx.executor).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_notification_dispatched_to_executor_on_create() {
        let fx = setup().await;
        fx.engine
            .create(&fx.requester, create_payload(fx.executor.org))
            .await
            .unwrap();

        let inbox = fx
            .notifications
            .list_for_recipient(fx.executor_member, true)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].category, AlertCategory::RepairRequested);
    }
}
