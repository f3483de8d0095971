//! CLI command handlers.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::sqlite::{
    initialize_database, SqliteAuditLogRepository, SqliteNotificationRepository,
    SqliteRepairRequestRepository,
};
use crate::adapters::{NullMoldCatalog, OrgInboxDirectory};
use crate::cli::display;
use crate::domain::models::{
    Actor, Config, IssueCategory, RepairPriority, RepairStatus, REPAIR_REQUEST_KIND,
};
use crate::domain::ports::RepairFilter;
use crate::services::{
    AcceptRequest, AlertDispatcher, AuditRecorder, CompleteRequest, ConfirmRequest, CreateRequest,
    OpenLiabilityRequest, ResolveLiabilityRequest, RolePolicy, TransitionOutcome, WorkflowEngine,
};

type CliEngine = WorkflowEngine<
    SqliteRepairRequestRepository,
    SqliteNotificationRepository,
    OrgInboxDirectory,
    NullMoldCatalog,
    RolePolicy,
>;

/// Wired-up services behind the CLI.
pub struct AppContext {
    pub engine: CliEngine,
    pub recorder: AuditRecorder<SqliteAuditLogRepository>,
    pub notifications: Arc<SqliteNotificationRepository>,
}

impl AppContext {
    /// Connect to the configured database and wire the services.
    pub async fn init(config: &Config) -> Result<Self> {
        let pool = initialize_database(&config.database_url())
            .await
            .context("Failed to initialize database")?;

        let repo = Arc::new(SqliteRepairRequestRepository::new(pool.clone()));
        let notifications = Arc::new(SqliteNotificationRepository::new(pool.clone()));
        let audit = Arc::new(SqliteAuditLogRepository::new(pool));

        let dispatcher = AlertDispatcher::new(notifications.clone(), Arc::new(OrgInboxDirectory))
            .with_dedup_window_hours(config.alerts.dedup_window_hours);

        Ok(Self {
            engine: WorkflowEngine::new(
                repo,
                dispatcher,
                Arc::new(NullMoldCatalog),
                RolePolicy::new(),
            ),
            recorder: AuditRecorder::new(audit),
            notifications,
        })
    }
}

#[derive(Args)]
pub struct RequestArgs {
    #[command(subcommand)]
    pub command: RequestCommand,
}

#[derive(Subcommand, Clone)]
pub enum RequestCommand {
    /// File a new repair request
    Create {
        #[arg(long)]
        mold_id: Uuid,
        /// Mold maker organization the request is addressed to
        #[arg(long)]
        executor_org: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// wear, crack, dimension, surface, mechanism, other
        #[arg(long, default_value = "other")]
        category: String,
        /// low, normal, high, urgent
        #[arg(long, default_value = "normal")]
        priority: String,
    },
    /// Accept a requested repair
    Accept {
        id: Uuid,
        #[arg(long)]
        estimated_days: Option<u32>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Begin the physical repair
    Start { id: Uuid },
    /// Finish the repair
    Complete {
        id: Uuid,
        #[arg(long)]
        repair_cost: Option<i64>,
        #[arg(long)]
        liability_ratio: Option<u8>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Confirm a completed repair
    Confirm {
        id: Uuid,
        #[arg(long)]
        satisfaction_score: Option<u8>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Reject a requested repair
    Reject {
        id: Uuid,
        #[arg(long)]
        reason: String,
    },
    /// File a manual audit note on a request
    Note {
        id: Uuid,
        #[arg(long)]
        comment: String,
    },
    /// Show one repair request
    Show { id: Uuid },
    /// List repair requests
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value = "50")]
        limit: i64,
    },
}

#[derive(Args)]
pub struct LiabilityArgs {
    #[command(subcommand)]
    pub command: LiabilityCommand,
}

#[derive(Subcommand, Clone)]
pub enum LiabilityCommand {
    /// Open a liability discussion on a request
    Open {
        id: Uuid,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        proposed_ratio: Option<u8>,
    },
    /// Resolve the open liability discussion
    Resolve {
        id: Uuid,
        #[arg(long)]
        final_ratio: u8,
        #[arg(long)]
        resolution: String,
    },
}

#[derive(Args)]
pub struct HistoryArgs {
    pub id: Uuid,
}

#[derive(Args)]
pub struct NotificationArgs {
    #[command(subcommand)]
    pub command: NotificationCommand,
}

#[derive(Subcommand, Clone)]
pub enum NotificationCommand {
    /// List notifications for a recipient
    List {
        #[arg(long)]
        recipient: Uuid,
        #[arg(long)]
        unread: bool,
    },
    /// Mark a notification as read
    Read {
        id: Uuid,
        #[arg(long)]
        recipient: Uuid,
    },
    /// Delete a notification
    Delete {
        id: Uuid,
        #[arg(long)]
        recipient: Uuid,
    },
}

fn print_outcome(outcome: &TransitionOutcome, json: bool) -> Result<()> {
    if json {
        let hints: Vec<&str> = outcome.hints.iter().map(|h| h.as_str()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "request": outcome.request,
                "hints": hints,
            }))?
        );
    } else {
        println!("Request {}", outcome.request.id);
        println!("  Status: {}", display::styled_status(outcome.request.status));
        if !outcome.hints.is_empty() {
            let hints: Vec<&str> = outcome.hints.iter().map(|h| h.as_str()).collect();
            println!("  Next: {}", hints.join(", "));
        }
    }
    Ok(())
}

pub async fn execute_request(
    ctx: &AppContext,
    actor: &Actor,
    command: RequestCommand,
    json: bool,
) -> Result<()> {
    match command {
        RequestCommand::Create {
            mold_id,
            executor_org,
            title,
            description,
            category,
            priority,
        } => {
            let category = IssueCategory::from_str(&category)
                .ok_or_else(|| anyhow::anyhow!("unknown category '{category}'"))?;
            let priority = RepairPriority::from_str(&priority)
                .ok_or_else(|| anyhow::anyhow!("unknown priority '{priority}'"))?;
            let outcome = ctx
                .engine
                .create(actor, CreateRequest {
                    mold_id,
                    executor_org,
                    title,
                    description,
                    category,
                    priority,
                })
                .await?;
            print_outcome(&outcome, json)
        }
        RequestCommand::Accept { id, estimated_days, comment } => {
            let outcome = ctx
                .engine
                .accept(id, actor, AcceptRequest { estimated_days, comment })
                .await?;
            print_outcome(&outcome, json)
        }
        RequestCommand::Start { id } => {
            let outcome = ctx.engine.start(id, actor).await?;
            print_outcome(&outcome, json)
        }
        RequestCommand::Complete { id, repair_cost, liability_ratio, comment } => {
            let outcome = ctx
                .engine
                .complete(id, actor, CompleteRequest { repair_cost, liability_ratio, comment })
                .await?;
            print_outcome(&outcome, json)
        }
        RequestCommand::Confirm { id, satisfaction_score, comment } => {
            let outcome = ctx
                .engine
                .confirm(id, actor, ConfirmRequest { satisfaction_score, comment })
                .await?;
            print_outcome(&outcome, json)
        }
        RequestCommand::Reject { id, reason } => {
            let outcome = ctx.engine.reject(id, actor, reason).await?;
            print_outcome(&outcome, json)
        }
        RequestCommand::Note { id, comment } => {
            // The request must exist; the note is a business action, not
            // best-effort logging.
            ctx.engine.get(id).await?;
            let entry = ctx
                .recorder
                .record_note(REPAIR_REQUEST_KIND, id, actor, comment)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                println!("Note recorded on request {id}.");
            }
            Ok(())
        }
        RequestCommand::Show { id } => {
            let request = ctx.engine.get(id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&request)?);
            } else {
                println!("Request {}", request.id);
                println!("  Title: {}", request.title);
                println!("  Status: {}", display::styled_status(request.status));
                println!("  Priority: {}", request.priority.as_str());
                println!("  Category: {}", request.category.as_str());
                println!("  Mold: {}", request.mold_id);
                println!("  Requester org: {}", request.requester_org);
                println!("  Executor org: {}", request.executor_org);
                if let Some(cost) = request.repair_cost {
                    println!("  Repair cost: {cost}");
                }
                if let Some(ratio) = request.liability_ratio {
                    println!("  Liability ratio: {ratio}%");
                }
                if let Some(reason) = &request.rejection_reason {
                    println!("  Rejection reason: {reason}");
                }
            }
            Ok(())
        }
        RequestCommand::List { status, limit } => {
            let status = status
                .map(|s| {
                    RepairStatus::from_str(&s)
                        .ok_or_else(|| anyhow::anyhow!("unknown status '{s}'"))
                })
                .transpose()?;
            let requests = ctx
                .engine
                .list(RepairFilter { status, limit: Some(limit), ..Default::default() })
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&requests)?);
            } else if requests.is_empty() {
                println!("No repair requests found.");
            } else {
                println!("{}", display::format_request_table(&requests));
                println!("\nShowing {} request(s)", requests.len());
            }
            Ok(())
        }
    }
}

pub async fn execute_liability(
    ctx: &AppContext,
    actor: &Actor,
    command: LiabilityCommand,
    json: bool,
) -> Result<()> {
    match command {
        LiabilityCommand::Open { id, reason, proposed_ratio } => {
            let outcome = ctx
                .engine
                .open_liability_discussion(id, actor, OpenLiabilityRequest { reason, proposed_ratio })
                .await?;
            print_outcome(&outcome, json)
        }
        LiabilityCommand::Resolve { id, final_ratio, resolution } => {
            let outcome = ctx
                .engine
                .resolve_liability(id, actor, ResolveLiabilityRequest { final_ratio, resolution })
                .await?;
            print_outcome(&outcome, json)
        }
    }
}

pub async fn execute_history(ctx: &AppContext, args: HistoryArgs, json: bool) -> Result<()> {
    let history = ctx.recorder.history_for(args.id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else if history.is_empty() {
        println!("No history for request {}.", args.id);
    } else {
        println!("{}", display::format_history_table(&history));
    }
    Ok(())
}

pub async fn execute_notifications(
    ctx: &AppContext,
    command: NotificationCommand,
    json: bool,
) -> Result<()> {
    use crate::domain::ports::NotificationRepository;

    match command {
        NotificationCommand::List { recipient, unread } => {
            let notifications = ctx.notifications.list_for_recipient(recipient, unread).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&notifications)?);
            } else if notifications.is_empty() {
                println!("No notifications.");
            } else {
                println!("{}", display::format_notification_table(&notifications));
            }
        }
        NotificationCommand::Read { id, recipient } => {
            ctx.notifications.mark_read(id, recipient).await?;
            if !json {
                println!("Notification {id} marked read.");
            }
        }
        NotificationCommand::Delete { id, recipient } => {
            ctx.notifications.delete(id, recipient).await?;
            if !json {
                println!("Notification {id} deleted.");
            }
        }
    }
    Ok(())
}
