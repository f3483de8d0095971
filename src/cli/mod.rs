//! Command-line interface for the moldflow workflow engine.

pub mod commands;
pub mod display;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::domain::models::{Actor, ActorRole};

#[derive(Parser)]
#[command(name = "moldflow", about = "Repair workflow engine for industrial mold tooling", version)]
pub struct Cli {
    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file path (defaults to .moldflow/config.yaml hierarchy)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Acting user id
    #[arg(long, global = true)]
    pub actor: Option<Uuid>,

    /// Acting user's organization id
    #[arg(long, global = true)]
    pub org: Option<Uuid>,

    /// Acting user's role: requester, executor, coordinator
    #[arg(long, global = true)]
    pub role: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage repair requests
    Request(commands::RequestArgs),
    /// Manage liability discussions
    Liability(commands::LiabilityArgs),
    /// Show the workflow history of a repair request
    History(commands::HistoryArgs),
    /// Manage notifications
    Notifications(commands::NotificationArgs),
}

impl Cli {
    /// Build the acting identity from the attribution flags.
    pub fn acting_identity(&self) -> anyhow::Result<Actor> {
        let id = self.actor.ok_or_else(|| anyhow::anyhow!("--actor is required"))?;
        let org = self.org.ok_or_else(|| anyhow::anyhow!("--org is required"))?;
        let role = self
            .role
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--role is required"))?;
        let role = ActorRole::parse_str(role)
            .ok_or_else(|| anyhow::anyhow!("unknown role '{role}', expected requester, executor or coordinator"))?;
        Ok(Actor::new(id, org, role))
    }
}

/// Print an error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        eprintln!("{}", serde_json::json!({ "error": err.to_string() }));
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
