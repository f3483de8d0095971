//! Table rendering for CLI list output.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;

use crate::domain::models::{Notification, RepairRequest, RepairStatus, WorkflowHistoryEntry};

/// Create a borderless list table with the given headers.
fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Styled status label.
pub fn styled_status(status: RepairStatus) -> String {
    let label = status.as_str();
    match status {
        RepairStatus::Confirmed => style(label).green().to_string(),
        RepairStatus::Rejected => style(label).red().to_string(),
        RepairStatus::LiabilityDiscussion => style(label).yellow().to_string(),
        _ => style(label).cyan().to_string(),
    }
}

pub fn format_request_table(requests: &[RepairRequest]) -> String {
    let mut table = list_table(&["id", "title", "status", "priority", "mold", "requested"]);
    for request in requests {
        table.add_row(vec![
            request.id.to_string(),
            request.title.clone(),
            styled_status(request.status),
            request.priority.as_str().to_string(),
            request.mold_id.to_string(),
            request.requested_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_history_table(entries: &[WorkflowHistoryEntry]) -> String {
    let mut table = list_table(&["when", "action", "from", "to", "actor", "comment"]);
    for entry in entries {
        table.add_row(vec![
            entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.action.as_str().to_string(),
            entry.previous_value.clone().unwrap_or_default(),
            entry.new_value.clone().unwrap_or_default(),
            entry.actor_id.to_string(),
            entry.comment.clone().unwrap_or_default(),
        ]);
    }
    table.to_string()
}

pub fn format_notification_table(notifications: &[Notification]) -> String {
    let mut table = list_table(&["id", "category", "severity", "title", "read", "created"]);
    for notification in notifications {
        table.add_row(vec![
            notification.id.to_string(),
            notification.category.as_str().to_string(),
            notification.severity.as_str().to_string(),
            notification.title.clone(),
            if notification.read { "yes" } else { "no" }.to_string(),
            notification.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table.to_string()
}
