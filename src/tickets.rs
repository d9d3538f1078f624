//! Support tickets.
//!
//! Tickets sit apart from the project/task hierarchy: they reference the
//! submitting user only, and resolution raises a support notification so
//! the submitter sees the outcome.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::ids;
use crate::model::{new_storage_key, EntityId, NotificationKind, Priority, SupportTicket, TicketStatus};
use crate::notify::{self, FanOut};
use crate::store::{Collection, ResourceStore};

/// Input for filing a ticket.
#[derive(Debug, Clone)]
pub struct TicketInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

pub fn create<S: ResourceStore>(
    store: &S,
    submitted_by: EntityId,
    input: TicketInput,
) -> Result<SupportTicket> {
    if input.title.trim().is_empty() {
        return Err(Error::validation("title", "title cannot be empty"));
    }

    let title = input.title.trim().to_string();
    let description = input.description.trim().to_string();
    let created_date = Utc::now();

    let ticket = ids::create_with_retry(store, Collection::SupportTickets, |id| SupportTicket {
        id,
        storage_id: new_storage_key(),
        title: title.clone(),
        description: description.clone(),
        assigned_by: submitted_by,
        status: TicketStatus::Open,
        priority: input.priority,
        created_date,
    })?;

    // Ack the submitter; a fan-out failure here is logged, not fatal.
    if let Err(err) = notify::fan_out(
        store,
        FanOut {
            recipients: vec![submitted_by],
            kind: NotificationKind::Support,
            title: format!("Ticket #{} received", ticket.id),
            description: format!("Your ticket '{}' was filed", ticket.title),
            created_by: submitted_by,
        },
    ) {
        tracing::warn!(ticket = ticket.id, error = %err, "ticket notification failed");
    }

    Ok(ticket)
}

/// All tickets, newest first.
pub fn list<S: ResourceStore>(store: &S) -> Result<Vec<SupportTicket>> {
    let mut tickets = store.list_as::<SupportTicket>(Collection::SupportTickets)?;
    tickets.sort_by(|a, b| {
        b.created_date
            .cmp(&a.created_date)
            .then(b.id.cmp(&a.id))
    });
    Ok(tickets)
}

/// Move a ticket to a new status, notifying the submitter on resolution.
pub fn set_status<S: ResourceStore>(
    store: &S,
    ticket_id: EntityId,
    status: TicketStatus,
) -> Result<SupportTicket> {
    let existing = store
        .list_as::<SupportTicket>(Collection::SupportTickets)?
        .into_iter()
        .find(|ticket| ticket.id == ticket_id)
        .ok_or(Error::NotFound {
            entity: "ticket",
            id: ticket_id,
        })?;

    let mut updated = existing.clone();
    updated.status = status;
    let ticket = store.update_as(Collection::SupportTickets, &existing.storage_id, &updated)?;

    if status == TicketStatus::Resolved {
        if let Err(err) = notify::fan_out(
            store,
            FanOut {
                recipients: vec![ticket.assigned_by],
                kind: NotificationKind::Support,
                title: format!("Ticket #{} resolved", ticket.id),
                description: format!("Your ticket '{}' was resolved", ticket.title),
                created_by: ticket.assigned_by,
            },
        ) {
            tracing::warn!(ticket = ticket.id, error = %err, "resolution notification failed");
        }
    }

    Ok(ticket)
}
