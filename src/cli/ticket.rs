//! trk ticket command implementations.

use super::CommandContext;
use crate::error::Result;
use crate::model::EntityId;
use crate::output::{emit_success, HumanOutput};
use crate::tickets::TicketInput;

pub fn run_add(
    ctx: &CommandContext,
    title: String,
    description: String,
    priority: String,
) -> Result<()> {
    let handle = ctx.open_engine()?;
    let actor = ctx.acting_user(&handle.data_dir)?;

    let input = TicketInput {
        title,
        description,
        priority: priority.parse()?,
    };
    let ticket = handle.engine.create_ticket(actor, input)?;

    let mut human = HumanOutput::new(format!("trk ticket add: filed ticket {}", ticket.id));
    human.push_summary("id", ticket.id.to_string());
    human.push_summary("title", ticket.title.clone());
    human.push_summary("priority", format!("{:?}", ticket.priority).to_lowercase());
    human.push_next_step(format!("trk ticket status {} resolved", ticket.id));

    emit_success(ctx.output_options(), "ticket add", &ticket, Some(&human))
}

pub fn run_list(ctx: &CommandContext) -> Result<()> {
    let handle = ctx.open_engine()?;
    let tickets = handle.engine.list_tickets()?;

    let mut human = HumanOutput::new(format!("trk ticket list: {} ticket(s)", tickets.len()));
    for ticket in &tickets {
        human.push_detail(format!(
            "#{} {} ({:?}, {:?}, by user {})",
            ticket.id, ticket.title, ticket.status, ticket.priority, ticket.assigned_by
        ));
    }

    emit_success(ctx.output_options(), "ticket list", &tickets, Some(&human))
}

pub fn run_status(ctx: &CommandContext, id: EntityId, status: String) -> Result<()> {
    let handle = ctx.open_engine()?;
    let actor = ctx.acting_user(&handle.data_dir)?;

    let ticket = handle.engine.resolve_ticket(actor, id, status.parse()?)?;

    let mut human = HumanOutput::new(format!(
        "trk ticket status: ticket {} is now {:?}",
        ticket.id, ticket.status
    ));
    human.push_summary("title", ticket.title.clone());

    emit_success(ctx.output_options(), "ticket status", &ticket, Some(&human))
}
