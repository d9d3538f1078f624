//! trk notify command implementations.

use super::CommandContext;
use crate::error::Result;
use crate::model::EntityId;
use crate::output::{emit_success, HumanOutput};

fn resolve_user(
    ctx: &CommandContext,
    data_dir: &std::path::Path,
    user: Option<EntityId>,
) -> Result<EntityId> {
    match user {
        Some(id) => Ok(id),
        None => ctx.acting_user(data_dir),
    }
}

pub fn run_list(ctx: &CommandContext, user: Option<EntityId>) -> Result<()> {
    let handle = ctx.open_engine()?;
    let user = resolve_user(ctx, &handle.data_dir, user)?;

    let notes = handle.engine.list_notifications_for(user)?;

    let mut human = HumanOutput::new(format!(
        "trk notify list: {} notification(s) for user {user}",
        notes.len()
    ));
    // Sender names are joined at display time; records only carry the id.
    let users = handle.engine.list_users()?;
    let sender_name = |id| {
        users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("user {id}"))
    };
    for note in &notes {
        human.push_detail(format!(
            "#{} [{:?}] {} from {} ({})",
            note.id,
            note.kind,
            note.title,
            sender_name(note.created_by),
            note.created_at.format("%Y-%m-%d %H:%M")
        ));
    }

    emit_success(ctx.output_options(), "notify list", &notes, Some(&human))
}

pub fn run_clear(ctx: &CommandContext, user: Option<EntityId>) -> Result<()> {
    let handle = ctx.open_engine()?;
    let user = resolve_user(ctx, &handle.data_dir, user)?;

    let report = handle.engine.dismiss_notifications_for(user)?;

    let mut human = HumanOutput::new(format!("trk notify clear: cleared for user {user}"));
    human.push_summary("dismissed", report.deleted.to_string());
    if report.failed > 0 {
        human.push_warning(format!("{} notification(s) could not be updated", report.failed));
    }

    emit_success(ctx.output_options(), "notify clear", &report, Some(&human))
}
