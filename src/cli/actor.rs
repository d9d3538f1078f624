//! trk actor command implementation
//!
//! Persists and shows the acting user id for the workspace.

use super::CommandContext;
use crate::error::Result;
use crate::model::EntityId;
use crate::output::{emit_success, HumanOutput};

pub fn run_set(ctx: &CommandContext, id: EntityId) -> Result<()> {
    let handle = ctx.open_engine()?;
    // The id must belong to a real user.
    let user = handle.engine.user(id)?;
    crate::actor::persist_actor(&handle.data_dir, id)?;

    let mut human = HumanOutput::new(format!("trk actor set: acting as user {id}"));
    human.push_summary("name", user.name.clone());

    emit_success(
        ctx.output_options(),
        "actor set",
        &serde_json::json!({ "actor": id }),
        Some(&human),
    )
}

pub fn run_show(ctx: &CommandContext) -> Result<()> {
    let handle = ctx.open_engine()?;
    let actor = ctx.acting_user(&handle.data_dir)?;
    let user = handle.engine.user(actor)?;

    let mut human = HumanOutput::new(format!("trk actor: user {actor}"));
    human.push_summary("name", user.name.clone());

    emit_success(ctx.output_options(), "actor show", &user, Some(&human))
}
