//! trk user commands

use super::CommandContext;
use crate::error::{Error, Result};
use crate::model::{EntityId, Role};
use crate::output::{emit_success, HumanOutput};

pub fn run_add(
    ctx: &CommandContext,
    name: String,
    email: Option<String>,
    role: String,
) -> Result<()> {
    let handle = ctx.open_engine()?;
    let role: Role = role.parse().map_err(|_| {
        Error::InvalidArgument(format!("invalid role '{role}' (expected leader|member)"))
    })?;

    let user = handle.engine.create_user(&name, email, role)?;

    let mut human = HumanOutput::new(format!("trk user add: created user {}", user.id));
    human.push_summary("id", user.id.to_string());
    human.push_summary("name", user.name.clone());
    human.push_summary("role", format!("{:?}", user.role).to_lowercase());
    human.push_next_step(format!("trk actor set {}", user.id));

    emit_success(ctx.output_options(), "user add", &user, Some(&human))
}

pub fn run_update(
    ctx: &CommandContext,
    id: EntityId,
    name: String,
    email: Option<String>,
) -> Result<()> {
    let handle = ctx.open_engine()?;
    let user = handle.engine.update_user(id, &name, email)?;

    let mut human = HumanOutput::new(format!("trk user update: updated user {id}"));
    human.push_summary("name", user.name.clone());
    if let Some(email) = &user.email {
        human.push_summary("email", email.clone());
    }

    emit_success(ctx.output_options(), "user update", &user, Some(&human))
}

pub fn run_list(ctx: &CommandContext) -> Result<()> {
    let handle = ctx.open_engine()?;
    let users = handle.engine.list_users()?;

    let mut human = HumanOutput::new(format!("trk user list: {} user(s)", users.len()));
    for user in &users {
        human.push_detail(format!(
            "#{} {} ({:?})",
            user.id,
            user.name,
            user.role
        ));
    }

    emit_success(ctx.output_options(), "user list", &users, Some(&human))
}
