//! trk project command implementations.

use super::{parse_date, CommandContext};
use crate::engine::ProjectInput;
use crate::error::Result;
use crate::model::EntityId;
use crate::output::{emit_success, HumanOutput};

#[allow(clippy::too_many_arguments)]
pub fn run_add(
    ctx: &CommandContext,
    title: String,
    start: String,
    end: String,
    leader: EntityId,
    members: Vec<EntityId>,
) -> Result<()> {
    let handle = ctx.open_engine()?;
    let actor = ctx.acting_user(&handle.data_dir)?;

    let input = ProjectInput {
        title,
        start_date: parse_date(&start, "startDate")?,
        end_date: parse_date(&end, "endDate")?,
        leader_id: leader,
        members,
    };
    let write = handle.engine.create_project(actor, input)?;

    let mut human = HumanOutput::new(format!(
        "trk project add: created project {}",
        write.project.id
    ));
    human.push_summary("id", write.project.id.to_string());
    human.push_summary("title", write.project.title.clone());
    human.push_summary(
        "window",
        format!("{} to {}", write.project.start_date, write.project.end_date),
    );
    human.push_summary("members", format!("{}", write.project.members.len()));
    if let Some(note) = &write.notification {
        human.push_detail(format!("notified {} member(s)", note.recipients.len()));
    }
    for failure in &write.failures {
        human.push_warning(format!("{}: {}", failure.step, failure.error));
    }
    human.push_next_step(format!(
        "trk task add <title> --project {}",
        write.project.id
    ));

    emit_success(ctx.output_options(), "project add", &write, Some(&human))
}

#[allow(clippy::too_many_arguments)]
pub fn run_update(
    ctx: &CommandContext,
    id: EntityId,
    title: String,
    start: String,
    end: String,
    leader: EntityId,
    members: Vec<EntityId>,
) -> Result<()> {
    let handle = ctx.open_engine()?;
    let actor = ctx.acting_user(&handle.data_dir)?;

    let input = ProjectInput {
        title,
        start_date: parse_date(&start, "startDate")?,
        end_date: parse_date(&end, "endDate")?,
        leader_id: leader,
        members,
    };
    let write = handle.engine.update_project(actor, id, input)?;

    let mut human = HumanOutput::new(format!(
        "trk project update: updated project {}",
        write.project.id
    ));
    human.push_summary("title", write.project.title.clone());
    human.push_summary(
        "window",
        format!("{} to {}", write.project.start_date, write.project.end_date),
    );
    for failure in &write.failures {
        human.push_warning(format!("{}: {}", failure.step, failure.error));
    }

    emit_success(ctx.output_options(), "project update", &write, Some(&human))
}

pub fn run_list(ctx: &CommandContext) -> Result<()> {
    let handle = ctx.open_engine()?;
    let projects = handle.engine.list_projects()?;

    let mut human = HumanOutput::new(format!("trk project list: {} project(s)", projects.len()));
    for project in &projects {
        human.push_detail(format!(
            "#{} {} ({} to {}, leader {}, {} member(s))",
            project.id,
            project.title,
            project.start_date,
            project.end_date,
            project.leader_id,
            project.members.len()
        ));
    }

    emit_success(ctx.output_options(), "project list", &projects, Some(&human))
}

pub fn run_rm(ctx: &CommandContext, id: EntityId) -> Result<()> {
    let handle = ctx.open_engine()?;
    let actor = ctx.acting_user(&handle.data_dir)?;

    let deletion = handle.engine.delete_project(actor, id)?;

    let mut human = HumanOutput::new(format!("trk project rm: deleted project {id}"));
    human.push_summary("tasks removed", deletion.tasks_removed.to_string());
    human.push_summary(
        "attachments removed",
        deletion.attachments_removed.to_string(),
    );

    emit_success(ctx.output_options(), "project rm", &deletion, Some(&human))
}

pub fn run_candidates(ctx: &CommandContext, id: EntityId) -> Result<()> {
    let handle = ctx.open_engine()?;
    let candidates = handle.engine.available_invite_candidates(id)?;

    let mut human = HumanOutput::new(format!(
        "trk project candidates: {} user(s) available",
        candidates.len()
    ));
    for user in &candidates {
        human.push_detail(format!("#{} {}", user.id, user.name));
    }

    emit_success(
        ctx.output_options(),
        "project candidates",
        &candidates,
        Some(&human),
    )
}
