//! trk task command implementations.

use super::{parse_date, CommandContext, EngineHandle};
use crate::engine::TaskInput;
use crate::error::Result;
use crate::model::EntityId;
use crate::output::{emit_success, HumanOutput};

/// Raw task fields as given on the command line.
pub struct TaskArgs {
    pub title: String,
    pub project: EntityId,
    pub start: String,
    pub end: String,
    pub assign: Vec<EntityId>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub attachments: Vec<String>,
}

fn build_input(handle: &EngineHandle, args: TaskArgs) -> Result<TaskInput> {
    let status = match args.status {
        Some(raw) => raw.parse()?,
        None => handle.config.tasks.default_status()?,
    };
    let priority = match args.priority {
        Some(raw) => raw.parse()?,
        None => handle.config.tasks.default_priority()?,
    };

    Ok(TaskInput {
        project_id: args.project,
        title: args.title,
        start_date: parse_date(&args.start, "startDate")?,
        end_date: parse_date(&args.end, "endDate")?,
        assigned_to: args.assign,
        status,
        priority,
        attachment_urls: args.attachments,
    })
}

pub fn run_add(ctx: &CommandContext, args: TaskArgs) -> Result<()> {
    let handle = ctx.open_engine()?;
    let actor = ctx.acting_user(&handle.data_dir)?;

    let input = build_input(&handle, args)?;
    let write = handle.engine.create_task(actor, input)?;

    let mut human = HumanOutput::new(format!("trk task add: created task {}", write.task.id));
    human.push_summary("id", write.task.id.to_string());
    human.push_summary("title", write.task.title.clone());
    human.push_summary(
        "window",
        format!("{} to {}", write.task.start_date, write.task.end_date),
    );
    human.push_summary("assignees", format!("{}", write.task.assigned_to.len()));
    if !write.attachments.is_empty() {
        human.push_detail(format!("synced {} attachment(s)", write.attachments.len()));
    }
    if let Some(note) = &write.notification {
        human.push_detail(format!("notified {} assignee(s)", note.recipients.len()));
    }
    for failure in &write.failures {
        human.push_warning(format!("{}: {}", failure.step, failure.error));
    }

    emit_success(ctx.output_options(), "task add", &write, Some(&human))
}

pub fn run_update(ctx: &CommandContext, id: EntityId, args: TaskArgs) -> Result<()> {
    let handle = ctx.open_engine()?;
    let actor = ctx.acting_user(&handle.data_dir)?;

    let input = build_input(&handle, args)?;
    let write = handle.engine.update_task(actor, id, input)?;

    let mut human = HumanOutput::new(format!("trk task update: updated task {}", write.task.id));
    human.push_summary("title", write.task.title.clone());
    human.push_summary("status", format!("{:?}", write.task.status));
    human.push_summary("completion", format!("{}%", write.task.completion));
    for failure in &write.failures {
        human.push_warning(format!("{}: {}", failure.step, failure.error));
    }

    emit_success(ctx.output_options(), "task update", &write, Some(&human))
}

pub fn run_list(ctx: &CommandContext, project: Option<EntityId>) -> Result<()> {
    let handle = ctx.open_engine()?;
    let tasks = handle.engine.list_tasks(project)?;

    let mut human = HumanOutput::new(format!("trk task list: {} task(s)", tasks.len()));
    for task in &tasks {
        human.push_detail(format!(
            "#{} {} (project {}, {:?}, {}%)",
            task.id, task.title, task.project_id, task.status, task.completion
        ));
    }

    emit_success(ctx.output_options(), "task list", &tasks, Some(&human))
}

pub fn run_rm(ctx: &CommandContext, id: EntityId) -> Result<()> {
    let handle = ctx.open_engine()?;
    let actor = ctx.acting_user(&handle.data_dir)?;

    handle.engine.delete_task(actor, id)?;

    let human = HumanOutput::new(format!("trk task rm: deleted task {id}"));
    emit_success(
        ctx.output_options(),
        "task rm",
        &serde_json::json!({ "deleted": id }),
        Some(&human),
    )
}
