//! Command-line interface for trk
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::model::EntityId;

mod actor;
mod init;
mod notify;
mod project;
mod task;
mod ticket;
mod user;

/// trk - team tracker
///
/// A CLI for a project and task tracker with sequential entity ids,
/// membership-checked assignment, attachment sync, and notification
/// fan-out over a file-backed store.
#[derive(Parser, Debug)]
#[command(name = "trk")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace root holding the data dir (defaults to current directory)
    #[arg(long, global = true, env = "TRK_ROOT")]
    pub root: Option<std::path::PathBuf>,

    /// Acting user id for mutations
    #[arg(long, global = true, env = "TRK_ACTOR")]
    pub actor: Option<EntityId>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a trk workspace
    Init,

    /// User management
    #[command(subcommand)]
    User(UserCommands),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Notifications
    #[command(subcommand)]
    Notify(NotifyCommands),

    /// Support tickets
    #[command(subcommand)]
    Ticket(TicketCommands),

    /// Set or show the acting user
    #[command(subcommand)]
    Actor(ActorCommands),
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Add a user
    Add {
        /// Display name
        name: String,

        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// Role: leader or member
        #[arg(long, default_value = "member")]
        role: String,
    },

    /// Update a user's name and email
    Update {
        /// User id
        id: EntityId,

        /// Display name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: Option<String>,
    },

    /// List users
    List,
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    Add {
        /// Project title
        title: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Leader user id
        #[arg(long)]
        leader: EntityId,

        /// Member user ids
        #[arg(long, value_delimiter = ',')]
        members: Vec<EntityId>,
    },

    /// Update a project
    Update {
        /// Project id
        id: EntityId,

        /// Project title
        #[arg(long)]
        title: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Leader user id
        #[arg(long)]
        leader: EntityId,

        /// Member user ids
        #[arg(long, value_delimiter = ',')]
        members: Vec<EntityId>,
    },

    /// List projects
    List,

    /// Delete a project and its tasks
    Rm {
        /// Project id
        id: EntityId,
    },

    /// List users available to invite
    Candidates {
        /// Project id
        id: EntityId,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Project id
        #[arg(long)]
        project: EntityId,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Assignee user ids
        #[arg(long, value_delimiter = ',')]
        assign: Vec<EntityId>,

        /// Status: to-do, in-progress, completed
        #[arg(long)]
        status: Option<String>,

        /// Priority: low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// Attachment URLs
        #[arg(long = "attach")]
        attachments: Vec<String>,
    },

    /// Update a task
    Update {
        /// Task id
        id: EntityId,

        /// Task title
        #[arg(long)]
        title: String,

        /// Project id
        #[arg(long)]
        project: EntityId,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Assignee user ids
        #[arg(long, value_delimiter = ',')]
        assign: Vec<EntityId>,

        /// Status: to-do, in-progress, completed
        #[arg(long)]
        status: Option<String>,

        /// Priority: low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// Attachment URLs
        #[arg(long = "attach")]
        attachments: Vec<String>,
    },

    /// List tasks
    List {
        /// Only tasks in this project
        #[arg(long)]
        project: Option<EntityId>,
    },

    /// Delete a task and its attachments
    Rm {
        /// Task id
        id: EntityId,
    },
}

/// Notification subcommands
#[derive(Subcommand, Debug)]
pub enum NotifyCommands {
    /// List notifications for a user, newest first
    List {
        /// Recipient user id (defaults to the acting user)
        #[arg(long)]
        user: Option<EntityId>,
    },

    /// Dismiss all notifications for a user
    Clear {
        /// Recipient user id (defaults to the acting user)
        #[arg(long)]
        user: Option<EntityId>,
    },
}

/// Ticket subcommands
#[derive(Subcommand, Debug)]
pub enum TicketCommands {
    /// File a support ticket
    Add {
        /// Ticket title
        title: String,

        /// Problem description
        #[arg(long, default_value = "")]
        description: String,

        /// Priority: low, medium, high
        #[arg(long, default_value = "medium")]
        priority: String,
    },

    /// List tickets, newest first
    List,

    /// Move a ticket to a new status
    Status {
        /// Ticket id
        id: EntityId,

        /// New status: open, in-progress, resolved
        status: String,
    },
}

/// Actor subcommands
#[derive(Subcommand, Debug)]
pub enum ActorCommands {
    /// Persist the acting user id
    Set {
        /// User id
        id: EntityId,
    },

    /// Show the resolved acting user
    Show,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = CommandContext {
            root: self.root,
            actor: self.actor,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init => init::run(&ctx),
            Commands::User(cmd) => match cmd {
                UserCommands::Add { name, email, role } => {
                    user::run_add(&ctx, name, email, role)
                }
                UserCommands::Update { id, name, email } => {
                    user::run_update(&ctx, id, name, email)
                }
                UserCommands::List => user::run_list(&ctx),
            },
            Commands::Project(cmd) => match cmd {
                ProjectCommands::Add {
                    title,
                    start,
                    end,
                    leader,
                    members,
                } => project::run_add(&ctx, title, start, end, leader, members),
                ProjectCommands::Update {
                    id,
                    title,
                    start,
                    end,
                    leader,
                    members,
                } => project::run_update(&ctx, id, title, start, end, leader, members),
                ProjectCommands::List => project::run_list(&ctx),
                ProjectCommands::Rm { id } => project::run_rm(&ctx, id),
                ProjectCommands::Candidates { id } => project::run_candidates(&ctx, id),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    title,
                    project,
                    start,
                    end,
                    assign,
                    status,
                    priority,
                    attachments,
                } => task::run_add(
                    &ctx,
                    task::TaskArgs {
                        title,
                        project,
                        start,
                        end,
                        assign,
                        status,
                        priority,
                        attachments,
                    },
                ),
                TaskCommands::Update {
                    id,
                    title,
                    project,
                    start,
                    end,
                    assign,
                    status,
                    priority,
                    attachments,
                } => task::run_update(
                    &ctx,
                    id,
                    task::TaskArgs {
                        title,
                        project,
                        start,
                        end,
                        assign,
                        status,
                        priority,
                        attachments,
                    },
                ),
                TaskCommands::List { project } => task::run_list(&ctx, project),
                TaskCommands::Rm { id } => task::run_rm(&ctx, id),
            },
            Commands::Notify(cmd) => match cmd {
                NotifyCommands::List { user } => notify::run_list(&ctx, user),
                NotifyCommands::Clear { user } => notify::run_clear(&ctx, user),
            },
            Commands::Ticket(cmd) => match cmd {
                TicketCommands::Add {
                    title,
                    description,
                    priority,
                } => ticket::run_add(&ctx, title, description, priority),
                TicketCommands::List => ticket::run_list(&ctx),
                TicketCommands::Status { id, status } => ticket::run_status(&ctx, id, status),
            },
            Commands::Actor(cmd) => match cmd {
                ActorCommands::Set { id } => actor::run_set(&ctx, id),
                ActorCommands::Show => actor::run_show(&ctx),
            },
        }
    }
}

/// Global flags shared by every subcommand.
pub struct CommandContext {
    pub root: Option<std::path::PathBuf>,
    pub actor: Option<EntityId>,
    pub json: bool,
    pub quiet: bool,
}

impl CommandContext {
    pub fn workspace_root(&self) -> Result<std::path::PathBuf> {
        match &self.root {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Open the engine over the workspace's data dir, failing if the
    /// workspace was never initialized.
    pub fn open_engine(&self) -> Result<EngineHandle> {
        let root = self.workspace_root()?;
        let config = crate::config::Config::load_from_workspace(&root)?;
        let data_dir = root.join(&config.data_dir);
        let store = crate::store::JsonStore::new(data_dir.clone());
        if !store.is_initialized() {
            return Err(crate::error::Error::InvalidArgument(format!(
                "no trk workspace at {} (run 'trk init')",
                root.display()
            )));
        }
        Ok(EngineHandle {
            engine: crate::engine::Engine::new(store)
                .with_notifications(config.notifications.on_write),
            config,
            data_dir,
        })
    }

    /// Resolve the acting user id for a mutation.
    pub fn acting_user(&self, data_dir: &std::path::Path) -> Result<EntityId> {
        crate::actor::resolve_actor(data_dir, self.actor)
    }

    pub fn output_options(&self) -> crate::output::OutputOptions {
        crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

/// An opened engine plus the workspace pieces commands need.
pub struct EngineHandle {
    pub engine: crate::engine::Engine<crate::store::JsonStore>,
    pub config: crate::config::Config,
    pub data_dir: std::path::PathBuf,
}

pub(crate) fn parse_date(raw: &str, field: &'static str) -> Result<chrono::NaiveDate> {
    raw.parse().map_err(|_| {
        crate::error::Error::validation(field, format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
    })
}
