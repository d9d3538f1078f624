//! Task/project consistency engine.
//!
//! Orchestrates the multi-step writes that keep projects, tasks,
//! attachments and notifications mutually consistent:
//! validate -> allocate -> write -> sync attachments -> notify.
//!
//! All preconditions are checked before any write, so validation failures
//! never leave side effects. Steps after the primary write are not rolled
//! back on failure (there is no transaction across collections): the task
//! or project stays persisted and the failed dependent steps are reported
//! on the write report so a caller can retry just those.
//!
//! Every mutating call takes an explicit `acting_user`; there is no
//! ambient current-user state.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::attachments;
use crate::error::{Error, Result, WriteStep};
use crate::ids;
use crate::membership;
use crate::model::{
    Attachment, EntityId, Notification, NotificationKind, Priority, Project, SupportTicket, Task,
    TaskStatus, User,
};
use crate::notify::{self, CleanupReport, FanOut};
use crate::store::{Collection, ResourceStore};
use crate::tickets::{self, TicketInput};

/// Input for creating or updating a task.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub project_id: EntityId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assigned_to: Vec<EntityId>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub attachment_urls: Vec<String>,
}

/// Input for creating or updating a project.
#[derive(Debug, Clone)]
pub struct ProjectInput {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leader_id: EntityId,
    pub members: Vec<EntityId>,
}

/// A dependent step that failed after the primary record was persisted.
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub step: WriteStep,
    pub error: String,
}

/// Result of a task write. `failures` lists dependent steps that did not
/// complete; the task itself is persisted regardless.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWrite {
    pub task: Task,
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StepFailure>,
}

/// Result of a project write.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWrite {
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StepFailure>,
}

/// Counts for a cascading project deletion.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProjectDeletion {
    pub tasks_removed: usize,
    pub attachments_removed: usize,
}

/// Check task preconditions against its project, in order; the first
/// failure wins and nothing is written.
pub fn validate_task_input(project: &Project, input: &TaskInput, today: NaiveDate) -> Result<()> {
    if input.title.trim().is_empty() {
        return Err(Error::validation("title", "title cannot be empty"));
    }
    if input.start_date >= input.end_date {
        return Err(Error::validation(
            "endDate",
            "end date must be after start date",
        ));
    }
    if input.end_date < today {
        return Err(Error::validation("endDate", "end date cannot be in the past"));
    }
    if input.start_date < project.start_date {
        return Err(Error::validation(
            "startDate",
            format!(
                "start date cannot be before project start date ({})",
                project.start_date
            ),
        ));
    }
    if input.end_date > project.end_date {
        return Err(Error::validation(
            "endDate",
            format!(
                "end date cannot be after project end date ({})",
                project.end_date
            ),
        ));
    }
    membership::validate_assignees(project, &input.assigned_to)?;
    attachments::validate_urls(&input.attachment_urls)?;
    Ok(())
}

fn completion_for(status: TaskStatus) -> u8 {
    if status == TaskStatus::Completed {
        100
    } else {
        0
    }
}

/// The consistency core, generic over the resource store it writes to.
pub struct Engine<S: ResourceStore> {
    store: S,
    notify_on_write: bool,
}

impl<S: ResourceStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            notify_on_write: true,
        }
    }

    /// Control whether task and project writes fan out notifications.
    /// Support-ticket notifications are unaffected.
    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notify_on_write = enabled;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn user(&self, id: EntityId) -> Result<User> {
        self.store
            .list_as::<User>(Collection::Users)?
            .into_iter()
            .find(|user| user.id == id)
            .ok_or(Error::NotFound { entity: "user", id })
    }

    pub fn project(&self, id: EntityId) -> Result<Project> {
        self.store
            .list_as::<Project>(Collection::Projects)?
            .into_iter()
            .find(|project| project.id == id)
            .ok_or(Error::NotFound {
                entity: "project",
                id,
            })
    }

    pub fn task(&self, id: EntityId) -> Result<Task> {
        self.store
            .list_as::<Task>(Collection::Tasks)?
            .into_iter()
            .find(|task| task.id == id)
            .ok_or(Error::NotFound { entity: "task", id })
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut users = self.store.list_as::<User>(Collection::Users)?;
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut projects = self.store.list_as::<Project>(Collection::Projects)?;
        projects.sort_by_key(|project| project.id);
        Ok(projects)
    }

    pub fn list_tasks(&self, project_id: Option<EntityId>) -> Result<Vec<Task>> {
        let mut tasks = self.store.list_as::<Task>(Collection::Tasks)?;
        if let Some(project_id) = project_id {
            tasks.retain(|task| task.project_id == project_id);
        }
        tasks.sort_by_key(|task| task.id);
        Ok(tasks)
    }

    pub fn attachments_for(&self, task_id: EntityId) -> Result<Vec<Attachment>> {
        let mut all = self.store.list_as::<Attachment>(Collection::Attachments)?;
        all.retain(|attachment| attachment.task_id == task_id);
        all.sort_by_key(|attachment| attachment.id);
        Ok(all)
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn create_user(
        &self,
        name: &str,
        email: Option<String>,
        role: crate::model::Role,
    ) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name", "name cannot be empty"));
        }
        let name = name.to_string();
        ids::create_with_retry(&self.store, Collection::Users, |id| User {
            id,
            storage_id: crate::model::new_storage_key(),
            name: name.clone(),
            email: email.clone(),
            role,
        })
    }

    /// Update a user's profile fields. Role is fixed at creation.
    pub fn update_user(
        &self,
        user_id: EntityId,
        name: &str,
        email: Option<String>,
    ) -> Result<User> {
        let existing = self.user(user_id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name", "name cannot be empty"));
        }

        let updated = User {
            id: existing.id,
            storage_id: existing.storage_id.clone(),
            name: name.to_string(),
            email,
            role: existing.role,
        };
        self.store
            .update_as(Collection::Users, &existing.storage_id, &updated)
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Create a task, validating against the current date.
    pub fn create_task(&self, acting_user: EntityId, input: TaskInput) -> Result<TaskWrite> {
        self.create_task_on(acting_user, input, Utc::now().date_naive())
    }

    /// Create a task validated against an explicit `today`.
    pub fn create_task_on(
        &self,
        acting_user: EntityId,
        input: TaskInput,
        today: NaiveDate,
    ) -> Result<TaskWrite> {
        self.user(acting_user)?;
        let project = self.project(input.project_id)?;
        validate_task_input(&project, &input, today)?;

        let task = ids::create_with_retry(&self.store, Collection::Tasks, |id| Task {
            id,
            storage_id: crate::model::new_storage_key(),
            project_id: input.project_id,
            title: input.title.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            assigned_to: input.assigned_to.clone(),
            status: input.status,
            priority: input.priority,
            completion: completion_for(input.status),
        })
        .map_err(|err| err.in_step(WriteStep::WriteTask))?;

        let (attachments, notification, failures) = self.finish_task_write(
            acting_user,
            &task,
            &input.attachment_urls,
            format!("Task '{}' created", task.title),
            format!(
                "You were assigned to task '{}' in project '{}'",
                task.title, project.title
            ),
        );

        Ok(TaskWrite {
            task,
            attachments,
            notification,
            failures,
        })
    }

    /// Update an existing task, validating against the current date.
    pub fn update_task(
        &self,
        acting_user: EntityId,
        task_id: EntityId,
        input: TaskInput,
    ) -> Result<TaskWrite> {
        self.update_task_on(acting_user, task_id, input, Utc::now().date_naive())
    }

    /// Update a task validated against an explicit `today`.
    ///
    /// The same precondition set as creation applies, and attachment
    /// reconciliation always runs even when the URL list is unchanged.
    pub fn update_task_on(
        &self,
        acting_user: EntityId,
        task_id: EntityId,
        input: TaskInput,
        today: NaiveDate,
    ) -> Result<TaskWrite> {
        self.user(acting_user)?;
        let existing = self.task(task_id)?;
        let project = self.project(input.project_id)?;
        validate_task_input(&project, &input, today)?;

        let updated = Task {
            id: existing.id,
            storage_id: existing.storage_id.clone(),
            project_id: input.project_id,
            title: input.title.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            assigned_to: input.assigned_to.clone(),
            status: input.status,
            priority: input.priority,
            completion: completion_for(input.status),
        };
        let task = self
            .store
            .update_as(Collection::Tasks, &existing.storage_id, &updated)
            .map_err(|err| err.in_step(WriteStep::WriteTask))?;

        let (attachments, notification, failures) = self.finish_task_write(
            acting_user,
            &task,
            &input.attachment_urls,
            format!("Task '{}' updated", task.title),
            format!(
                "Task '{}' in project '{}' was updated",
                task.title, project.title
            ),
        );

        Ok(TaskWrite {
            task,
            attachments,
            notification,
            failures,
        })
    }

    /// Dependent steps after a task record is persisted. Failures here do
    /// not undo the task write; they are logged and reported.
    fn finish_task_write(
        &self,
        acting_user: EntityId,
        task: &Task,
        attachment_urls: &[String],
        title: String,
        description: String,
    ) -> (Vec<Attachment>, Option<Notification>, Vec<StepFailure>) {
        let mut failures = Vec::new();

        let attachments =
            match attachments::reconcile(&self.store, task.id, attachment_urls, Utc::now()) {
                Ok(attachments) => attachments,
                Err(err) => {
                    tracing::warn!(task = task.id, error = %err, "attachment sync failed");
                    failures.push(StepFailure {
                        step: WriteStep::SyncAttachments,
                        error: err.to_string(),
                    });
                    Vec::new()
                }
            };

        let notification = if !self.notify_on_write || task.assigned_to.is_empty() {
            None
        } else {
            match notify::fan_out(
                &self.store,
                FanOut {
                    recipients: task.assigned_to.clone(),
                    kind: NotificationKind::Task,
                    title,
                    description,
                    created_by: acting_user,
                },
            ) {
                Ok(notification) => Some(notification),
                Err(err) => {
                    tracing::warn!(task = task.id, error = %err, "notification fan-out failed");
                    failures.push(StepFailure {
                        step: WriteStep::Notify,
                        error: err.to_string(),
                    });
                    None
                }
            }
        };

        (attachments, notification, failures)
    }

    /// Delete a task and its attachment set.
    pub fn delete_task(&self, acting_user: EntityId, task_id: EntityId) -> Result<()> {
        self.user(acting_user)?;
        let task = self.task(task_id)?;
        attachments::reconcile(&self.store, task_id, &[], Utc::now())
            .map_err(|err| err.in_step(WriteStep::SyncAttachments))?;
        self.store.delete(Collection::Tasks, &task.storage_id)
    }

    // =========================================================================
    // Projects
    // =========================================================================

    fn validate_project_input(&self, input: &ProjectInput) -> Result<()> {
        if input.title.trim().is_empty() {
            return Err(Error::validation("title", "title cannot be empty"));
        }
        if input.start_date > input.end_date {
            return Err(Error::validation(
                "endDate",
                "end date cannot be before start date",
            ));
        }
        self.user(input.leader_id)?;
        for member in &input.members {
            self.user(*member)?;
        }
        Ok(())
    }

    pub fn create_project(
        &self,
        acting_user: EntityId,
        input: ProjectInput,
    ) -> Result<ProjectWrite> {
        self.user(acting_user)?;
        self.validate_project_input(&input)?;

        let project = ids::create_with_retry(&self.store, Collection::Projects, |id| Project {
            id,
            storage_id: crate::model::new_storage_key(),
            title: input.title.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            leader_id: input.leader_id,
            // Explicit member list; the leader is NOT folded in.
            members: input.members.clone(),
        })
        .map_err(|err| err.in_step(WriteStep::WriteProject))?;

        let (notification, failures) = self.announce_project(
            acting_user,
            &project,
            format!("Project '{}' created", project.title),
        );

        Ok(ProjectWrite {
            project,
            notification,
            failures,
        })
    }

    /// Update a project's own fields.
    ///
    /// Existing tasks are NOT re-checked against the new date range; tasks
    /// may end up outside it. That matches the accepted current behavior.
    pub fn update_project(
        &self,
        acting_user: EntityId,
        project_id: EntityId,
        input: ProjectInput,
    ) -> Result<ProjectWrite> {
        self.user(acting_user)?;
        let existing = self.project(project_id)?;
        self.validate_project_input(&input)?;

        let updated = Project {
            id: existing.id,
            storage_id: existing.storage_id.clone(),
            title: input.title.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            leader_id: input.leader_id,
            members: input.members.clone(),
        };
        let project = self
            .store
            .update_as(Collection::Projects, &existing.storage_id, &updated)
            .map_err(|err| err.in_step(WriteStep::WriteProject))?;

        let (notification, failures) = self.announce_project(
            acting_user,
            &project,
            format!("Project '{}' updated", project.title),
        );

        Ok(ProjectWrite {
            project,
            notification,
            failures,
        })
    }

    fn announce_project(
        &self,
        acting_user: EntityId,
        project: &Project,
        title: String,
    ) -> (Option<Notification>, Vec<StepFailure>) {
        if !self.notify_on_write || project.members.is_empty() {
            return (None, Vec::new());
        }
        match notify::fan_out(
            &self.store,
            FanOut {
                recipients: project.members.clone(),
                kind: NotificationKind::Project,
                title,
                description: format!(
                    "Project '{}' runs {} to {}",
                    project.title, project.start_date, project.end_date
                ),
                created_by: acting_user,
            },
        ) {
            Ok(notification) => (Some(notification), Vec::new()),
            Err(err) => {
                tracing::warn!(project = project.id, error = %err, "notification fan-out failed");
                (
                    None,
                    vec![StepFailure {
                        step: WriteStep::Notify,
                        error: err.to_string(),
                    }],
                )
            }
        }
    }

    /// Delete a project, cascading to its tasks and their attachments so
    /// no orphaned children remain. Notifications are append-only history
    /// and are retained.
    pub fn delete_project(
        &self,
        acting_user: EntityId,
        project_id: EntityId,
    ) -> Result<ProjectDeletion> {
        self.user(acting_user)?;
        let project = self.project(project_id)?;

        let tasks = self.list_tasks(Some(project_id))?;
        let mut deletion = ProjectDeletion::default();

        // Children first, so a mid-cascade failure cannot orphan them.
        for task in &tasks {
            let attachments = self.attachments_for(task.id)?;
            for attachment in &attachments {
                self.store
                    .delete(Collection::Attachments, &attachment.storage_id)?;
            }
            deletion.attachments_removed += attachments.len();
            self.store.delete(Collection::Tasks, &task.storage_id)?;
            deletion.tasks_removed += 1;
        }

        self.store.delete(Collection::Projects, &project.storage_id)?;
        Ok(deletion)
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Users eligible for invitation to a project.
    pub fn available_invite_candidates(&self, project_id: EntityId) -> Result<Vec<User>> {
        let target = self.project(project_id)?;
        let users = self.store.list_as::<User>(Collection::Users)?;
        let projects = self.store.list_as::<Project>(Collection::Projects)?;
        let mut candidates: Vec<User> = membership::available_for_invite(&users, &projects, &target)
            .into_iter()
            .cloned()
            .collect();
        candidates.sort_by_key(|user| user.id);
        Ok(candidates)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn list_notifications_for(&self, user_id: EntityId) -> Result<Vec<Notification>> {
        self.user(user_id)?;
        notify::list_for(&self.store, user_id)
    }

    pub fn dismiss_notifications_for(&self, user_id: EntityId) -> Result<CleanupReport> {
        self.user(user_id)?;
        notify::dismiss_all_for(&self.store, user_id)
    }

    // =========================================================================
    // Support tickets
    // =========================================================================

    pub fn create_ticket(&self, acting_user: EntityId, input: TicketInput) -> Result<SupportTicket> {
        self.user(acting_user)?;
        tickets::create(&self.store, acting_user, input)
    }

    pub fn list_tickets(&self) -> Result<Vec<SupportTicket>> {
        tickets::list(&self.store)
    }

    pub fn resolve_ticket(
        &self,
        acting_user: EntityId,
        ticket_id: EntityId,
        status: crate::model::TicketStatus,
    ) -> Result<SupportTicket> {
        self.user(acting_user)?;
        tickets::set_status(&self.store, ticket_id, status)
    }
}
