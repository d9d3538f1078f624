//! Entity schemas for the tracking core.
//!
//! Every record has two identifiers: a small monotonic business `id` used
//! for cross-entity references, and an opaque `storageId` (uuid) that keys
//! the record in the resource store. Records are validated strictly on
//! decode; unknown fields are rejected rather than silently dropped.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Business-key identifier for all entities.
pub type EntityId = u64;

/// Generate a fresh storage-layer key.
pub fn new_storage_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Leader,
    Member,
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "leader" => Ok(Role::Leader),
            "member" => Ok(Role::Member),
            other => Err(Error::InvalidArgument(format!(
                "unknown role '{other}' (expected leader, member)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Completed,
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "to-do" | "todo" => Ok(TaskStatus::ToDo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown task status '{other}' (expected to-do, in-progress, completed)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::InvalidArgument(format!(
                "unknown priority '{other}' (expected low, medium, high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Project,
    Task,
    Support,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

impl FromStr for TicketStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "in-progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            other => Err(Error::InvalidArgument(format!(
                "unknown ticket status '{other}' (expected open, in-progress, resolved)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct User {
    pub id: EntityId,
    #[serde(default = "new_storage_key")]
    pub storage_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Project {
    pub id: EntityId,
    #[serde(default = "new_storage_key")]
    pub storage_id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leader_id: EntityId,
    /// Member user ids. The leader is tracked separately and is NOT
    /// automatically part of this set.
    pub members: Vec<EntityId>,
}

impl Project {
    /// Whether a user may be assigned to this project's tasks.
    ///
    /// Membership and leadership are asymmetric: the leader is not listed
    /// in `members`, so assignability checks both fields.
    pub fn can_assign(&self, user_id: EntityId) -> bool {
        self.leader_id == user_id || self.members.contains(&user_id)
    }

    /// Whether a user already belongs to this project in any capacity.
    pub fn involves(&self, user_id: EntityId) -> bool {
        self.can_assign(user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Task {
    pub id: EntityId,
    #[serde(default = "new_storage_key")]
    pub storage_id: String,
    pub project_id: EntityId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assigned_to: Vec<EntityId>,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Percent complete, 0-100. Derived from status on write: 100 when
    /// completed, 0 otherwise.
    pub completion: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Attachment {
    pub id: EntityId,
    #[serde(default = "new_storage_key")]
    pub storage_id: String,
    pub task_id: EntityId,
    pub url: String,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Notification {
    pub id: EntityId,
    #[serde(default = "new_storage_key")]
    pub storage_id: String,
    /// One shared record serves all recipients; visibility is computed
    /// per-viewer at read time.
    pub recipients: Vec<EntityId>,
    /// Recipients who have dismissed this notification. The record is only
    /// hard-deleted once every recipient has dismissed it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dismissed_by: Vec<EntityId>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub created_by: EntityId,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// A viewer sees a notification iff they are a recipient and have not
    /// dismissed it.
    pub fn visible_to(&self, user_id: EntityId) -> bool {
        self.recipients.contains(&user_id) && !self.dismissed_by.contains(&user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SupportTicket {
    pub id: EntityId,
    #[serde(default = "new_storage_key")]
    pub storage_id: String,
    pub title: String,
    pub description: String,
    pub assigned_by: EntityId,
    pub status: TicketStatus,
    pub priority: Priority,
    pub created_date: DateTime<Utc>,
}
