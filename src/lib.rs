//! trk - team tracker library
//!
//! This library provides the core functionality for the trk CLI tool:
//! a project and task tracker over a file-backed resource store.
//!
//! # Core Concepts
//!
//! - **Sequential ids**: Small per-collection business ids, allocated
//!   max-plus-one with conflict retry
//! - **Membership**: Assignees must belong to the task's project; invite
//!   candidates are users not yet involved anywhere
//! - **Attachment sync**: A task's stored attachments always mirror the
//!   last submitted URL list
//! - **Notification fan-out**: One shared record per event, visible to
//!   each recipient until they dismiss it
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.trk.toml`
//! - `error`: Error types and result aliases
//! - `store`: Resource store trait and the JSON file implementation
//! - `ids`: Identifier allocation
//! - `membership`: Assignment and invitation rules
//! - `attachments`: Attachment URL validation and reconciliation
//! - `engine`: Task/project consistency engine
//! - `notify`: Notification fan-out and dismissal
//! - `tickets`: Support tickets
//! - `actor`: Acting-user resolution
//! - `lock`: File locking and atomic operations for concurrency safety

pub mod actor;
pub mod attachments;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod lock;
pub mod membership;
pub mod model;
pub mod notify;
pub mod output;
pub mod store;
pub mod tickets;

pub use error::{Error, Result};
