//! Attachment synchronization for tasks.
//!
//! Attachments have no identity of their own beyond being "the current set
//! for a task": every task write replaces the full set. `reconcile` is a
//! full-replace sync, not an incremental diff, so callers must not assume
//! stable attachment ids across updates. The interface is kept narrow so a
//! diffing implementation could be dropped in later.

use chrono::{DateTime, Utc};
use url::Url;

use crate::error::{Error, Result};
use crate::ids;
use crate::model::{Attachment, EntityId};
use crate::store::{Collection, ResourceStore};

/// Parse every desired URL up front; invalid strings never reach storage.
pub fn validate_urls(raw: &[String]) -> Result<Vec<Url>> {
    raw.iter()
        .map(|candidate| {
            Url::parse(candidate).map_err(|_| {
                Error::validation("attachments", format!("malformed URL '{candidate}'"))
            })
        })
        .collect()
}

/// Human-readable name for an attachment URL: the last path segment,
/// falling back to the hostname, then to "Link".
pub fn display_name(url: &Url) -> String {
    if let Some(segments) = url.path_segments() {
        if let Some(last) = segments.filter(|segment| !segment.is_empty()).last() {
            return last.to_string();
        }
    }
    if let Some(host) = url.host_str() {
        return host.to_string();
    }
    "Link".to_string()
}

/// Replace the stored attachment set for a task with `desired`.
///
/// Deletes every existing record for the task (regardless of URL overlap),
/// then inserts one record per desired URL in order, with freshly
/// allocated ids. The raw submitted strings are stored; parsing is only
/// used for validation and name derivation. An empty `desired` list is
/// valid and leaves the task with zero attachments.
pub fn reconcile<S: ResourceStore>(
    store: &S,
    task_id: EntityId,
    desired: &[String],
    now: DateTime<Utc>,
) -> Result<Vec<Attachment>> {
    let parsed = validate_urls(desired)?;

    let existing: Vec<Attachment> = store.list_as(Collection::Attachments)?;
    for attachment in existing.iter().filter(|a| a.task_id == task_id) {
        store.delete(Collection::Attachments, &attachment.storage_id)?;
    }

    let mut inserted = Vec::with_capacity(desired.len());
    for (raw, url) in desired.iter().zip(&parsed) {
        let name = display_name(url);
        let stored = ids::create_with_retry(store, Collection::Attachments, |id| Attachment {
            id,
            storage_id: crate::model::new_storage_key(),
            task_id,
            url: raw.clone(),
            name: name.clone(),
            uploaded_at: now,
        })?;
        inserted.push(stored);
    }

    Ok(inserted)
}
