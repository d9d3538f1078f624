//! Notification fan-out.
//!
//! One logical event produces one shared record addressed to a set of
//! recipients; it is never split into per-recipient copies. Visibility is
//! computed per-viewer at read time. Records are append-only except for
//! the per-recipient dismissal set: dismissing hides the record for one
//! viewer without destroying it for the others, and the record is only
//! hard-deleted once every recipient has dismissed it.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::ids;
use crate::model::{EntityId, Notification, NotificationKind};
use crate::store::{Collection, ResourceStore};

/// Input for a single fan-out.
#[derive(Debug, Clone)]
pub struct FanOut {
    pub recipients: Vec<EntityId>,
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub created_by: EntityId,
}

/// Create one notification record addressed to `recipients`.
///
/// The recipient set must be non-empty; duplicates are collapsed.
pub fn fan_out<S: ResourceStore>(store: &S, input: FanOut) -> Result<Notification> {
    let mut recipients = input.recipients;
    recipients.sort_unstable();
    recipients.dedup();

    if recipients.is_empty() {
        return Err(Error::validation(
            "recipients",
            "notification must have at least one recipient",
        ));
    }

    let created_at = chrono::Utc::now();
    ids::create_with_retry(store, Collection::Notifications, |id| Notification {
        id,
        storage_id: crate::model::new_storage_key(),
        recipients: recipients.clone(),
        dismissed_by: Vec::new(),
        kind: input.kind,
        title: input.title.clone(),
        description: input.description.clone(),
        created_by: input.created_by,
        created_at,
    })
}

/// Notifications visible to a user, newest first.
pub fn list_for<S: ResourceStore>(store: &S, user_id: EntityId) -> Result<Vec<Notification>> {
    let mut visible: Vec<Notification> = store
        .list_as::<Notification>(Collection::Notifications)?
        .into_iter()
        .filter(|note| note.visible_to(user_id))
        .collect();
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    Ok(visible)
}

/// Outcome counts for a bulk cleanup.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CleanupReport {
    pub deleted: usize,
    pub failed: usize,
}

/// Dismiss every notification currently visible to a user.
///
/// Per-record: the viewer is added to the dismissal set; the record itself
/// is deleted only when no undismissed recipient remains. Errors on
/// individual records are counted and logged, not propagated, so bulk
/// cleanup continues past failures and reports a summary.
pub fn dismiss_all_for<S: ResourceStore>(store: &S, user_id: EntityId) -> Result<CleanupReport> {
    let visible = list_for(store, user_id)?;
    let mut report = CleanupReport::default();

    for mut note in visible {
        note.dismissed_by.push(user_id);

        let fully_dismissed = note
            .recipients
            .iter()
            .all(|recipient| note.dismissed_by.contains(recipient));

        let outcome = if fully_dismissed {
            store.delete(Collection::Notifications, &note.storage_id)
        } else {
            store
                .update_as(Collection::Notifications, &note.storage_id, &note)
                .map(|_| ())
        };

        match outcome {
            Ok(()) => report.deleted += 1,
            Err(err) => {
                tracing::warn!(
                    notification = note.id,
                    user = user_id,
                    error = %err,
                    "failed to dismiss notification"
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;
    use tempfile::TempDir;

    fn store() -> (TempDir, JsonStore) {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::new(temp.path().join(".trk"));
        store.init().unwrap();
        (temp, store)
    }

    fn announce(store: &JsonStore, recipients: Vec<EntityId>, title: &str) -> Notification {
        fan_out(
            store,
            FanOut {
                recipients,
                kind: NotificationKind::Task,
                title: title.to_string(),
                description: String::new(),
                created_by: 1,
            },
        )
        .unwrap()
    }

    #[test]
    fn single_record_serves_all_recipients() {
        let (_temp, store) = store();
        let note = announce(&store, vec![2, 3], "T1 created");

        assert_eq!(note.recipients, vec![2, 3]);
        assert_eq!(store.list(Collection::Notifications).unwrap().len(), 1);

        assert_eq!(list_for(&store, 2).unwrap().len(), 1);
        assert_eq!(list_for(&store, 3).unwrap().len(), 1);
        assert!(list_for(&store, 4).unwrap().is_empty());
    }

    #[test]
    fn empty_recipients_are_rejected() {
        let (_temp, store) = store();
        let err = fan_out(
            &store,
            FanOut {
                recipients: vec![],
                kind: NotificationKind::Project,
                title: "orphan".to_string(),
                description: String::new(),
                created_by: 1,
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn duplicate_recipients_collapse() {
        let (_temp, store) = store();
        let note = announce(&store, vec![3, 2, 3, 2], "dup");
        assert_eq!(note.recipients, vec![2, 3]);
    }

    #[test]
    fn newest_first_ordering() {
        let (_temp, store) = store();
        announce(&store, vec![2], "first");
        announce(&store, vec![2], "second");

        let notes = list_for(&store, 2).unwrap();
        assert_eq!(notes.len(), 2);
        // Equal timestamps fall back to id ordering, newest id first.
        assert_eq!(notes[0].title, "second");
        assert_eq!(notes[1].title, "first");
    }

    #[test]
    fn dismissal_preserves_other_recipients_visibility() {
        let (_temp, store) = store();
        announce(&store, vec![2, 3], "shared");

        let report = dismiss_all_for(&store, 2).unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(report.failed, 0);

        // The shared record still exists and user 3 still sees it.
        assert_eq!(store.list(Collection::Notifications).unwrap().len(), 1);
        assert!(list_for(&store, 2).unwrap().is_empty());
        assert_eq!(list_for(&store, 3).unwrap().len(), 1);
    }

    #[test]
    fn record_deleted_once_all_recipients_dismiss() {
        let (_temp, store) = store();
        announce(&store, vec![2, 3], "shared");

        dismiss_all_for(&store, 2).unwrap();
        dismiss_all_for(&store, 3).unwrap();

        assert!(store.list(Collection::Notifications).unwrap().is_empty());
    }

    #[test]
    fn sole_recipient_dismissal_deletes_the_record() {
        let (_temp, store) = store();
        announce(&store, vec![5], "solo");

        let report = dismiss_all_for(&store, 5).unwrap();
        assert_eq!(report.deleted, 1);
        assert!(store.list(Collection::Notifications).unwrap().is_empty());
    }
}
