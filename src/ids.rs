//! Identifier allocation for business-key ids.
//!
//! Ids are small contiguous integers per collection: the successor of the
//! maximum existing id, or 1 for an empty collection. Allocation is
//! read-then-write with no server-side transaction, so two concurrent
//! creators can compute the same candidate. The store's unique constraint
//! on `id` turns that race into a `DuplicateId` error, and
//! `create_with_retry` re-fetches a fresh snapshot and tries again.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::EntityId;
use crate::store::{Collection, ResourceStore};

/// Attempts before giving up on a contended collection.
const MAX_ALLOCATION_ATTEMPTS: usize = 16;

/// Successor of the maximum business id in a snapshot.
pub fn next_id(records: &[Value]) -> EntityId {
    records
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_u64))
        .max()
        .map(|max| max + 1)
        .unwrap_or(1)
}

/// Allocate from a freshly fetched snapshot.
///
/// The snapshot must be taken immediately before the write that consumes
/// the id; callers must not reuse a cached collection.
pub fn allocate(store: &impl ResourceStore, collection: Collection) -> Result<EntityId> {
    Ok(next_id(&store.list(collection)?))
}

/// Allocate an id and insert the record it identifies, retrying on
/// duplicate-id conflicts with a fresh snapshot each attempt.
pub fn create_with_retry<S, T, F>(store: &S, collection: Collection, build: F) -> Result<T>
where
    S: ResourceStore,
    T: Serialize + DeserializeOwned,
    F: Fn(EntityId) -> T,
{
    let mut last_conflict = None;

    for _ in 0..MAX_ALLOCATION_ATTEMPTS {
        let id = allocate(store, collection)?;
        match store.create_as(collection, &build(id)) {
            Ok(stored) => return Ok(stored),
            Err(err @ Error::DuplicateId { .. }) => {
                tracing::debug!(%collection, id, "id conflict, retrying allocation");
                last_conflict = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_conflict.unwrap_or_else(|| {
        Error::OperationFailed(format!("id allocation exhausted for {collection}"))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn empty_collection_starts_at_one() {
        assert_eq!(next_id(&[]), 1);
    }

    #[test]
    fn next_id_is_successor_of_max() {
        let records = vec![json!({ "id": 2 }), json!({ "id": 7 }), json!({ "id": 4 })];
        assert_eq!(next_id(&records), 8);
    }

    #[test]
    fn records_without_ids_are_ignored() {
        let records = vec![json!({ "name": "x" }), json!({ "id": 3 })];
        assert_eq!(next_id(&records), 4);
    }

    #[test]
    fn allocate_reads_a_fresh_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::new(temp.path().join(".trk"));
        store.init().unwrap();

        assert_eq!(allocate(&store, Collection::Tasks).unwrap(), 1);
        store
            .create(Collection::Tasks, json!({ "id": 7 }))
            .unwrap();
        assert_eq!(allocate(&store, Collection::Tasks).unwrap(), 8);
    }

    #[test]
    fn create_with_retry_skips_taken_ids() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Row {
            id: u64,
            #[serde(default = "crate::model::new_storage_key", rename = "storageId")]
            storage_id: String,
        }

        let temp = TempDir::new().unwrap();
        let store = JsonStore::new(temp.path().join(".trk"));
        store.init().unwrap();
        store
            .create(Collection::Tasks, json!({ "id": 1 }))
            .unwrap();

        let stored = create_with_retry(&store, Collection::Tasks, |id| Row {
            id,
            storage_id: crate::model::new_storage_key(),
        })
        .unwrap();
        assert_eq!(stored.id, 2);
    }
}
