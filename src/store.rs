//! Generic resource store boundary.
//!
//! The core manipulates six collections of JSON-shaped records through a
//! small create/read/update/delete surface. Records are keyed by an opaque
//! storage key (`storageId`), distinct from the business `id` the entities
//! reference each other by. `create` enforces a unique constraint on the
//! business `id` within a collection; the id allocator relies on that
//! constraint for its retry loop.
//!
//! `JsonStore` is the bundled implementation: one JSON array file per
//! collection under a data directory, every mutation under a file lock
//! with an atomic replace.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::new_storage_key;

/// The collections the core consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Users,
    Projects,
    Tasks,
    Attachments,
    Notifications,
    SupportTickets,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Projects => "projects",
            Collection::Tasks => "tasks",
            Collection::Attachments => "attachments",
            Collection::Notifications => "notifications",
            Collection::SupportTickets => "supportTickets",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-collection create/read/update/delete, keyed by storage key.
pub trait ResourceStore {
    /// Snapshot of every record in a collection.
    fn list(&self, collection: Collection) -> Result<Vec<Value>>;

    /// Insert a record. A missing `storageId` is filled in. Fails with
    /// `Error::DuplicateId` when another record already carries the same
    /// business `id`.
    fn create(&self, collection: Collection, record: Value) -> Result<Value>;

    /// Replace the record with the given storage key.
    fn update(&self, collection: Collection, key: &str, record: Value) -> Result<Value>;

    /// Remove the record with the given storage key.
    fn delete(&self, collection: Collection, key: &str) -> Result<()>;

    /// Typed snapshot; records failing schema validation are an error.
    fn list_as<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        self.list(collection)?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(Error::Json))
            .collect()
    }

    /// Typed insert.
    fn create_as<T: Serialize + DeserializeOwned>(
        &self,
        collection: Collection,
        record: &T,
    ) -> Result<T>
    where
        Self: Sized,
    {
        let stored = self.create(collection, serde_json::to_value(record)?)?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Typed replace.
    fn update_as<T: Serialize + DeserializeOwned>(
        &self,
        collection: Collection,
        key: &str,
        record: &T,
    ) -> Result<T>
    where
        Self: Sized,
    {
        let stored = self.update(collection, key, serde_json::to_value(record)?)?;
        Ok(serde_json::from_value(stored)?)
    }
}

/// File-backed store: `<data_dir>/<collection>.json` holding a JSON array.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory and empty collection files.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        for collection in [
            Collection::Users,
            Collection::Projects,
            Collection::Tasks,
            Collection::Attachments,
            Collection::Notifications,
            Collection::SupportTickets,
        ] {
            let path = self.collection_path(collection);
            if !path.exists() {
                lock::write_atomic(&path, b"[]")?;
            }
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.data_dir.exists()
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection.as_str()))
    }

    fn read_records(&self, path: &Path) -> Result<Vec<Value>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Read, mutate, and atomically rewrite a collection under its lock.
    fn with_collection<T, F>(&self, collection: Collection, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Value>) -> Result<T>,
    {
        let path = self.collection_path(collection);
        let _lock = FileLock::acquire(lock::lock_path_for(&path), DEFAULT_LOCK_TIMEOUT_MS)?;

        let mut records = self.read_records(&path)?;
        let result = f(&mut records)?;

        let json = serde_json::to_string_pretty(&records)?;
        lock::write_atomic(&path, json.as_bytes())?;

        Ok(result)
    }
}

fn business_id(record: &Value) -> Option<u64> {
    record.get("id").and_then(Value::as_u64)
}

fn storage_key(record: &Value) -> Option<&str> {
    record
        .get("storageId")
        .and_then(Value::as_str)
        .filter(|key| !key.trim().is_empty())
}

impl ResourceStore for JsonStore {
    fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let path = self.collection_path(collection);
        let _lock = FileLock::acquire(lock::lock_path_for(&path), DEFAULT_LOCK_TIMEOUT_MS)?;
        self.read_records(&path)
    }

    fn create(&self, collection: Collection, mut record: Value) -> Result<Value> {
        self.with_collection(collection, |records| {
            if storage_key(&record).is_none() {
                record["storageId"] = Value::String(new_storage_key());
            }

            if let Some(id) = business_id(&record) {
                if records.iter().any(|existing| business_id(existing) == Some(id)) {
                    return Err(Error::DuplicateId { collection, id });
                }
            }

            records.push(record.clone());
            Ok(record)
        })
    }

    fn update(&self, collection: Collection, key: &str, mut record: Value) -> Result<Value> {
        self.with_collection(collection, |records| {
            let slot = records
                .iter_mut()
                .find(|existing| storage_key(existing) == Some(key))
                .ok_or_else(|| Error::MissingRecord {
                    collection,
                    key: key.to_string(),
                })?;
            record["storageId"] = Value::String(key.to_string());
            *slot = record.clone();
            Ok(record)
        })
    }

    fn delete(&self, collection: Collection, key: &str) -> Result<()> {
        self.with_collection(collection, |records| {
            let before = records.len();
            records.retain(|existing| storage_key(existing) != Some(key));
            if records.len() == before {
                return Err(Error::MissingRecord {
                    collection,
                    key: key.to_string(),
                });
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, User};
    use tempfile::TempDir;

    fn store() -> (TempDir, JsonStore) {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::new(temp.path().join(".trk"));
        store.init().unwrap();
        (temp, store)
    }

    #[test]
    fn init_creates_empty_collections() {
        let (_temp, store) = store();
        assert!(store.collection_path(Collection::Users).exists());
        assert!(store.list(Collection::Users).unwrap().is_empty());
    }

    #[test]
    fn create_fills_in_storage_key() {
        let (_temp, store) = store();
        let stored = store
            .create(Collection::Users, serde_json::json!({ "id": 1 }))
            .unwrap();
        assert!(!stored["storageId"].as_str().unwrap().is_empty());
    }

    #[test]
    fn create_rejects_duplicate_business_id() {
        let (_temp, store) = store();
        store
            .create(Collection::Tasks, serde_json::json!({ "id": 8 }))
            .unwrap();
        let err = store
            .create(Collection::Tasks, serde_json::json!({ "id": 8 }))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateId {
                collection: Collection::Tasks,
                id: 8
            }
        ));
    }

    #[test]
    fn update_replaces_by_storage_key() {
        let (_temp, store) = store();
        let stored = store
            .create(Collection::Projects, serde_json::json!({ "id": 1, "title": "old" }))
            .unwrap();
        let key = stored["storageId"].as_str().unwrap();

        let updated = store
            .update(
                Collection::Projects,
                key,
                serde_json::json!({ "id": 1, "title": "new" }),
            )
            .unwrap();
        assert_eq!(updated["title"], "new");
        assert_eq!(updated["storageId"].as_str().unwrap(), key);

        let records = store.list(Collection::Projects).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "new");
    }

    #[test]
    fn delete_unknown_key_is_an_error() {
        let (_temp, store) = store();
        let err = store.delete(Collection::Tasks, "nope").unwrap_err();
        assert!(matches!(err, Error::MissingRecord { .. }));
    }

    #[test]
    fn typed_helpers_enforce_schema() {
        let (_temp, store) = store();
        let user = User {
            id: 1,
            storage_id: new_storage_key(),
            name: "Ana".to_string(),
            email: None,
            role: Role::Leader,
        };
        store.create_as(Collection::Users, &user).unwrap();

        let users: Vec<User> = store.list_as(Collection::Users).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ana");

        // A record with an unexpected field fails typed decoding.
        store
            .create(
                Collection::Users,
                serde_json::json!({ "id": 2, "name": "Bo", "role": "member", "extra": true }),
            )
            .unwrap();
        assert!(store.list_as::<User>(Collection::Users).is_err());
    }
}
