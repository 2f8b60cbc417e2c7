//! Widget record persistence.
//!
//! The whole collection lives under a single key as one JSON array. Every
//! operation reads the collection, modifies it, and writes it back; there is
//! no locking, so concurrent writers race and the last write wins.

pub mod backend;

pub use backend::{FileStore, KeyValueStore, MemoryStore};

use log::{debug, error};

use crate::widget::WidgetRecord;
use crate::Result;

/// Key the collection is stored under.
pub const COLLECTION_KEY: &str = "@widgets";

/// CRUD access to the widget collection.
pub struct WidgetStore {
    backend: Box<dyn KeyValueStore>,
}

impl WidgetStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// A store backed by process memory.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Every stored record, in insertion order.
    ///
    /// Read or decode failures are logged and reported as an empty collection.
    pub fn list_all(&self) -> Vec<WidgetRecord> {
        match self.load() {
            Ok(records) => records,
            Err(e) => {
                error!("Error loading widgets: {}", e);
                Vec::new()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<WidgetRecord> {
        self.list_all().into_iter().find(|r| r.id == id)
    }

    /// Insert `record`, or replace the stored record with the same id.
    ///
    /// The collection is read through [`list_all`](Self::list_all), so if the
    /// stored blob cannot be read or decoded it is overwritten by a
    /// collection holding only `record`, and the unreadable records are lost.
    pub fn save(&self, record: &WidgetRecord) -> Result<()> {
        let mut records = self.list_all();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.persist(&records).map_err(|e| {
            error!("Error saving widget {}: {}", record.id, e);
            e
        })
    }

    /// Remove the record with `id`. Unknown ids leave the collection unchanged.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.list_all();
        records.retain(|r| r.id != id);
        self.persist(&records).map_err(|e| {
            error!("Error deleting widget {}: {}", id, e);
            e
        })
    }

    fn load(&self) -> Result<Vec<WidgetRecord>> {
        match self.backend.get_item(COLLECTION_KEY)? {
            Some(blob) if !blob.trim().is_empty() => Ok(serde_json::from_str(&blob)?),
            _ => Ok(Vec::new()),
        }
    }

    fn persist(&self, records: &[WidgetRecord]) -> Result<()> {
        let blob = serde_json::to_string(records)?;
        debug!("persisting {} widget(s), {} bytes", records.len(), blob.len());
        self.backend.set_item(COLLECTION_KEY, &blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Result};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("read failed".into()))
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("disk full".into()))
        }
    }

    fn record(id: &str) -> WidgetRecord {
        WidgetRecord {
            id: id.to_string(),
            ..WidgetRecord::new()
        }
    }

    #[test]
    fn save_then_get() {
        let store = WidgetStore::in_memory();
        let r = record("a");
        store.save(&r).unwrap();
        assert_eq!(store.get("a"), Some(r));
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn save_replaces_in_place() {
        let store = WidgetStore::in_memory();
        store.save(&record("a")).unwrap();
        store.save(&record("b")).unwrap();
        let mut changed = record("a");
        changed.name = "Renamed".into();
        store.save(&changed).unwrap();

        let all = store.list_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
        assert_eq!(all[0].name, "Renamed");
        assert_eq!(all[1].id, "b");
    }

    #[test]
    fn read_failures_look_empty() {
        let store = WidgetStore::new(BrokenStore);
        assert!(store.list_all().is_empty());
        assert!(store.get("a").is_none());
    }

    #[test]
    fn write_failures_propagate() {
        let store = WidgetStore::new(BrokenStore);
        assert!(matches!(store.save(&record("a")), Err(Error::Storage(_))));
        assert!(matches!(store.delete("a"), Err(Error::Storage(_))));
    }

    #[test]
    fn malformed_blob_reads_as_empty() {
        let backend = MemoryStore::new();
        backend.set_item(COLLECTION_KEY, "{not json").unwrap();
        let store = WidgetStore::new(backend);
        assert!(store.list_all().is_empty());
    }
}
