//! Snapshot types for exporting and restoring store state.
//!
//! The store itself never touches disk. Snapshots let a caller move the
//! full state in and out as JSON, with deterministic ordering.

use crate::{error::Result, Error, Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time copy of a store.
///
/// Uses BTreeMap instead of HashMap for deterministic serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot<T> {
    /// Snapshot format version
    pub format_version: u32,
    /// Identity allocator position at export time
    pub next_id: RecordId,
    /// All records by identity
    pub records: BTreeMap<RecordId, Record<T>>,
}

impl<T> StoreSnapshot<T> {
    /// Create an empty snapshot.
    pub fn new(next_id: RecordId) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            next_id,
            records: BTreeMap::new(),
        }
    }

    /// Add a record to the snapshot.
    pub fn add_record(&mut self, record: Record<T>) {
        self.records.insert(record.id(), record);
    }

    /// Get a record from the snapshot.
    pub fn get_record(&self, id: RecordId) -> Option<&Record<T>> {
        self.records.get(&id)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Highest identity in the snapshot.
    pub fn max_id(&self) -> Option<RecordId> {
        self.records.keys().next_back().copied()
    }

    /// Check that every key matches the identity stored in its record.
    pub fn validate(&self) -> Result<()> {
        if self.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        for (key, record) in &self.records {
            if *key != record.id() {
                return Err(Error::InvalidSnapshot(format!(
                    "record stored under key {} has id {}",
                    key,
                    record.id()
                )));
            }
        }

        Ok(())
    }
}

impl<T: Serialize> StoreSnapshot<T> {
    /// Serialize to JSON with deterministic ordering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON with deterministic ordering.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }
}

impl<T: for<'de> Deserialize<'de>> StoreSnapshot<T> {
    /// Deserialize from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityStore;
    use serde_json::json;

    #[test]
    fn create_empty_snapshot() {
        let snapshot: StoreSnapshot<String> = StoreSnapshot::new(1);
        assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);
        assert_eq!(snapshot.record_count(), 0);
        assert_eq!(snapshot.max_id(), None);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn export_to_json_roundtrip() {
        let store = EntityStore::new();
        store.create("alpha".to_string());
        store.create("beta".to_string());

        let snapshot = store.export_snapshot();
        assert_eq!(snapshot.max_id(), Some(2));
        assert_eq!(snapshot.get_record(1).unwrap().payload(), "alpha");

        let json = snapshot.to_json().unwrap();
        let parsed: StoreSnapshot<String> = StoreSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);

        let pretty = snapshot.to_json_pretty().unwrap();
        assert!(pretty.contains("\"nextId\": 3"));
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let raw = json!({
            "formatVersion": 1,
            "nextId": 10,
            "records": {
                "4": {
                    "id": 5,
                    "version": 1,
                    "metadata": {"createdAt": 1000, "updatedAt": 1000},
                    "payload": "x"
                }
            }
        });

        let err = StoreSnapshot::<String>::from_json(&raw.to_string()).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidSnapshot("record stored under key 4 has id 5".into())
        );
    }

    #[test]
    fn future_format_version_is_rejected() {
        let mut snapshot: StoreSnapshot<String> = StoreSnapshot::new(1);
        snapshot.format_version = SNAPSHOT_FORMAT_VERSION + 1;

        assert!(matches!(snapshot.validate(), Err(Error::InvalidSnapshot(_))));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = StoreSnapshot::<String>::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));
    }
}
