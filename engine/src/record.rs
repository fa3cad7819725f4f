//! Record types for storing data.

use crate::{RecordId, Timestamp, Version};
use serde::{Deserialize, Serialize};

/// Metadata associated with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// When the record was first created (milliseconds since epoch)
    pub created_at: Timestamp,
    /// When the record was last updated (milliseconds since epoch)
    pub updated_at: Timestamp,
}

impl Metadata {
    /// Create metadata for a freshly created record.
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    fn touch(&mut self, timestamp: Timestamp) {
        self.updated_at = timestamp;
    }
}

/// An identity-bearing payload owned by an [`EntityStore`](crate::EntityStore).
///
/// Identity and creation time are fixed at construction. Records handed out
/// by the store are copies; changing one has no effect on the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    id: RecordId,
    version: Version,
    metadata: Metadata,
    payload: T,
}

impl<T> Record<T> {
    pub(crate) fn new(id: RecordId, payload: T, timestamp: Timestamp) -> Self {
        Self {
            id,
            version: 1,
            metadata: Metadata::new(timestamp),
            payload,
        }
    }

    /// Unique identifier for this record.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Number of committed writes, starting at 1 on create.
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn created_at(&self) -> Timestamp {
        self.metadata.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.metadata.updated_at
    }

    /// The domain payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consume the record, keeping only the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Run a mutation against the payload and stamp the write.
    ///
    /// Only the payload is reachable from `f`; identity and creation time
    /// cannot change.
    pub(crate) fn apply<R>(&mut self, f: impl FnOnce(&mut T) -> R, timestamp: Timestamp) -> R {
        let out = f(&mut self.payload);
        self.version += 1;
        self.metadata.touch(timestamp);
        out
    }
}
