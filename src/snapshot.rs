//! Preview payloads and the default in-memory snapshot store.
//!
//! Entries expire lazily on access after a fixed TTL; `cleanup_expired` is
//! available for a host-scheduled sweep. Remote stores implement the same
//! [`SnapshotStore`] trait outside the hot composition path.

use std::fmt;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SnapshotError;
use crate::providers::SnapshotStore;

/// A single-use snapshot identifier (eight hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Mint a fresh identifier. Identifiers are never reused across
    /// occurrences, even within one message.
    pub fn mint() -> SnapshotId {
        SnapshotId(Uuid::new_v4().simple().to_string()[..8].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A held item, as described by the host at composition time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Display name; may carry dialect color codes.
    pub name: String,
    pub amount: u32,
}

/// A full inventory capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub title: String,
    pub items: Vec<ItemSnapshot>,
}

/// The opaque payload stored behind a preview span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewPayload {
    Item(ItemSnapshot),
    Inventory(InventorySnapshot),
}

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

struct StoredEntry {
    payload: PreviewPayload,
    owner: String,
    stored_at: Instant,
}

/// In-memory [`SnapshotStore`] with TTL expiry, safe for concurrent use.
pub struct MemorySnapshotStore {
    entries: DashMap<SnapshotId, StoredEntry>,
    ttl: Duration,
}

impl MemorySnapshotStore {
    pub fn new() -> MemorySnapshotStore {
        MemorySnapshotStore::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> MemorySnapshotStore {
        MemorySnapshotStore {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The recipient name that stored a snapshot, if it is still live.
    pub fn owner(&self, id: &SnapshotId) -> Option<String> {
        self.entries.get(id).map(|entry| entry.owner.clone())
    }

    /// Drop every expired entry.
    pub fn cleanup_expired(&self) {
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() <= self.ttl);
    }

    /// Drop everything (host shutdown).
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        MemorySnapshotStore::new()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn store(&self, payload: PreviewPayload, owner: &str) -> Result<SnapshotId, SnapshotError> {
        let id = SnapshotId::mint();
        self.entries.insert(
            id.clone(),
            StoredEntry {
                payload,
                owner: owner.to_string(),
                stored_at: Instant::now(),
            },
        );
        Ok(id)
    }

    fn get(&self, id: &SnapshotId) -> Option<PreviewPayload> {
        {
            let entry = self.entries.get(id)?;
            if entry.stored_at.elapsed() <= self.ttl {
                return Some(entry.payload.clone());
            }
            // guard must drop before the removal below
        }
        self.entries.remove(id);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sword() -> PreviewPayload {
        PreviewPayload::Item(ItemSnapshot {
            name: "Sword".to_string(),
            amount: 1,
        })
    }

    #[test]
    fn stored_payload_reads_back() {
        let store = MemorySnapshotStore::new();
        let id = store.store(sword(), "Tom").unwrap();
        assert_eq!(store.get(&id), Some(sword()));
        assert_eq!(store.owner(&id), Some("Tom".to_string()));
    }

    #[test]
    fn ids_are_never_reused() {
        let store = MemorySnapshotStore::new();
        let first = store.store(sword(), "Tom").unwrap();
        let second = store.store(sword(), "Tom").unwrap();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 8);
    }

    #[test]
    fn expired_entries_read_back_as_none() {
        let store = MemorySnapshotStore::with_ttl(Duration::ZERO);
        let id = store.store(sword(), "Tom").unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.get(&id), None);
        assert!(store.is_empty());
    }

    #[test]
    fn cleanup_drops_only_expired() {
        let store = MemorySnapshotStore::with_ttl(Duration::from_secs(60));
        store.store(sword(), "Tom").unwrap();
        store.cleanup_expired();
        assert_eq!(store.len(), 1);
    }
}
