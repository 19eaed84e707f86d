//! Generation progress records.
//!
//! Long-running generations publish progress through a [`ProgressStore`]
//! keyed by galaxy id. Records carry a TTL: a record that was never
//! completed stops answering after the TTL and reads as absent, which
//! callers treat as an unknown failure. The store is the only state shared
//! between the dispatching side and the worker, so any backend with
//! get/put/delete and expiry can stand in for the in-memory one.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::tables::now_ms;

/// Progress record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Generating,
    Complete,
    Error,
}

/// One generation's progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub status: ProgressStatus,
    /// Human-readable description of the current stage.
    pub progress: String,
    /// 0–100.
    pub percent: u8,
    pub started_at: u64,
    pub message: Option<String>,
}

impl ProgressRecord {
    pub fn started() -> Self {
        Self {
            status: ProgressStatus::Generating,
            progress: "Generation queued".to_string(),
            percent: 0,
            started_at: now_ms(),
            message: None,
        }
    }
}

/// Keyed progress storage with per-record TTL.
pub trait ProgressStore: Send + Sync {
    fn get(&self, galaxy_id: u64) -> Option<ProgressRecord>;
    fn put(&self, galaxy_id: u64, record: ProgressRecord, ttl: Duration);
    fn delete(&self, galaxy_id: u64);
}

/// In-memory progress store. Expiry is checked on read.
#[derive(Default)]
pub struct MemoryProgressStore {
    records: Mutex<HashMap<u64, (ProgressRecord, Instant)>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get(&self, galaxy_id: u64) -> Option<ProgressRecord> {
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match records.get(&galaxy_id) {
            Some((record, deadline)) if Instant::now() < *deadline => Some(record.clone()),
            Some(_) => {
                // Expired records read as absent.
                records.remove(&galaxy_id);
                None
            }
            None => None,
        }
    }

    fn put(&self, galaxy_id: u64, record: ProgressRecord, ttl: Duration) {
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.insert(galaxy_id, (record, Instant::now() + ttl));
    }

    fn delete(&self, galaxy_id: u64) {
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.remove(&galaxy_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn put_get_delete_round_trip() {
        let store = MemoryProgressStore::new();
        store.put(1, ProgressRecord::started(), Duration::from_secs(60));
        let record = store.get(1).unwrap();
        assert_eq!(record.status, ProgressStatus::Generating);
        assert_eq!(record.percent, 0);
        store.delete(1);
        assert!(store.get(1).is_none());
    }

    #[test]
    fn expired_records_read_as_absent() {
        let store = MemoryProgressStore::new();
        store.put(1, ProgressRecord::started(), Duration::from_millis(20));
        assert!(store.get(1).is_some());
        sleep(Duration::from_millis(40));
        assert!(store.get(1).is_none());
        // Expiry removed the record entirely.
        assert!(store.get(1).is_none());
    }

    #[test]
    fn put_refreshes_ttl() {
        let store = MemoryProgressStore::new();
        store.put(1, ProgressRecord::started(), Duration::from_millis(20));
        sleep(Duration::from_millis(10));
        store.put(1, ProgressRecord::started(), Duration::from_millis(50));
        sleep(Duration::from_millis(25));
        assert!(store.get(1).is_some());
    }
}
