use crate::error::StoreResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use tracing::debug;

/// One audit-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub kind: String,
    pub detail: Value,
    /// Milliseconds since the Unix epoch, assigned at append time.
    pub timestamp: i64,
}

/// Append-only keyed record store.
///
/// Hosts log transformation runs through this fire-and-forget; the core
/// crates never depend on it. Records get a monotonically increasing id.
/// A file-backed store rewrites its JSON backing file on every append,
/// which is plenty for an audit log of interactive runs.
#[derive(Debug)]
pub struct RecordStore {
    path: Option<PathBuf>,
    records: Vec<Record>,
    next_id: u64,
}

impl RecordStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Open a file-backed store, loading any records already present.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let records: Vec<Record> = if path.exists() {
            let data = fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&data)?
            }
        } else {
            Vec::new()
        };

        let next_id = records.iter().map(|record| record.id).max().map_or(1, |max| max + 1);
        Ok(Self {
            path: Some(path),
            records,
            next_id,
        })
    }

    /// Append a record, returning its assigned id.
    pub fn add(&mut self, kind: impl Into<String>, detail: Value) -> StoreResult<u64> {
        let id = self.next_id;
        self.next_id += 1;

        let record = Record {
            id,
            kind: kind.into(),
            detail,
            timestamp: Utc::now().timestamp_millis(),
        };
        debug!(id, kind = %record.kind, "appending record");
        self.records.push(record);
        self.persist()?;
        Ok(id)
    }

    pub fn get(&self, id: u64) -> Option<Record> {
        self.records.iter().find(|record| record.id == id).cloned()
    }

    /// All records, optionally restricted to an inclusive id range.
    pub fn get_all(&self, range: Option<RangeInclusive<u64>>) -> Vec<Record> {
        match range {
            Some(range) => self
                .records
                .iter()
                .filter(|record| range.contains(&record.id))
                .cloned()
                .collect(),
            None => self.records.clone(),
        }
    }

    pub fn clear(&mut self) -> StoreResult<()> {
        self.records.clear();
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn persist(&self) -> StoreResult<()> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&self.records)?;
            fs::write(path, json)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use serde_json::json;

    #[test]
    fn add_assigns_monotonic_ids() {
        let mut store = RecordStore::in_memory();
        let first = store.add("run", json!({"status": "fulfilled"})).unwrap();
        let second = store.add("run", json!({"status": "failed"})).unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.get(first).unwrap().detail["status"], "fulfilled");
    }

    #[test]
    fn get_all_honors_inclusive_range() {
        let mut store = RecordStore::in_memory();
        for i in 0..5 {
            store.add("run", json!({ "n": i })).unwrap();
        }
        let mid = store.get_all(Some(2..=4));
        assert_eq!(mid.len(), 3);
        assert_eq!(mid[0].id, 2);
        assert_eq!(mid[2].id, 4);
        assert_eq!(store.get_all(None).len(), 5);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = RecordStore::in_memory();
        store.add("run", json!({})).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.get(1), None);
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");

        let mut store = RecordStore::open(&path).unwrap();
        store.add("run", json!({"status": "fulfilled"})).unwrap();
        store.add("run", json!({"status": "unsupported"})).unwrap();
        drop(store);

        let reopened = RecordStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get(2).unwrap().detail["status"], "unsupported");

        // Ids keep counting from where the file left off.
        let mut reopened = reopened;
        assert_eq!(reopened.add("run", json!({})).unwrap(), 3);
    }

    #[test]
    fn malformed_backing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        fs::write(&path, "not json").unwrap();

        let err = RecordStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }
}
