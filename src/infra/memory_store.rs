//! In-process history store.
//!
//! Used when no database is configured, and by the handler tests. Records
//! live only as long as the process.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use super::store::{HistoryRecord, HistoryStore, NewHistoryRecord, StoreError};

#[derive(Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<HistoryRecord>> {
        // A poisoned lock still holds a consistent append-only vector.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, record: NewHistoryRecord) -> Result<HistoryRecord, StoreError> {
        let mut records = self.lock();
        let id = records.last().map_or(1, |last| last.id + 1);
        let record = record.into_record(id, Utc::now());
        records.push(record.clone());
        Ok(record)
    }

    async fn recent(&self, n: usize) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(self.lock().iter().rev().take(n).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(domain: &str) -> NewHistoryRecord {
        NewHistoryRecord {
            route: "/v1/tools/lookup".to_string(),
            method: "GET".to_string(),
            domain: domain.to_string(),
            request_body: String::new(),
            response_code: 200,
            response_body: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_store_returns_no_rows() {
        let store = MemoryHistoryStore::new();
        assert!(store.recent(20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_increase_in_insertion_order() {
        let store = MemoryHistoryStore::new();
        let a = store.append(entry("a.example")).await.unwrap();
        let b = store.append(entry("b.example")).await.unwrap();
        let c = store.append(entry("c.example")).await.unwrap();

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert!(a.created_at <= c.created_at);
    }

    #[tokio::test]
    async fn test_recent_is_bounded_and_newest_first() {
        let store = MemoryHistoryStore::new();
        for i in 0..25 {
            store.append(entry(&format!("host{}.example", i))).await.unwrap();
        }

        let rows = store.recent(20).await.unwrap();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].id, 25);
        assert_eq!(rows[19].id, 6);
        assert!(rows.windows(2).all(|w| w[0].id > w[1].id));
        assert_eq!(store.len(), 25);
    }

    #[tokio::test]
    async fn test_recent_zero() {
        let store = MemoryHistoryStore::new();
        store.append(entry("a.example")).await.unwrap();
        assert!(store.recent(0).await.unwrap().is_empty());
    }
}
