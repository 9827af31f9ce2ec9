//! In-memory transcription store
//!
//! Default store when ScyllaDB is disabled or unreachable; meant for
//! development. Records are lost on restart, and only the most recent
//! [`DEFAULT_MAX_RECORDS`] are kept since each one carries the full base64
//! synthesized audio.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::RwLock;

use akara_core::TranscriptionRecord;

use crate::transcriptions::{HistoryPage, TranscriptionStore};
use crate::PersistenceError;

/// Record cap for [`InMemoryTranscriptionStore::new`]
pub const DEFAULT_MAX_RECORDS: usize = 500;

#[derive(Debug)]
pub struct InMemoryTranscriptionStore {
    records: RwLock<VecDeque<TranscriptionRecord>>,
    max_records: usize,
}

impl Default for InMemoryTranscriptionStore {
    fn default() -> Self {
        Self::with_max_records(DEFAULT_MAX_RECORDS)
    }
}

impl InMemoryTranscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that evicts the oldest inserted record beyond `max_records`
    pub fn with_max_records(max_records: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            max_records: max_records.max(1),
        }
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TranscriptionStore for InMemoryTranscriptionStore {
    async fn insert(&self, record: &TranscriptionRecord) -> Result<(), PersistenceError> {
        let mut records = self.records.write();
        records.push_back(record.clone());
        while records.len() > self.max_records {
            if let Some(evicted) = records.pop_front() {
                tracing::debug!(id = %evicted.id, "Evicted oldest in-memory transcription");
            }
        }
        Ok(())
    }

    async fn history(&self, limit: usize, offset: usize) -> Result<HistoryPage, PersistenceError> {
        let records = self.records.read();

        let mut newest_first: Vec<&TranscriptionRecord> = records.iter().collect();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(HistoryPage {
            total: records.len() as u64,
            records: newest_first
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        })
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }

    fn is_distributed(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn record(name: &str, age_secs: i64) -> TranscriptionRecord {
        TranscriptionRecord {
            id: Uuid::new_v4(),
            filename: name.to_string(),
            file_size: 1024,
            transcript: "नमस्ते".to_string(),
            translation: "Hello".to_string(),
            translated_audio: "QUJD".to_string(),
            source_language: "hi".to_string(),
            target_language: "en".to_string(),
            model_name: "bhashini".to_string(),
            processing_time: 1.5,
            created_at: Utc::now() - Duration::seconds(age_secs),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let store = InMemoryTranscriptionStore::new();
        store.insert(&record("old.wav", 300)).await.unwrap();
        store.insert(&record("new.wav", 0)).await.unwrap();
        store.insert(&record("mid.wav", 60)).await.unwrap();

        let page = store.history(10, 0).await.unwrap();
        assert_eq!(page.total, 3);
        let names: Vec<_> = page.records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["new.wav", "mid.wav", "old.wav"]);
    }

    #[tokio::test]
    async fn test_history_pagination() {
        let store = InMemoryTranscriptionStore::new();
        for i in 0..5 {
            store.insert(&record(&format!("{}.wav", i), i * 10)).await.unwrap();
        }

        let page = store.history(2, 1).await.unwrap();
        assert_eq!(page.total, 5);
        let names: Vec<_> = page.records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["1.wav", "2.wav"]);

        let past_end = store.history(10, 10).await.unwrap();
        assert_eq!(past_end.total, 5);
        assert!(past_end.records.is_empty());
    }

    #[tokio::test]
    async fn test_oldest_records_are_evicted_past_cap() {
        let store = InMemoryTranscriptionStore::with_max_records(3);
        for i in 0..5 {
            store.insert(&record(&format!("{}.wav", i), 100 - i * 10)).await.unwrap();
        }

        assert_eq!(store.len(), 3);
        let page = store.history(10, 0).await.unwrap();
        assert_eq!(page.total, 3);
        let names: Vec<_> = page.records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["4.wav", "3.wav", "2.wav"]);
    }

    #[tokio::test]
    async fn test_ping_and_flags() {
        let store = InMemoryTranscriptionStore::new();
        assert!(store.ping().await.is_ok());
        assert!(!store.is_distributed());
        assert!(store.is_empty());
        assert_eq!(store.max_records(), DEFAULT_MAX_RECORDS);
    }
}
