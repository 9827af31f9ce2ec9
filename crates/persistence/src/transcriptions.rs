//! Transcription records using ScyllaDB

use crate::schema::HISTORY_BUCKET;
use crate::{PersistenceError, ScyllaClient};
use akara_core::TranscriptionRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One page of history, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    /// Total number of stored records
    pub total: u64,
    pub records: Vec<TranscriptionRecord>,
}

/// Transcription store trait
#[async_trait]
pub trait TranscriptionStore: Send + Sync {
    async fn insert(&self, record: &TranscriptionRecord) -> Result<(), PersistenceError>;

    /// Records ordered by `created_at` descending, skipping `offset`
    async fn history(&self, limit: usize, offset: usize) -> Result<HistoryPage, PersistenceError>;

    /// Connectivity check
    async fn ping(&self) -> Result<(), PersistenceError>;

    /// Whether records survive a restart
    fn is_distributed(&self) -> bool;
}

/// ScyllaDB implementation of transcription store
pub struct ScyllaTranscriptionStore {
    client: ScyllaClient,
}

impl ScyllaTranscriptionStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_record(
        &self,
        row: scylla::frame::response::result::Row,
    ) -> Result<TranscriptionRecord, PersistenceError> {
        let (
            id,
            filename,
            file_size,
            transcript,
            translation,
            translated_audio,
            source_language,
            target_language,
            model_name,
            processing_time,
            created_at,
            user_id,
        ): (
            Uuid,
            String,
            i64,
            String,
            String,
            String,
            String,
            String,
            String,
            f64,
            i64,
            Option<String>,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        let created_at = DateTime::<Utc>::from_timestamp_millis(created_at)
            .ok_or_else(|| PersistenceError::InvalidData(format!("bad created_at {}", created_at)))?;

        Ok(TranscriptionRecord {
            id,
            filename,
            file_size: u64::try_from(file_size).unwrap_or(0),
            transcript,
            translation,
            translated_audio,
            source_language,
            target_language,
            model_name,
            processing_time,
            created_at,
            user_id,
        })
    }
}

#[async_trait]
impl TranscriptionStore for ScyllaTranscriptionStore {
    async fn insert(&self, record: &TranscriptionRecord) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.transcriptions (
                bucket, created_at, id, filename, file_size, transcript, translation,
                translated_audio, source_language, target_language, model_name,
                processing_time, user_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        let file_size = i64::try_from(record.file_size)
            .map_err(|_| PersistenceError::InvalidData(format!("file_size {}", record.file_size)))?;

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    HISTORY_BUCKET,
                    record.created_at.timestamp_millis(),
                    record.id,
                    &record.filename,
                    file_size,
                    &record.transcript,
                    &record.translation,
                    &record.translated_audio,
                    &record.source_language,
                    &record.target_language,
                    &record.model_name,
                    record.processing_time,
                    &record.user_id,
                ),
            )
            .await?;

        tracing::debug!(id = %record.id, "Transcription stored");
        Ok(())
    }

    async fn history(&self, limit: usize, offset: usize) -> Result<HistoryPage, PersistenceError> {
        let count_query = format!(
            "SELECT COUNT(*) FROM {}.transcriptions WHERE bucket = ?",
            self.client.keyspace()
        );
        let result = self
            .client
            .session()
            .query_unpaged(count_query, (HISTORY_BUCKET,))
            .await?;

        let mut total = 0u64;
        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (count,): (i64,) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;
                total = u64::try_from(count).unwrap_or(0);
            }
        }

        if limit == 0 || offset as u64 >= total {
            return Ok(HistoryPage {
                total,
                records: Vec::new(),
            });
        }

        // CQL has no OFFSET; read through the skipped rows and drop them
        let fetch = i32::try_from(offset.saturating_add(limit)).unwrap_or(i32::MAX);
        let query = format!(
            "SELECT id, filename, file_size, transcript, translation, translated_audio,
                    source_language, target_language, model_name, processing_time,
                    created_at, user_id
             FROM {}.transcriptions WHERE bucket = ? LIMIT ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (HISTORY_BUCKET, fetch))
            .await?;

        let mut records = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows.into_iter().skip(offset) {
                records.push(self.row_to_record(row)?);
            }
        }

        Ok(HistoryPage { total, records })
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        self.client
            .session()
            .query_unpaged("SELECT release_version FROM system.local", &[])
            .await?;
        Ok(())
    }

    fn is_distributed(&self) -> bool {
        true
    }
}
