//! Persistence layer for transcription records
//!
//! Two stores behind [`TranscriptionStore`]:
//! - ScyllaDB (`transcriptions` table), when enabled in settings
//! - In-memory, the default and the fallback when ScyllaDB is unreachable

pub mod client;
pub mod error;
pub mod memory;
pub mod schema;
pub mod transcriptions;

pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use memory::InMemoryTranscriptionStore;
pub use transcriptions::{HistoryPage, ScyllaTranscriptionStore, TranscriptionStore};

/// Connect to ScyllaDB, ensure the schema, and return the transcription store
pub async fn init(config: ScyllaConfig) -> Result<ScyllaTranscriptionStore, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;
    Ok(ScyllaTranscriptionStore::new(client))
}
