//! ScyllaDB schema creation

use crate::error::PersistenceError;
use scylla::Session;

/// Partition holding every transcription row. History is read newest-first
/// across all jobs, so a single bucket keeps that a single-partition scan.
pub const HISTORY_BUCKET: i32 = 0;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    session
        .query_unpaged(transcriptions_table(keyspace), &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create transcriptions table: {}", e))
        })?;

    tracing::info!("All tables created successfully");
    Ok(())
}

fn transcriptions_table(keyspace: &str) -> String {
    // created_at is epoch milliseconds
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.transcriptions (
            bucket INT,
            created_at BIGINT,
            id UUID,
            filename TEXT,
            file_size BIGINT,
            transcript TEXT,
            translation TEXT,
            translated_audio TEXT,
            source_language TEXT,
            target_language TEXT,
            model_name TEXT,
            processing_time DOUBLE,
            user_id TEXT,
            PRIMARY KEY ((bucket), created_at, id)
        ) WITH CLUSTERING ORDER BY (created_at DESC, id DESC)
    "#,
        keyspace
    )
}
