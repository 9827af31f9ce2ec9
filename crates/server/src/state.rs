//! Application State

use std::sync::Arc;

use akara_config::{ConfigError, Settings};
use akara_persistence::{InMemoryTranscriptionStore, TranscriptionStore};
use akara_pipeline::BhashiniAgent;

use crate::ServerError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    /// Construction outcome of the agent; checked on every request
    pub agent: Arc<Result<BhashiniAgent, ConfigError>>,
    pub store: Arc<dyn TranscriptionStore>,
}

impl AppState {
    pub fn new(
        config: Settings,
        agent: Result<BhashiniAgent, ConfigError>,
        store: Arc<dyn TranscriptionStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            agent: Arc::new(agent),
            store,
        }
    }

    /// State with the in-memory store
    pub fn in_memory(config: Settings, agent: Result<BhashiniAgent, ConfigError>) -> Self {
        Self::new(config, agent, Arc::new(InMemoryTranscriptionStore::new()))
    }

    /// The agent, or 503 when it could not be constructed
    pub fn agent(&self) -> Result<&BhashiniAgent, ServerError> {
        self.agent
            .as_ref()
            .as_ref()
            .map_err(|e| ServerError::AgentUnavailable(e.to_string()))
    }

    pub fn is_agent_available(&self) -> bool {
        self.agent.is_ok()
    }

    pub fn is_distributed_store(&self) -> bool {
        self.store.is_distributed()
    }
}
