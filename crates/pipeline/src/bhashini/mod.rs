//! Bhashini (ULCA) pipeline client
//!
//! Two remote calls per run: discovery resolves service ids and a callback
//! endpoint for the language pair, compute runs ASR, translation and TTS in
//! one request against that endpoint.

pub mod binding;
pub mod cache;
pub mod executor;
pub mod resolver;
pub mod retry;
pub mod tasks;

pub use binding::{bind_outputs, bind_services, BindingError, StageOutputs};
pub use cache::DiscoveryCache;
pub use executor::{ExecutionFailure, PipelineExecutor};
pub use resolver::{PipelineConfig, PipelineResolver};
pub use retry::RetryPolicy;
pub use tasks::{PipelineTaskSpec, StageServices, TaskType};
