//! Audio handling for the remote ASR stage

mod normalizer;

pub use normalizer::{normalize_bytes, normalize_file, NormalizedAudio};
