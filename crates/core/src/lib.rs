//! Core types for the Akara speech translation service
//!
//! This crate provides foundational types used across all other crates:
//! - Language catalog (12 languages) and script detection
//! - Audio format descriptors
//! - Pipeline result and persisted transcription record

pub mod audio;
pub mod language;
pub mod transcription;

pub use audio::{AudioFormat, SampleRate, VoiceGender};
pub use language::{supported_languages, Language, LanguagePair, Script, SupportedLanguages, UnsupportedLanguage};
pub use transcription::{PipelineResult, TranscriptionRecord, DEFAULT_MODEL_NAME};
