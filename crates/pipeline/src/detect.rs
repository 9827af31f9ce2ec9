//! Best-effort language detection
//!
//! Picks the dominant script of the text and maps it to one of the supported
//! language codes. Advisory only: every failure collapses to the default code.

use akara_core::{Language, Script};

/// Returned when detection is disabled, fails, or lands outside the catalog
pub const DEFAULT_LANGUAGE: &str = "en";

/// Letter only used in Marathi among the Devanagari languages we serve
const MARATHI_MARKER: char = '\u{0933}';

#[derive(Debug, Clone, Copy)]
pub struct LanguageDetector {
    enabled: bool,
}

impl LanguageDetector {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Detect the language code of `text`, never failing
    pub fn detect(&self, text: &str) -> String {
        if !self.enabled {
            return DEFAULT_LANGUAGE.to_string();
        }

        let detected = Script::detect(text).map(|script| script_language(script, text));

        match detected.and_then(Language::from_code) {
            Some(language) => language.code().to_string(),
            None => {
                tracing::debug!(chars = text.chars().count(), "Language detection fell back to default");
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }
}

fn script_language(script: Script, text: &str) -> &'static str {
    match script {
        Script::Devanagari if text.contains(MARATHI_MARKER) => "mr",
        Script::Devanagari => "hi",
        Script::Latin => "en",
        Script::Arabic => "ur",
        Script::Bengali => "bn",
        Script::Gujarati => "gu",
        Script::Gurmukhi => "pa",
        Script::Odia => "or",
        Script::Tamil => "ta",
        Script::Telugu => "te",
        Script::Kannada => "kn",
        Script::Malayalam => "ml",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_returns_default() {
        let detector = LanguageDetector::new(true);
        assert_eq!(detector.detect(""), "en");
        assert_eq!(detector.detect("   12 34 !!"), "en");
    }

    #[test]
    fn test_disabled_always_default() {
        let detector = LanguageDetector::new(false);
        assert_eq!(detector.detect("नमस्ते दुनिया"), "en");
    }

    #[test]
    fn test_scripts_map_to_catalog() {
        let detector = LanguageDetector::new(true);
        assert_eq!(detector.detect("नमस्ते दुनिया"), "hi");
        assert_eq!(detector.detect("Good morning"), "en");
        assert_eq!(detector.detect("வணக்கம்"), "ta");
        assert_eq!(detector.detect("ನಮಸ್ಕಾರ"), "kn");
        assert_eq!(detector.detect("السلام علیکم"), "ur");
        assert_eq!(detector.detect("ਸਤ ਸ੍ਰੀ ਅਕਾਲ"), "pa");
    }

    #[test]
    fn test_marathi_tie_break() {
        let detector = LanguageDetector::new(true);
        assert_eq!(detector.detect("मला शाळेत जायचे आहे"), "mr");
    }
}
