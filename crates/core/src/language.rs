//! Language definitions for the 12 languages served by the Bhashini pipeline
//!
//! The same set is offered as both source and target. Codes are ISO 639-1.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Hindi,
    English,
    Bengali,
    Gujarati,
    Kannada,
    Malayalam,
    Marathi,
    Odia,
    Punjabi,
    Tamil,
    Telugu,
    Urdu,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    /// Get ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Hindi => "hi",
            Self::English => "en",
            Self::Bengali => "bn",
            Self::Gujarati => "gu",
            Self::Kannada => "kn",
            Self::Malayalam => "ml",
            Self::Marathi => "mr",
            Self::Odia => "or",
            Self::Punjabi => "pa",
            Self::Tamil => "ta",
            Self::Telugu => "te",
            Self::Urdu => "ur",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hindi => "Hindi",
            Self::English => "English",
            Self::Bengali => "Bengali",
            Self::Gujarati => "Gujarati",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
            Self::Marathi => "Marathi",
            Self::Odia => "Odia",
            Self::Punjabi => "Punjabi",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Urdu => "Urdu",
        }
    }

    /// Get script used by this language
    pub fn script(&self) -> Script {
        match self {
            Self::Hindi | Self::Marathi => Script::Devanagari,
            Self::English => Script::Latin,
            Self::Bengali => Script::Bengali,
            Self::Gujarati => Script::Gujarati,
            Self::Kannada => Script::Kannada,
            Self::Malayalam => Script::Malayalam,
            Self::Odia => Script::Odia,
            Self::Punjabi => Script::Gurmukhi,
            Self::Tamil => Script::Tamil,
            Self::Telugu => Script::Telugu,
            Self::Urdu => Script::Arabic,
        }
    }

    /// Look up by exact two-letter code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|l| l.code() == code)
    }

    /// Parse from code, ISO 639-2 code or English name (case-insensitive)
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "hi" | "hin" | "hindi" => Some(Self::Hindi),
            "en" | "eng" | "english" => Some(Self::English),
            "bn" | "ben" | "bengali" | "bangla" => Some(Self::Bengali),
            "gu" | "guj" | "gujarati" => Some(Self::Gujarati),
            "kn" | "kan" | "kannada" => Some(Self::Kannada),
            "ml" | "mal" | "malayalam" => Some(Self::Malayalam),
            "mr" | "mar" | "marathi" => Some(Self::Marathi),
            "or" | "ori" | "odia" | "oriya" => Some(Self::Odia),
            "pa" | "pan" | "punjabi" | "panjabi" => Some(Self::Punjabi),
            "ta" | "tam" | "tamil" => Some(Self::Tamil),
            "te" | "tel" | "telugu" => Some(Self::Telugu),
            "ur" | "urd" | "urdu" => Some(Self::Urdu),
            _ => None,
        }
    }

    /// All supported languages, in catalog order
    pub fn all() -> &'static [Language] {
        &[
            Self::Hindi,
            Self::English,
            Self::Bengali,
            Self::Gujarati,
            Self::Kannada,
            Self::Malayalam,
            Self::Marathi,
            Self::Odia,
            Self::Punjabi,
            Self::Tamil,
            Self::Telugu,
            Self::Urdu,
        ]
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Source/target language codes for one pipeline run.
///
/// Codes are passed through to the remote service as given; the remote
/// side is the authority on which pairs it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new(Language::Hindi.code(), Language::English.code())
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// Static catalog of source and target languages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLanguages {
    pub source_languages: BTreeMap<String, String>,
    pub target_languages: BTreeMap<String, String>,
}

/// Build the language catalog. Source and target sets are identical.
pub fn supported_languages() -> SupportedLanguages {
    let table: BTreeMap<String, String> = Language::all()
        .iter()
        .map(|l| (l.code().to_string(), l.name().to_string()))
        .collect();

    SupportedLanguages {
        source_languages: table.clone(),
        target_languages: table,
    }
}

/// Scripts used by the supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    Latin,
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Odia,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Arabic,
}

impl Script {
    const DETECTABLE: [Script; 11] = [
        Self::Devanagari,
        Self::Bengali,
        Self::Gurmukhi,
        Self::Gujarati,
        Self::Odia,
        Self::Tamil,
        Self::Telugu,
        Self::Kannada,
        Self::Malayalam,
        Self::Arabic,
        Self::Latin,
    ];

    /// Get Unicode range for this script (first block only)
    pub fn unicode_range(&self) -> (u32, u32) {
        match self {
            Self::Latin => (0x0041, 0x024F),
            Self::Devanagari => (0x0900, 0x097F),
            Self::Bengali => (0x0980, 0x09FF),
            Self::Gurmukhi => (0x0A00, 0x0A7F),
            Self::Gujarati => (0x0A80, 0x0AFF),
            Self::Odia => (0x0B00, 0x0B7F),
            Self::Tamil => (0x0B80, 0x0BFF),
            Self::Telugu => (0x0C00, 0x0C7F),
            Self::Kannada => (0x0C80, 0x0CFF),
            Self::Malayalam => (0x0D00, 0x0D7F),
            Self::Arabic => (0x0600, 0x06FF),
        }
    }

    /// Check if a character belongs to this script
    pub fn contains_char(&self, c: char) -> bool {
        if *self == Self::Latin {
            return c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c);
        }
        let code = c as u32;
        let (start, end) = self.unicode_range();
        code >= start && code <= end
    }

    /// Count letters per script. Digits, punctuation and whitespace are ignored.
    pub fn histogram(text: &str) -> Vec<(Script, usize)> {
        let mut counts = [0usize; 11];
        for c in text.chars() {
            if let Some(idx) = Self::DETECTABLE.iter().position(|s| s.contains_char(c)) {
                counts[idx] += 1;
            }
        }
        Self::DETECTABLE
            .iter()
            .zip(counts)
            .filter(|(_, n)| *n > 0)
            .map(|(s, n)| (*s, n))
            .collect()
    }

    /// Detect script from text (returns most frequent script)
    pub fn detect(text: &str) -> Option<Self> {
        Self::histogram(text)
            .into_iter()
            .max_by_key(|(_, n)| *n)
            .map(|(s, _)| s)
    }
}
