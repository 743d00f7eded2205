//! Stop-word based language guess.
//!
//! Counts how many word tokens belong to the English and to the Spanish
//! stopword set. The language with the strictly higher count wins; a tie,
//! including zero against zero, is `Unknown`.

use super::tokenize_words;
use crate::stopwords::get_stopwords;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    English,
    Spanish,
    Unknown,
}

impl DetectedLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedLanguage::English => "english",
            DetectedLanguage::Spanish => "spanish",
            DetectedLanguage::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn detect_language(text: &str) -> DetectedLanguage {
    let words = tokenize_words(text);
    if words.is_empty() {
        return DetectedLanguage::Unknown;
    }

    let count_in = |lang: &str| {
        get_stopwords(lang)
            .map(|set| words.iter().filter(|w| set.contains(w.as_str())).count())
            .unwrap_or(0)
    };

    let english = count_in("en");
    let spanish = count_in("es");
    tracing::trace!(english, spanish, "Stopword matches");

    match english.cmp(&spanish) {
        std::cmp::Ordering::Greater => DetectedLanguage::English,
        std::cmp::Ordering::Less => DetectedLanguage::Spanish,
        std::cmp::Ordering::Equal => DetectedLanguage::Unknown,
    }
}
