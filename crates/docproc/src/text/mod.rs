//! Text analysis shared by the PDF and Word strategies.
//!
//! - [`statistics`] - character, word, sentence and paragraph counts plus word frequencies
//! - [`language`] - stop-word based English/Spanish guess

pub mod language;
pub mod statistics;

pub use language::{DetectedLanguage, detect_language};
pub use statistics::compute_text_statistics;

use once_cell::sync::Lazy;
use regex::Regex;

/// A maximal run of word characters (Unicode letters, digits, underscore).
pub(crate) static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w+\b").expect("Word regex pattern is valid and should compile"));
pub(crate) static SENTENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("Sentence regex pattern is valid and should compile"));
pub(crate) static PARAGRAPH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("Paragraph regex pattern is valid and should compile"));

/// Lower-cased word tokens in order of appearance.
pub(crate) fn tokenize_words(text: &str) -> Vec<String> {
    WORD_PATTERN.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

/// Number of segments `text` splits into, with trailing empty segments dropped.
///
/// Text with no separator is one segment. Text made only of separators is zero.
pub(crate) fn segment_count(pattern: &Regex, text: &str) -> usize {
    if !pattern.is_match(text) {
        return 1;
    }
    let segments: Vec<&str> = pattern.split(text).collect();
    let trailing_empty = segments.iter().rev().take_while(|s| s.is_empty()).count();
    segments.len() - trailing_empty
}
