use super::{PARAGRAPH_PATTERN, SENTENCE_PATTERN, segment_count, tokenize_words};
use crate::core::config::StatisticsConfig;
use crate::types::{TextStatistics, WordFrequency};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Compute text statistics. Blank text yields `has_text == false` and zero counts.
///
/// Word frequencies only consider words of at least `min_word_length`
/// characters. Ties keep first-seen order. Language detection is left to
/// the caller.
pub fn compute_text_statistics(text: &str, config: &StatisticsConfig) -> TextStatistics {
    if text.trim().is_empty() {
        return TextStatistics::default();
    }

    let words = tokenize_words(text);

    let mut stats = TextStatistics {
        has_text: true,
        character_count: text.chars().count(),
        character_count_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        word_count: words.len(),
        sentence_count: segment_count(&SENTENCE_PATTERN, text),
        paragraph_count: segment_count(&PARAGRAPH_PATTERN, text),
        ..Default::default()
    };

    if words.is_empty() {
        return stats;
    }

    let total_length: usize = words.iter().map(|w| w.chars().count()).sum();
    stats.average_word_length = Some(total_length as f64 / words.len() as f64);

    if config.enable_word_frequency {
        let frequencies = word_frequencies(&words, config.min_word_length);
        stats.unique_word_count = Some(frequencies.len());
        stats.top_words = top_words(frequencies, config.max_top_words);
        stats.word_length_distribution = length_distribution(&words);
    }

    stats
}

fn word_frequencies(words: &[String], min_length: usize) -> IndexMap<&str, usize> {
    let mut frequencies: IndexMap<&str, usize> = IndexMap::new();
    for word in words.iter().filter(|w| w.chars().count() >= min_length) {
        *frequencies.entry(word.as_str()).or_insert(0) += 1;
    }
    frequencies
}

fn top_words(frequencies: IndexMap<&str, usize>, limit: usize) -> Vec<WordFrequency> {
    let mut entries: Vec<(&str, usize)> = frequencies.into_iter().collect();
    // stable: equal frequencies stay in first-seen order
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
        .into_iter()
        .take(limit)
        .map(|(word, frequency)| WordFrequency {
            word: word.to_string(),
            frequency,
        })
        .collect()
}

fn length_distribution(words: &[String]) -> BTreeMap<usize, usize> {
    let mut distribution = BTreeMap::new();
    for word in words {
        *distribution.entry(word.chars().count()).or_insert(0) += 1;
    }
    distribution
}
