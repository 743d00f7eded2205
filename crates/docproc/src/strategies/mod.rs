//! Built-in processing strategies.
//!
//! | Strategy | Type | Priority |
//! |----------|------|----------|
//! | [`CsvStrategy`] | CSV | 10 |
//! | [`ExcelStrategy`] | EXCEL | 15 |
//! | [`PdfStrategy`] | PDF | 20 |
//! | [`WordStrategy`] | WORD | 25 |

use crate::core::config::ProcessorConfig;
use crate::plugins::ProcessingStrategy;
use crate::text::{compute_text_statistics, detect_language};
use crate::types::{ProcessingResult, TextStatistics};
use std::sync::Arc;

pub mod csv;
pub mod excel;
pub mod pdf;
pub mod word;

pub use csv::CsvStrategy;
pub use excel::ExcelStrategy;
pub use pdf::PdfStrategy;
pub use word::WordStrategy;

/// The built-in strategies, one per document type, in registration order.
pub fn default_strategies() -> Vec<Arc<dyn ProcessingStrategy>> {
    vec![
        Arc::new(CsvStrategy::new()),
        Arc::new(ExcelStrategy::new()),
        Arc::new(PdfStrategy::new()),
        Arc::new(WordStrategy::new()),
    ]
}

/// Text statistics plus the language guess when enabled.
pub(crate) fn text_statistics(text: &str, config: &ProcessorConfig) -> TextStatistics {
    let mut stats = compute_text_statistics(text, &config.statistics);
    if config.statistics.enable_language_detection && stats.has_text {
        stats.detected_language = Some(detect_language(text));
    }
    stats
}

/// Warn when extracted text exceeds the advisory limit.
pub(crate) fn warn_on_text_length(result: &mut ProcessingResult, text: &str, config: &ProcessorConfig) {
    let length = text.chars().count();
    let limit = config.limits.max_text_length;
    if length > limit {
        tracing::warn!(document = %result.document_name, length, limit, "Extracted text exceeds limit");
        result.add_warning(format!(
            "Extracted text has {} characters, exceeding the configured limit of {}",
            length, limit
        ));
    }
}
