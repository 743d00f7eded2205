//! Stopword sets used by the language heuristic.
//!
//! Each set is a short list of very frequent function words for one
//! language, embedded at compile time from `stopwords/<lang>_stopwords.json`.
//!
//! ```rust
//! use docproc::stopwords::get_stopwords;
//!
//! let en = get_stopwords("en").unwrap();
//! assert!(en.contains("the"));
//! assert!(get_stopwords("es-ES").unwrap().contains("que"));
//! assert!(get_stopwords("de").is_none());
//! ```

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;

macro_rules! embed_stopwords {
    ($map:expr, $($lang:literal),* $(,)?) => {
        $(
            {
                const JSON: &str = include_str!(concat!("../../stopwords/", $lang, "_stopwords.json"));
                match serde_json::from_str::<Vec<String>>(JSON) {
                    Ok(words) => {
                        let set: AHashSet<String> = words.into_iter().collect();
                        $map.insert($lang.to_string(), set);
                    }
                    Err(e) => {
                        panic!("Failed to parse embedded stopwords for language '{}': {}", $lang, e);
                    }
                }
            }
        )*
    };
}

/// Language code to stopword set. Codes are lowercase ISO 639-1.
pub static STOPWORDS: Lazy<AHashMap<String, AHashSet<String>>> = Lazy::new(|| {
    let mut map = AHashMap::new();
    embed_stopwords!(map, "en", "es");
    map
});

/// Stopwords for a language code, case-insensitive and locale-tolerant
/// (`"EN"`, `"en-US"` and `"en_GB"` all resolve to `"en"`).
pub fn get_stopwords(lang: &str) -> Option<&'static AHashSet<String>> {
    let normalized = lang.to_lowercase();

    let lang_code = if let Some(pos) = normalized.find(&['-', '_'][..]) {
        &normalized[..pos]
    } else {
        normalized.get(..2).unwrap_or(&normalized)
    };

    STOPWORDS.get(lang_code)
}
