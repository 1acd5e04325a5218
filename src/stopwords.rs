//! Built-in English stop-word inventory.

use std::sync::OnceLock;

use rustc_hash::FxHashSet;

/// Common English function words removed before counting.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "don", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "s", "same", "she",
    "should", "so", "some", "such", "t", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "you", "your", "yours", "yourself",
    "yourselves",
];

static ENGLISH: OnceLock<FxHashSet<&'static str>> = OnceLock::new();

/// Returns the English stop-word list as a lookup set.
pub fn english() -> &'static FxHashSet<&'static str> {
    ENGLISH.get_or_init(|| ENGLISH_STOP_WORDS.iter().copied().collect())
}

/// Returns `true` when `word` (already lowercased) is an English stop word.
#[must_use]
pub fn is_english_stop_word(word: &str) -> bool {
    english().contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_has_no_duplicates() {
        assert_eq!(english().len(), ENGLISH_STOP_WORDS.len());
    }

    #[test]
    fn common_function_words_are_stop_words() {
        for word in ["the", "on", "and", "yourselves"] {
            assert!(is_english_stop_word(word), "{word} should be a stop word");
        }
        assert!(!is_english_stop_word("cat"));
        assert!(!is_english_stop_word("The"));
    }
}
