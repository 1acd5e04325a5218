//! Text normalisation and feature extraction.
//!
//! A [`Tokenizer`] turns free-form text into the token stream counted by the
//! trainer and scored by the predictor:
//!
//! 1. lowercase the input;
//! 2. drop every character that is not an ASCII letter, digit, or whitespace;
//! 3. split on whitespace runs;
//! 4. discard words shorter than [`TokenizerConfig::min_token_len`];
//! 5. discard stop words;
//! 6. append bigrams of adjacent surviving words.
//!
//! Unigrams keep their source order and are followed by the bigrams in the
//! order they were generated.

use rustc_hash::FxHashSet;

use crate::config::TokenizerConfig;
use crate::error::Result;
use crate::stopwords;

/// Stateless tokenizer built from a [`TokenizerConfig`].
#[derive(Debug, Clone)]
pub struct Tokenizer {
    cfg: TokenizerConfig,
    extra_stop_words: FxHashSet<String>,
}

impl Tokenizer {
    /// Creates a tokenizer after validating `cfg`.
    pub fn new(cfg: TokenizerConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::from_validated(cfg))
    }

    pub(crate) fn from_validated(cfg: TokenizerConfig) -> Self {
        let extra_stop_words = cfg
            .extra_stop_words
            .iter()
            .map(|word| word.to_lowercase())
            .collect();
        Self {
            cfg,
            extra_stop_words,
        }
    }

    /// Returns the configuration backing this tokenizer.
    #[must_use]
    pub fn config(&self) -> &TokenizerConfig {
        &self.cfg
    }

    /// Splits `text` into unigram tokens followed by bigram tokens.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let words: Vec<&str> = normalized
            .split_ascii_whitespace()
            .filter(|word| word.len() >= self.cfg.min_token_len)
            .filter(|word| !self.is_stop_word(word))
            .collect();

        let bigram_count = if self.cfg.bigrams {
            words.len().saturating_sub(1)
        } else {
            0
        };
        let mut tokens = Vec::with_capacity(words.len() + bigram_count);
        tokens.extend(words.iter().map(|word| (*word).to_string()));
        if self.cfg.bigrams {
            let separator = self.cfg.bigram_separator.as_str();
            for pair in words.windows(2) {
                let mut bigram =
                    String::with_capacity(pair[0].len() + separator.len() + pair[1].len());
                bigram.push_str(pair[0]);
                bigram.push_str(separator);
                bigram.push_str(pair[1]);
                tokens.push(bigram);
            }
        }
        tokens
    }

    fn is_stop_word(&self, word: &str) -> bool {
        (self.cfg.english_stop_words && stopwords::is_english_stop_word(word))
            || self.extra_stop_words.contains(word)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::from_validated(TokenizerConfig::default())
    }
}

/// Tokenizes `text` with the default configuration.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::default().tokenize(text)
}

/// Lowercases `text` and keeps only ASCII alphanumerics and ASCII whitespace.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || ch.is_ascii_whitespace() {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unigrams_precede_bigrams() {
        let tokens = tokenize("The Cat sat on THE mat.");
        assert_eq!(tokens, vec!["cat", "sat", "mat", "cat_sat", "sat_mat"]);
    }

    #[test]
    fn strips_punctuation_and_non_ascii() {
        let tokens = tokenize("Héllo, world!! rock'n'roll");
        assert_eq!(tokens, vec!["hllo", "world", "rocknroll", "hllo_world", "world_rocknroll"]);
    }

    #[test]
    fn bigrams_skip_removed_words() {
        // "is" and "a" are removed before pairing, so "python" and "language" become adjacent.
        let tokens = tokenize("Python is a language");
        assert_eq!(tokens, vec!["python", "language", "python_language"]);
    }

    #[test]
    fn short_words_are_dropped() {
        assert_eq!(tokenize("ox go at"), Vec::<String>::new());
        assert_eq!(tokenize("fox"), vec!["fox"]);
    }

    #[test]
    fn empty_and_whitespace_inputs_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n ").is_empty());
        assert!(tokenize("?!.,").is_empty());
    }

    #[test]
    fn digits_are_kept() {
        assert_eq!(tokenize("win 2024 cup"), vec!["win", "2024", "cup", "win_2024", "2024_cup"]);
    }

    #[test]
    fn configuration_controls_features() {
        let cfg = TokenizerConfig::builder()
            .min_token_len(2)
            .bigrams(false)
            .english_stop_words(false)
            .extra_stop_words(["Mat"])
            .build()
            .unwrap();
        let tokenizer = Tokenizer::new(cfg).unwrap();
        assert_eq!(
            tokenizer.tokenize("The cat sat on the mat"),
            vec!["the", "cat", "sat", "on", "the"]
        );
    }

    #[test]
    fn custom_separator_is_used() {
        let cfg = TokenizerConfig::builder()
            .bigram_separator("|")
            .build()
            .unwrap();
        let tokenizer = Tokenizer::new(cfg).unwrap();
        assert_eq!(
            tokenizer.tokenize("quick brown fox"),
            vec!["quick", "brown", "fox", "quick|brown", "brown|fox"]
        );
    }

    #[test]
    fn tokenization_is_deterministic() {
        let text = "Markets rallied as the central bank held rates steady";
        assert_eq!(tokenize(text), tokenize(text));
    }
}
