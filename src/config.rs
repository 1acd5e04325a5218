//! Configuration builders controlling tokenization, training, and corpus ingestion.

use crate::error::{NbError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the text tokenizer.
///
/// The configuration is persisted alongside a trained model so that prediction
/// reproduces the exact preprocessing applied during training.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Shortest word (in characters) that survives filtering.
    pub min_token_len: usize,
    /// Emits bigrams built from adjacent surviving words.
    pub bigrams: bool,
    /// String used to join the two halves of a bigram.
    pub bigram_separator: String,
    /// Removes words found in the built-in English stop-word list.
    pub english_stop_words: bool,
    /// Additional stop words removed on top of (or instead of) the English list.
    pub extra_stop_words: Vec<String>,
}

impl TokenizerConfig {
    /// Returns a builder initialised with [`TokenizerConfig::default`].
    #[must_use]
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::default()
    }

    /// Validates the invariants required for tokenization.
    pub fn validate(&self) -> Result<()> {
        if self.min_token_len == 0 {
            return Err(NbError::InvalidConfig(
                "min_token_len must be greater than zero".into(),
            ));
        }
        if self.bigram_separator.is_empty() {
            return Err(NbError::InvalidConfig(
                "bigram_separator must not be empty".into(),
            ));
        }
        if self
            .bigram_separator
            .chars()
            .any(|ch| ch.is_ascii_alphanumeric() || ch.is_ascii_whitespace())
        {
            return Err(NbError::InvalidConfig(format!(
                "bigram_separator {:?} must not contain ASCII letters, digits, or whitespace",
                self.bigram_separator
            )));
        }
        Ok(())
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            bigrams: true,
            bigram_separator: "_".into(),
            english_stop_words: true,
            extra_stop_words: Vec::new(),
        }
    }
}

/// Builder for [`TokenizerConfig`].
#[derive(Debug, Default, Clone)]
pub struct TokenizerBuilder {
    cfg: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Creates a builder with [`TokenizerConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum word length kept after normalisation.
    #[must_use]
    pub fn min_token_len(mut self, value: usize) -> Self {
        self.cfg.min_token_len = value;
        self
    }

    /// Enables or disables bigram generation.
    #[must_use]
    pub fn bigrams(mut self, enabled: bool) -> Self {
        self.cfg.bigrams = enabled;
        self
    }

    /// Overrides the bigram separator.
    #[must_use]
    pub fn bigram_separator(mut self, separator: impl Into<String>) -> Self {
        self.cfg.bigram_separator = separator.into();
        self
    }

    /// Enables or disables the built-in English stop-word list.
    #[must_use]
    pub fn english_stop_words(mut self, enabled: bool) -> Self {
        self.cfg.english_stop_words = enabled;
        self
    }

    /// Adds custom stop words; they are lowercased on build.
    #[must_use]
    pub fn extra_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cfg.extra_stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Finalises the builder, returning a validated [`TokenizerConfig`].
    pub fn build(mut self) -> Result<TokenizerConfig> {
        for word in &mut self.cfg.extra_stop_words {
            *word = word.to_lowercase();
        }
        self.cfg.extra_stop_words.sort_unstable();
        self.cfg.extra_stop_words.dedup();
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration for Naive Bayes training.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Tokenizer applied to every training document.
    pub tokenizer: TokenizerConfig,
    /// Enables training summaries through the `log` facade.
    pub show_progress: bool,
}

impl TrainerConfig {
    /// Returns a builder initialised with [`TrainerConfig::default`].
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::default()
    }

    /// Validates the invariants required for training.
    pub fn validate(&self) -> Result<()> {
        self.tokenizer.validate()
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            show_progress: true,
        }
    }
}

/// Builder for [`TrainerConfig`].
#[derive(Debug, Default, Clone)]
pub struct TrainerBuilder {
    cfg: TrainerConfig,
}

impl TrainerBuilder {
    /// Creates a builder with [`TrainerConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tokenizer configuration.
    #[must_use]
    pub fn tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.cfg.tokenizer = tokenizer;
        self
    }

    /// Enables or disables training summaries.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`TrainerConfig`].
    pub fn build(self) -> Result<TrainerConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration controlling how CSV corpora are read from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusConfig {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Trims leading and trailing whitespace from every field.
    pub trim: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
        }
    }
}

impl CorpusConfig {
    /// Returns a builder initialised with [`CorpusConfig::default`].
    #[must_use]
    pub fn builder() -> CorpusBuilder {
        CorpusBuilder::default()
    }
}

/// Builder for [`CorpusConfig`].
#[derive(Debug, Default, Clone)]
pub struct CorpusBuilder {
    cfg: CorpusConfig,
}

impl CorpusBuilder {
    /// Creates a new builder with [`CorpusConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.cfg.delimiter = delimiter;
        self
    }

    /// Enables or disables whitespace trimming of fields.
    #[must_use]
    pub fn trim(mut self, enabled: bool) -> Self {
        self.cfg.trim = enabled;
        self
    }

    /// Finalises the builder, returning the [`CorpusConfig`].
    pub fn build(self) -> CorpusConfig {
        self.cfg
    }
}
