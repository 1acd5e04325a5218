//! Frequency counting that turns labelled examples into a [`NaiveBayesModel`].

use std::fmt;
use std::path::Path;
use std::time::Instant;

use log::info;
use rustc_hash::FxHashMap;

use crate::config::{CorpusConfig, TrainerBuilder, TrainerConfig};
use crate::corpus::{load_labeled_csv, LabeledText};
use crate::error::Result;
use crate::metrics::TrainingMetrics;
use crate::model::{NaiveBayesModel, TokenCounts};
use crate::tokenizer::Tokenizer;

/// High-level façade configuring and executing training runs.
#[derive(Debug, Clone)]
pub struct Trainer {
    cfg: TrainerConfig,
}

/// Artifacts returned after a training session completes.
#[must_use]
#[derive(Debug, Clone)]
pub struct TrainerArtifacts {
    /// Trained model.
    pub model: NaiveBayesModel,
    /// Summary metrics captured during training.
    pub metrics: TrainingMetrics,
}

impl Trainer {
    /// Creates a new trainer for the supplied configuration.
    #[must_use]
    pub fn new(cfg: TrainerConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`TrainerBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.cfg
    }

    /// Trains a model from a CSV file with `category` and `text` columns.
    pub fn train_from_csv<P: AsRef<Path>>(
        &self,
        path: P,
        corpus: &CorpusConfig,
    ) -> Result<TrainerArtifacts> {
        let examples = load_labeled_csv(path, corpus)?;
        self.train(&examples)
    }

    /// Trains a fresh model from in-memory examples.
    ///
    /// Categories keep their first-seen order. An empty slice yields an
    /// untrained model that never produces predictions. The only failure mode
    /// is an invalid configuration.
    pub fn train(&self, examples: &[LabeledText]) -> Result<TrainerArtifacts> {
        self.cfg.validate()?;
        let tokenizer = Tokenizer::new(self.cfg.tokenizer.clone())?;
        let start = Instant::now();

        let mut categories: Vec<String> = Vec::new();
        let mut category_counts: FxHashMap<String, u64> = FxHashMap::default();
        let mut word_counts: FxHashMap<String, TokenCounts> = FxHashMap::default();
        let mut total_words: FxHashMap<String, u64> = FxHashMap::default();
        let mut vocabulary: TokenCounts = FxHashMap::default();

        for example in examples {
            if !category_counts.contains_key(&example.category) {
                categories.push(example.category.clone());
                category_counts.insert(example.category.clone(), 0);
                word_counts.insert(example.category.clone(), FxHashMap::default());
                total_words.insert(example.category.clone(), 0);
            }
        }

        let mut token_occurrences = 0u64;
        let mut empty_documents = 0usize;
        for example in examples {
            let category = example.category.as_str();
            if let Some(count) = category_counts.get_mut(category) {
                *count += 1;
            }
            let tokens = tokenizer.tokenize(&example.text);
            if tokens.is_empty() {
                empty_documents += 1;
                continue;
            }
            let occurrences = tokens.len() as u64;
            if let Some(counts) = word_counts.get_mut(category) {
                for token in tokens {
                    *vocabulary.entry(token.clone()).or_insert(0) += 1;
                    *counts.entry(token).or_insert(0) += 1;
                }
            }
            if let Some(total) = total_words.get_mut(category) {
                *total += occurrences;
            }
            token_occurrences += occurrences;
        }

        let metrics = TrainingMetrics {
            documents: examples.len(),
            categories: categories.len(),
            token_occurrences,
            vocabulary_size: vocabulary.len(),
            empty_documents,
            total_duration: start.elapsed(),
        };

        if self.cfg.show_progress {
            info!(
                "trained on {} documents: categories={} tokens={} vocab={} in {:.2?}",
                metrics.documents,
                metrics.categories,
                metrics.token_occurrences,
                metrics.vocabulary_size,
                metrics.total_duration
            );
        }

        let model = NaiveBayesModel::from_counts(
            categories,
            category_counts,
            word_counts,
            vocabulary,
            total_words,
            examples.len() as u64,
            self.cfg.tokenizer.clone(),
        );
        Ok(TrainerArtifacts { model, metrics })
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TrainerConfig::default())
    }
}

impl fmt::Display for TrainerArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Naive Bayes model with {} categories",
            self.model.categories().len()
        )?;
        writeln!(f, "Total documents: {}", self.model.total_documents())?;
        writeln!(f, "Vocabulary size: {}", self.model.vocabulary_size())?;
        writeln!(f, "Total duration: {:?}", self.metrics.total_duration)?;
        Ok(())
    }
}
