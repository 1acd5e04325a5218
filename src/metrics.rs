//! Metrics describing a training run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Aggregate metrics produced by a training session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    /// Number of labelled documents consumed.
    pub documents: usize,
    /// Number of distinct categories discovered.
    pub categories: usize,
    /// Total token occurrences counted (unigrams and bigrams).
    pub token_occurrences: u64,
    /// Number of distinct tokens in the vocabulary.
    pub vocabulary_size: usize,
    /// Documents that produced no tokens after preprocessing.
    pub empty_documents: usize,
    /// Total duration of the training session.
    pub total_duration: Duration,
}

impl TrainingMetrics {
    /// Mean number of tokens per document, or `None` when nothing was trained.
    #[must_use]
    pub fn mean_tokens_per_document(&self) -> Option<f64> {
        if self.documents == 0 {
            return None;
        }
        Some(self.token_occurrences as f64 / self.documents as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_tokens_guards_against_empty_runs() {
        let mut metrics = TrainingMetrics {
            documents: 0,
            categories: 0,
            token_occurrences: 0,
            vocabulary_size: 0,
            empty_documents: 0,
            total_duration: Duration::ZERO,
        };
        assert_eq!(metrics.mean_tokens_per_document(), None);
        metrics.documents = 4;
        metrics.token_occurrences = 10;
        assert_eq!(metrics.mean_tokens_per_document(), Some(2.5));
    }
}
