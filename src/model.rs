//! Trained classifier state and inference.

use std::path::Path;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::config::TokenizerConfig;
use crate::error::{NbError, Result};
use crate::prediction::Prediction;
use crate::serialization::{load_model, model_json, save_model};
use crate::tokenizer::Tokenizer;

/// Additive smoothing constant applied to every token count.
pub const LAPLACE_SMOOTHING: f64 = 1.0;

/// Token counts keyed by token.
pub type TokenCounts = FxHashMap<String, u64>;

/// Trained multinomial Naive Bayes model.
///
/// Instances are produced by [`crate::Trainer`] or loaded from disk and are
/// never mutated afterwards, so a model can be shared freely between threads.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    categories: Vec<String>,
    category_counts: FxHashMap<String, u64>,
    word_counts: FxHashMap<String, TokenCounts>,
    vocabulary: TokenCounts,
    total_words: FxHashMap<String, u64>,
    total_documents: u64,
    smoothing: f64,
    #[serde(default)]
    tokenizer: TokenizerConfig,
}

impl NaiveBayesModel {
    /// Creates an untrained model that yields no predictions.
    pub fn empty(tokenizer: TokenizerConfig) -> Self {
        Self {
            categories: Vec::new(),
            category_counts: FxHashMap::default(),
            word_counts: FxHashMap::default(),
            vocabulary: FxHashMap::default(),
            total_words: FxHashMap::default(),
            total_documents: 0,
            smoothing: LAPLACE_SMOOTHING,
            tokenizer,
        }
    }

    pub(crate) fn from_counts(
        categories: Vec<String>,
        category_counts: FxHashMap<String, u64>,
        word_counts: FxHashMap<String, TokenCounts>,
        vocabulary: TokenCounts,
        total_words: FxHashMap<String, u64>,
        total_documents: u64,
        tokenizer: TokenizerConfig,
    ) -> Self {
        Self {
            categories,
            category_counts,
            word_counts,
            vocabulary,
            total_words,
            total_documents,
            smoothing: LAPLACE_SMOOTHING,
            tokenizer,
        }
    }

    /// Returns category labels in first-seen training order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns the number of training documents labelled `category`.
    #[must_use]
    pub fn document_count(&self, category: &str) -> u64 {
        self.category_counts.get(category).copied().unwrap_or(0)
    }

    /// Returns how often `token` occurred in documents labelled `category`.
    #[must_use]
    pub fn word_count(&self, category: &str, token: &str) -> u64 {
        self.word_counts
            .get(category)
            .and_then(|counts| counts.get(token))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the per-token counts for `category`.
    #[must_use]
    pub fn word_counts(&self, category: &str) -> Option<&TokenCounts> {
        self.word_counts.get(category)
    }

    /// Returns the total number of token occurrences in `category`.
    #[must_use]
    pub fn total_words(&self, category: &str) -> u64 {
        self.total_words.get(category).copied().unwrap_or(0)
    }

    /// Returns global token occurrence counts across all categories.
    #[must_use]
    pub fn vocabulary(&self) -> &TokenCounts {
        &self.vocabulary
    }

    /// Returns the number of distinct tokens seen during training.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Returns the number of training documents.
    #[must_use]
    pub fn total_documents(&self) -> u64 {
        self.total_documents
    }

    /// Returns the additive smoothing constant.
    #[must_use]
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Returns the tokenizer configuration used during training.
    #[must_use]
    pub fn tokenizer_config(&self) -> &TokenizerConfig {
        &self.tokenizer
    }

    /// Returns `true` when the model has seen at least one document.
    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.total_documents > 0 && !self.categories.is_empty()
    }

    /// Returns the prior probability of `category`, if the model is trained and knows it.
    #[must_use]
    pub fn prior(&self, category: &str) -> Option<f64> {
        if !self.is_trained() {
            return None;
        }
        self.category_counts
            .get(category)
            .map(|&count| count as f64 / self.total_documents as f64)
    }

    /// Classifies `text`, returning `None` when the model is untrained.
    #[must_use]
    pub fn predict(&self, text: &str) -> Option<Prediction> {
        if !self.is_trained() {
            return None;
        }
        let tokens = Tokenizer::from_validated(self.tokenizer.clone()).tokenize(text);
        self.predict_tokens(&tokens)
    }

    /// Scores an already tokenized document.
    #[must_use]
    pub fn predict_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Option<Prediction> {
        if !self.is_trained() {
            return None;
        }
        let log_scores: Vec<f64> = self
            .categories
            .iter()
            .map(|category| self.log_score(category, tokens))
            .collect();
        Prediction::from_log_scores(&self.categories, &log_scores)
    }

    /// Classifies many texts in parallel; results keep input order.
    #[must_use]
    pub fn predict_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<Option<Prediction>> {
        if !self.is_trained() {
            return vec![None; texts.len()];
        }
        let tokenizer = Tokenizer::from_validated(self.tokenizer.clone());
        texts
            .par_iter()
            .map(|text| self.predict_tokens(&tokenizer.tokenize(text.as_ref())))
            .collect()
    }

    fn log_score<S: AsRef<str>>(&self, category: &str, tokens: &[S]) -> f64 {
        let prior = self.document_count(category) as f64 / self.total_documents as f64;
        // Without a vocabulary every token term is the same for all categories.
        if self.vocabulary.is_empty() {
            return prior.ln();
        }
        let denominator =
            self.total_words(category) as f64 + self.vocabulary.len() as f64 * self.smoothing;
        let counts = self.word_counts.get(category);
        let likelihood: f64 = tokens
            .iter()
            .map(|token| {
                let count = counts
                    .and_then(|counts| counts.get(token.as_ref()))
                    .copied()
                    .unwrap_or(0);
                ((count as f64 + self.smoothing) / denominator).ln()
            })
            .sum();
        prior.ln() + likelihood
    }

    /// Checks the structural invariants of a trained model.
    ///
    /// Every persisted model passes through this check when it is loaded.
    pub fn validate(&self) -> Result<()> {
        if !self.smoothing.is_finite() || self.smoothing <= 0.0 {
            return Err(NbError::InvalidModel(format!(
                "smoothing must be a positive finite number, found {}",
                self.smoothing
            )));
        }
        self.tokenizer
            .validate()
            .map_err(|err| NbError::InvalidModel(err.to_string()))?;

        let mut seen = FxHashSet::default();
        for category in &self.categories {
            if !seen.insert(category.as_str()) {
                return Err(NbError::InvalidModel(format!(
                    "category {category:?} is listed more than once"
                )));
            }
        }
        check_keys("category_counts", &seen, self.category_counts.keys())?;
        check_keys("word_counts", &seen, self.word_counts.keys())?;
        check_keys("total_words", &seen, self.total_words.keys())?;

        let mut documents = 0u64;
        let mut vocabulary: FxHashMap<&str, u64> = FxHashMap::default();
        for category in &self.categories {
            let count = self.document_count(category);
            if count == 0 {
                return Err(NbError::InvalidModel(format!(
                    "category {category:?} has no training documents"
                )));
            }
            documents = add_counts(documents, count, "total_documents")?;

            let mut words = 0u64;
            if let Some(counts) = self.word_counts.get(category) {
                for (token, &occurrences) in counts {
                    words = add_counts(words, occurrences, "total_words")?;
                    let total = vocabulary.entry(token.as_str()).or_insert(0);
                    *total = add_counts(*total, occurrences, "vocabulary")?;
                }
            }
            if words != self.total_words(category) {
                return Err(NbError::InvalidModel(format!(
                    "total_words for {category:?} is {} but its word counts sum to {words}",
                    self.total_words(category)
                )));
            }
        }
        if documents != self.total_documents {
            return Err(NbError::InvalidModel(format!(
                "total_documents is {} but category counts sum to {documents}",
                self.total_documents
            )));
        }
        let vocabulary_matches = vocabulary.len() == self.vocabulary.len()
            && vocabulary
                .iter()
                .all(|(token, count)| self.vocabulary.get(*token) == Some(count));
        if !vocabulary_matches {
            return Err(NbError::InvalidModel(
                "vocabulary does not match the per-category word counts".into(),
            ));
        }
        Ok(())
    }

    /// Atomically writes the model to `path` as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<()> {
        save_model(self, path, pretty)
    }

    /// Serialises the model to a JSON string.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        model_json(self, pretty)
    }

    /// Loads and validates a model previously written with [`Self::save_json`].
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_model(path)
    }
}

fn add_counts(lhs: u64, rhs: u64, field: &str) -> Result<u64> {
    lhs.checked_add(rhs)
        .ok_or_else(|| NbError::InvalidModel(format!("{field} overflows a 64-bit counter")))
}

fn check_keys<'a, I>(field: &str, expected: &FxHashSet<&str>, keys: I) -> Result<()>
where
    I: ExactSizeIterator<Item = &'a String>,
{
    let len = keys.len();
    let mut unknown = Vec::new();
    for key in keys {
        if !expected.contains(key.as_str()) {
            unknown.push(key.clone());
        }
    }
    if !unknown.is_empty() {
        unknown.sort();
        return Err(NbError::InvalidModel(format!(
            "{field} contains unknown categories: {}",
            unknown.join(", ")
        )));
    }
    if len != expected.len() {
        return Err(NbError::InvalidModel(format!(
            "{field} has {len} categories but {} are declared",
            expected.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LabeledText;
    use crate::trainer::Trainer;
    use crate::TrainerConfig;

    fn train(examples: &[(&str, &str)]) -> NaiveBayesModel {
        let examples: Vec<LabeledText> = examples
            .iter()
            .map(|(category, text)| LabeledText::new(*text, *category))
            .collect();
        let cfg = TrainerConfig::builder().show_progress(false).build().unwrap();
        Trainer::new(cfg).train(&examples).unwrap().model
    }

    fn sample_model() -> NaiveBayesModel {
        train(&[
            ("sports", "The team won the football game"),
            ("sports", "Great match and a late goal won the championship"),
            ("sports", "The striker scored twice in the final game"),
            ("politics", "The election results are in"),
            ("politics", "Parliament passed the new budget after a long debate"),
        ])
    }

    #[test]
    fn distribution_sums_to_one() {
        let model = sample_model();
        for text in ["football game tonight", "budget debate", "", "unrelated words entirely"] {
            let prediction = model.predict(text).expect("trained model predicts");
            let total: f64 = prediction.scores().iter().map(|s| s.probability).sum();
            assert!((total - 1.0).abs() < 1e-9, "distribution for {text:?} sums to {total}");
        }
    }

    #[test]
    fn unseen_tokens_have_finite_scores() {
        let model = sample_model();
        let prediction = model
            .predict("zyzzyva quokka xylophone")
            .expect("trained model predicts");
        for score in prediction.scores() {
            assert!(score.log_score.is_finite());
            assert!(score.probability > 0.0);
        }
    }

    #[test]
    fn picks_category_with_matching_vocabulary() {
        let model = sample_model();
        assert_eq!(model.predict("football game").unwrap().category(), "sports");
        assert_eq!(
            model.predict("election budget debate").unwrap().category(),
            "politics"
        );
    }

    #[test]
    fn empty_text_falls_back_to_prior() {
        let model = sample_model();
        let prediction = model.predict("").unwrap();
        assert_eq!(prediction.category(), "sports");
        assert!((prediction.confidence() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn equal_priors_prefer_first_seen_category() {
        let model = train(&[("beta", "alpha words"), ("alpha", "beta words")]);
        assert_eq!(model.categories(), &["beta".to_string(), "alpha".to_string()]);
        assert_eq!(model.predict("").unwrap().category(), "beta");
    }

    #[test]
    fn untrained_model_yields_no_prediction() {
        let model = NaiveBayesModel::empty(TokenizerConfig::default());
        assert!(!model.is_trained());
        assert!(model.predict("anything at all").is_none());
        assert!(model.predict("").is_none());
        assert_eq!(model.predict_batch(&["one", "two"]), vec![None, None]);
        assert_eq!(model.prior("sports"), None);
    }

    #[test]
    fn log_score_matches_closed_form() {
        let model = train(&[("a", "red apple"), ("b", "green pear")]);
        // vocabulary: red, apple, red_apple, green, pear, green_pear
        assert_eq!(model.vocabulary_size(), 6);
        let prediction = model.predict("red").unwrap();
        let expected_a = (0.5f64).ln() + ((1.0 + 1.0) / (3.0 + 6.0f64)).ln();
        let expected_b = (0.5f64).ln() + ((0.0 + 1.0) / (3.0 + 6.0f64)).ln();
        assert!((prediction.scores()[0].log_score - expected_a).abs() < 1e-12);
        assert!((prediction.scores()[1].log_score - expected_b).abs() < 1e-12);
        assert_eq!(prediction.category(), "a");
    }

    #[test]
    fn batch_prediction_matches_single_prediction() {
        let model = sample_model();
        let texts = ["football game", "election budget", ""];
        let batch = model.predict_batch(&texts);
        for (text, result) in texts.iter().zip(batch) {
            assert_eq!(result, model.predict(text));
        }
    }

    #[test]
    fn trained_model_passes_validation() {
        sample_model().validate().expect("trained model is consistent");
        NaiveBayesModel::empty(TokenizerConfig::default())
            .validate()
            .expect("empty model is consistent");
    }

    #[test]
    fn validation_rejects_inconsistent_totals() {
        let mut model = sample_model();
        model.total_documents += 1;
        assert!(matches!(model.validate(), Err(NbError::InvalidModel(_))));

        let mut model = sample_model();
        model.total_words.insert("sports".into(), 0);
        assert!(matches!(model.validate(), Err(NbError::InvalidModel(_))));

        let mut model = sample_model();
        model.categories.push("sports".into());
        assert!(matches!(model.validate(), Err(NbError::InvalidModel(_))));
    }

    #[test]
    fn validation_rejects_overflowing_counts() {
        let mut model = sample_model();
        model.category_counts.insert("sports".into(), u64::MAX);
        assert!(matches!(model.validate(), Err(NbError::InvalidModel(_))));

        let mut model = sample_model();
        if let Some(counts) = model.word_counts.get_mut("politics") {
            counts.insert("election".into(), u64::MAX);
        }
        assert!(matches!(model.validate(), Err(NbError::InvalidModel(_))));
    }

    #[test]
    fn tokenless_training_data_predicts_from_priors() {
        let model = train(&[("x", "the a an"), ("y", "?? !!"), ("y", "is it")]);
        assert!(model.is_trained());
        assert_eq!(model.vocabulary_size(), 0);

        let prediction = model.predict("football game").unwrap();
        assert_eq!(prediction.category(), "y");
        assert!((prediction.confidence() - 2.0 / 3.0).abs() < 1e-12);
        let total: f64 = prediction.scores().iter().map(|s| s.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);
        for score in prediction.scores() {
            assert!(score.log_score.is_finite());
        }
    }
}
