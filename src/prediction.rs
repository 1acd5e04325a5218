//! Prediction results and log-score normalisation.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Score assigned to a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Category label.
    pub category: String,
    /// Unnormalised log-probability (log prior plus summed log likelihoods).
    pub log_score: f64,
    /// Normalised probability; all probabilities of a prediction sum to one.
    pub probability: f64,
}

/// Outcome of classifying one text against a trained model.
///
/// Scores are stored in the model's category order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPrediction")]
pub struct Prediction {
    best: usize,
    scores: Vec<CategoryScore>,
}

#[derive(Deserialize)]
struct RawPrediction {
    best: usize,
    scores: Vec<CategoryScore>,
}

impl TryFrom<RawPrediction> for Prediction {
    type Error = String;

    fn try_from(raw: RawPrediction) -> Result<Self, Self::Error> {
        if raw.best >= raw.scores.len() {
            return Err(format!(
                "best index {} is out of range for {} scores",
                raw.best,
                raw.scores.len()
            ));
        }
        Ok(Self {
            best: raw.best,
            scores: raw.scores,
        })
    }
}

impl Prediction {
    /// Builds a prediction from raw log-scores aligned with `categories`.
    ///
    /// The winner is the first category holding the strictly greatest raw
    /// log-score. Probabilities are derived with a log-sum-exp shift and do
    /// not influence the winner. Returns `None` when there is nothing to score.
    #[must_use]
    pub fn from_log_scores(categories: &[String], log_scores: &[f64]) -> Option<Self> {
        if categories.is_empty() || categories.len() != log_scores.len() {
            return None;
        }

        let mut best = 0usize;
        for (idx, &score) in log_scores.iter().enumerate().skip(1) {
            if score > log_scores[best] {
                best = idx;
            }
        }

        let max_score = log_scores[best];
        let shifted: Vec<f64> = log_scores
            .iter()
            .map(|&score| (score - max_score).exp())
            .collect();
        let total: f64 = shifted.iter().sum();

        let scores = categories
            .iter()
            .zip(log_scores)
            .zip(shifted)
            .map(|((category, &log_score), weight)| CategoryScore {
                category: category.clone(),
                log_score,
                probability: weight / total,
            })
            .collect();

        Some(Self { best, scores })
    }

    /// Returns the predicted category label.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.scores[self.best].category
    }

    /// Returns the normalised probability of the predicted category.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.scores[self.best].probability
    }

    /// Returns every category score in model order.
    #[must_use]
    pub fn scores(&self) -> &[CategoryScore] {
        &self.scores
    }

    /// Returns the normalised probability assigned to `category`, if known.
    #[must_use]
    pub fn probability(&self, category: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|score| score.category == category)
            .map(|score| score.probability)
    }

    /// Returns scores sorted by descending probability; ties keep model order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&CategoryScore> {
        let mut ranked: Vec<&CategoryScore> = self.scores.iter().collect();
        ranked.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn highest_log_score_wins() {
        let prediction =
            Prediction::from_log_scores(&labels(&["a", "b", "c"]), &[-3.0, -1.0, -2.0]).unwrap();
        assert_eq!(prediction.category(), "b");
        let ranked: Vec<&str> = prediction
            .ranked()
            .iter()
            .map(|score| score.category.as_str())
            .collect();
        assert_eq!(ranked, vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_resolve_to_first_category() {
        let prediction =
            Prediction::from_log_scores(&labels(&["x", "y"]), &[-2.5, -2.5]).unwrap();
        assert_eq!(prediction.category(), "x");
        assert!((prediction.confidence() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn very_negative_scores_normalise_without_underflow() {
        let prediction =
            Prediction::from_log_scores(&labels(&["a", "b"]), &[-10_000.0, -10_001.0]).unwrap();
        let total: f64 = prediction.scores().iter().map(|s| s.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);
        let expected = 1.0 / (1.0 + (-1.0f64).exp());
        assert!((prediction.confidence() - expected).abs() < 1e-12);
        assert!(prediction.probability("b").unwrap() > 0.0);
    }

    #[test]
    fn empty_inputs_produce_no_prediction() {
        assert!(Prediction::from_log_scores(&[], &[]).is_none());
        assert!(Prediction::from_log_scores(&labels(&["a"]), &[]).is_none());
    }

    #[test]
    fn unknown_category_has_no_probability() {
        let prediction = Prediction::from_log_scores(&labels(&["a"]), &[-1.0]).unwrap();
        assert_eq!(prediction.probability("zzz"), None);
        assert!((prediction.confidence() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn deserialization_rejects_out_of_range_winner() {
        let err = serde_json::from_str::<Prediction>(r#"{"best":5,"scores":[]}"#).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let prediction = Prediction::from_log_scores(&labels(&["a", "b"]), &[-1.0, -2.0]).unwrap();
        let json = serde_json::to_string(&prediction).unwrap();
        let restored: Prediction = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.category(), "a");
        assert!((restored.confidence() - prediction.confidence()).abs() < 1e-12);
    }
}
