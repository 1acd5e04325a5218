//! Accuracy and confusion matrix reporting over labelled test data.

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::corpus::{with_io_path, LabeledText};
use crate::error::{NbError, Result};
use crate::model::NaiveBayesModel;

/// Header of the corner cell in confusion matrix tables.
pub const MATRIX_CORNER: &str = "Actual\\Predicted";

/// Square matrix of actual (rows) versus predicted (columns) category counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    /// Creates an all-zero matrix over `labels`.
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        let size = labels.len();
        Self {
            labels,
            counts: vec![vec![0; size]; size],
        }
    }

    /// Returns the row and column labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the count for an (actual, predicted) pair; unknown labels count as zero.
    #[must_use]
    pub fn count(&self, actual: &str, predicted: &str) -> u64 {
        match (self.index_of(actual), self.index_of(predicted)) {
            (Some(row), Some(col)) => self.counts[row][col],
            _ => 0,
        }
    }

    /// Returns the matrix rows in label order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<u64>] {
        &self.counts
    }

    /// Returns the total number of recorded observations.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|candidate| candidate == label)
    }

    fn ensure_label(&mut self, label: &str) -> usize {
        if let Some(idx) = self.index_of(label) {
            return idx;
        }
        self.labels.push(label.to_string());
        for row in &mut self.counts {
            row.push(0);
        }
        self.counts.push(vec![0; self.labels.len()]);
        self.labels.len() - 1
    }

    fn record(&mut self, actual: &str, predicted: &str) {
        let row = self.ensure_label(actual);
        let col = self.ensure_label(predicted);
        self.counts[row][col] += 1;
    }

    /// Writes the matrix as CSV with a corner header cell.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| NbError::io(err, Some(path.to_path_buf())))?;
        self.write_csv_to(file).map_err(|err| with_io_path(err, path))
    }

    /// Writes the matrix as CSV into an arbitrary writer.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        let mut header = Vec::with_capacity(self.labels.len() + 1);
        header.push(MATRIX_CORNER.to_string());
        header.extend(self.labels.iter().cloned());
        writer.write_record(&header)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(label.clone());
            record.extend(row.iter().map(u64::to_string));
            writer.write_record(&record)?;
        }
        writer.flush().map_err(|err| NbError::io(err, None))?;
        Ok(())
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(String::len)
            .chain(self.counts.iter().flatten().map(|count| count.to_string().len()))
            .max()
            .unwrap_or(0)
            .max(4);
        let corner = MATRIX_CORNER.len().max(width);

        write!(f, "{MATRIX_CORNER:<corner$}")?;
        for label in &self.labels {
            write!(f, "  {label:>width$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{label:<corner$}")?;
            for count in row {
                write!(f, "  {count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Result of evaluating a model on labelled data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Number of examples evaluated.
    pub total: usize,
    /// Number of examples whose prediction matched the label.
    pub correct: usize,
    /// Actual versus predicted counts.
    pub confusion: ConfusionMatrix,
}

impl EvaluationReport {
    /// Fraction of correct predictions, or `None` for an empty test set.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.correct as f64 / self.total as f64)
    }

    /// Counts of predictions per predicted category, in matrix label order.
    #[must_use]
    pub fn predicted_totals(&self) -> FxHashMap<&str, u64> {
        let mut totals = FxHashMap::default();
        for (col, label) in self.confusion.labels.iter().enumerate() {
            let sum = self.confusion.counts.iter().map(|row| row[col]).sum();
            totals.insert(label.as_str(), sum);
        }
        totals
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accuracy() {
            Some(accuracy) => writeln!(
                f,
                "Accuracy: {:.2}% ({}/{})",
                accuracy * 100.0,
                self.correct,
                self.total
            )?,
            None => writeln!(f, "Accuracy: n/a (no test examples)")?,
        }
        writeln!(f)?;
        writeln!(f, "Confusion Matrix:")?;
        write!(f, "{}", self.confusion)
    }
}

/// Runs the model over `examples` and aggregates accuracy and a confusion matrix.
///
/// Matrix labels are the model's categories followed by any test labels the
/// model never saw. An untrained model is reported as an error because it
/// cannot produce predictions.
pub fn evaluate(model: &NaiveBayesModel, examples: &[LabeledText]) -> Result<EvaluationReport> {
    if !model.is_trained() {
        return Err(NbError::InvalidModel(
            "cannot evaluate a model trained on zero documents".into(),
        ));
    }
    let mut confusion = ConfusionMatrix::new(model.categories().to_vec());
    for example in examples {
        confusion.ensure_label(&example.category);
    }

    let texts: Vec<&str> = examples.iter().map(|example| example.text.as_str()).collect();
    let predictions = model.predict_batch(&texts);

    let mut correct = 0usize;
    for (example, prediction) in examples.iter().zip(predictions) {
        let Some(prediction) = prediction else {
            continue;
        };
        if prediction.category() == example.category {
            correct += 1;
        }
        confusion.record(&example.category, prediction.category());
    }

    Ok(EvaluationReport {
        total: examples.len(),
        correct,
        confusion,
    })
}
