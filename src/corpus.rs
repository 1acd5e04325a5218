//! Facilities for loading labelled and unlabelled text corpora from CSV files
//! and writing batch classification results.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::CorpusConfig;
use crate::error::{NbError, Result};

/// Column holding the category label of a training or test example.
pub const CATEGORY_COLUMN: &str = "category";
/// Column holding the free-form text of an example.
pub const TEXT_COLUMN: &str = "text";

/// A single labelled example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledText {
    /// Free-form document text.
    pub text: String,
    /// Category label assigned to the text.
    pub category: String,
}

impl LabeledText {
    /// Creates a labelled example.
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

/// One row of batch classification output.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Input text.
    pub text: String,
    /// Predicted category; empty when the model could not predict.
    pub predicted_category: String,
    /// Probability of the predicted category.
    pub confidence: f64,
}

/// Loads `category`/`text` records from a CSV file.
///
/// Header names are matched case-insensitively. Records too short to hold both
/// columns are skipped with a warning.
pub fn load_labeled_csv<P: AsRef<Path>>(path: P, cfg: &CorpusConfig) -> Result<Vec<LabeledText>> {
    let path = path.as_ref();
    let file = open(path)?;
    read_labeled(file, path, cfg)
}

/// Loads the `text` column from a CSV file.
pub fn load_text_csv<P: AsRef<Path>>(path: P, cfg: &CorpusConfig) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = open(path)?;
    read_texts(file, path, cfg)
}

/// Writes classification results as `text,predicted_category,confidence`.
///
/// Confidence is formatted with four decimal places.
pub fn write_classifications<P: AsRef<Path>>(path: P, results: &[Classification]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|err| NbError::io(err, Some(path.to_path_buf())))?;
    write_classification_records(file, results).map_err(|err| with_io_path(err, path))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| NbError::io(err, Some(path.to_path_buf())))
}

fn read_labeled<R: Read>(reader: R, path: &Path, cfg: &CorpusConfig) -> Result<Vec<LabeledText>> {
    let mut reader = csv_reader(reader, cfg);
    let headers = reader.headers()?.clone();
    let indices = find_columns(&headers, &[CATEGORY_COLUMN, TEXT_COLUMN], path)?;
    let (category_idx, text_idx) = (indices[0], indices[1]);

    let mut examples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        match (record.get(category_idx), record.get(text_idx)) {
            (Some(category), Some(text)) => examples.push(LabeledText::new(text, category)),
            _ => warn!(
                "skipping record {} in {}: expected at least {} fields, found {}",
                row + 1,
                path.display(),
                category_idx.max(text_idx) + 1,
                record.len()
            ),
        }
    }
    Ok(examples)
}

fn read_texts<R: Read>(reader: R, path: &Path, cfg: &CorpusConfig) -> Result<Vec<String>> {
    let mut reader = csv_reader(reader, cfg);
    let headers = reader.headers()?.clone();
    let text_idx = find_columns(&headers, &[TEXT_COLUMN], path)?[0];

    let mut texts = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        match record.get(text_idx) {
            Some(text) => texts.push(text.to_string()),
            None => warn!(
                "skipping record {} in {}: no {TEXT_COLUMN} field",
                row + 1,
                path.display()
            ),
        }
    }
    Ok(texts)
}

fn csv_reader<R: Read>(reader: R, cfg: &CorpusConfig) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(cfg.delimiter)
        .trim(if cfg.trim { Trim::All } else { Trim::None })
        .flexible(true)
        .from_reader(reader)
}

/// Resolves the index of every required column, reporting all missing ones at once.
fn find_columns(headers: &StringRecord, required: &[&str], path: &Path) -> Result<Vec<usize>> {
    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for name in required {
        // The last matching header wins, as with a plain left-to-right scan.
        match headers
            .iter()
            .enumerate()
            .filter(|(_, header)| header.trim().eq_ignore_ascii_case(name))
            .map(|(idx, _)| idx)
            .last()
        {
            Some(idx) => indices.push(idx),
            None => missing.push((*name).to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(NbError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }
    Ok(indices)
}

fn write_classification_records<W: Write>(writer: W, results: &[Classification]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(["text", "predicted_category", "confidence"])?;
    for result in results {
        let confidence = format!("{:.4}", result.confidence);
        writer.write_record([
            result.text.as_str(),
            result.predicted_category.as_str(),
            confidence.as_str(),
        ])?;
    }
    writer.flush().map_err(|err| NbError::io(err, None))?;
    Ok(())
}

/// Attaches `path` to IO errors that were raised without one.
pub(crate) fn with_io_path(err: NbError, path: &Path) -> NbError {
    match err {
        NbError::Io { source, path: None } => NbError::io(source, Some(path.to_path_buf())),
        other => other,
    }
}
