//! Multinomial Naive Bayes text classification library and CLI.
//!
//! The crate exposes both a library API and an `nbclassify` command line
//! interface.  Typical usage loads a labelled CSV corpus, trains a
//! `NaiveBayesModel`, persists it as JSON, and later classifies new text with
//! a probability for every category.
//!
//! ```no_run
//! use nbclassify::{CorpusConfig, NaiveBayesModel, Trainer, TrainerConfig};
//!
//! # fn main() -> nbclassify::Result<()> {
//! let trainer_cfg = TrainerConfig::builder().show_progress(false).build()?;
//! let trainer = Trainer::new(trainer_cfg);
//! let artifacts = trainer.train_from_csv("training.csv", &CorpusConfig::default())?;
//! artifacts.model.save_json("model.json", true)?;
//!
//! let model = NaiveBayesModel::load_json("model.json")?;
//! if let Some(prediction) = model.predict("The striker scored in the final minute") {
//!     println!("{} ({:.3})", prediction.category(), prediction.confidence());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature.  Users targeting the
//! library portion only can disable default features to avoid the CLI
//! dependencies: `nbclassify = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::multiple_crate_versions,
    clippy::cast_precision_loss
)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod model;
pub mod prediction;
pub mod serialization;
pub mod stopwords;
pub mod tokenizer;
pub mod trainer;

pub use config::{CorpusConfig, TokenizerBuilder, TokenizerConfig, TrainerBuilder, TrainerConfig};
pub use corpus::{Classification, LabeledText};
pub use error::{NbError, Result};
pub use evaluation::{evaluate, ConfusionMatrix, EvaluationReport};
pub use metrics::TrainingMetrics;
pub use model::{NaiveBayesModel, LAPLACE_SMOOTHING};
pub use prediction::{CategoryScore, Prediction};
pub use tokenizer::{tokenize, Tokenizer};
pub use trainer::{Trainer, TrainerArtifacts};
