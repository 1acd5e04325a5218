use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use nbclassify::corpus::{load_labeled_csv, load_text_csv, write_classifications};
use nbclassify::{
    evaluate, Classification, CorpusConfig, NaiveBayesModel, Prediction, TokenizerConfig, Trainer,
    TrainerConfig,
};
use serde_json::json;

const DEFAULT_MODEL: &str = "model.json";
const DEFAULT_CLASSIFICATIONS: &str = "classifications.csv";
const DEFAULT_CONFUSION_MATRIX: &str = "confusion_matrix.csv";
const CLASSIFY_CHUNK: usize = 100;

#[derive(Parser, Debug)]
#[command(author, version, about = "Naive Bayes text classifier", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a model from a CSV file with `category` and `text` columns
    Train(TrainArgs),
    /// Evaluate a model on labelled CSV data, or classify interactively
    Predict(PredictArgs),
    /// Classify text typed on standard input
    Interactive(InteractiveArgs),
    /// Classify every `text` row of a CSV file
    Classify(ClassifyArgs),
    /// Inspect a persisted model
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct CorpusArgs {
    /// CSV field delimiter
    #[arg(long, value_name = "CHAR", default_value_t = ',')]
    delimiter: char,

    /// Keep leading and trailing whitespace in CSV fields
    #[arg(long)]
    no_trim: bool,
}

impl CorpusArgs {
    fn to_config(&self) -> Result<CorpusConfig> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| anyhow!("delimiter must be a single ASCII character"))?;
        Ok(CorpusConfig::builder()
            .delimiter(delimiter)
            .trim(!self.no_trim)
            .build())
    }
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Labelled training data
    input: PathBuf,

    /// Output path for the model
    #[arg(value_name = "MODEL_OUT", default_value = DEFAULT_MODEL)]
    output: PathBuf,

    /// Minimum word length kept by the tokenizer
    #[arg(long, value_name = "LEN")]
    min_token_len: Option<usize>,

    /// Disable bigram features
    #[arg(long)]
    no_bigrams: bool,

    /// Disable the built-in English stop-word list
    #[arg(long)]
    no_english_stop_words: bool,

    /// Additional stop words (repeat flag)
    #[arg(long = "stop-word", value_name = "WORD")]
    stop_words: Vec<String>,

    /// Emit compact single-line JSON
    #[arg(long)]
    compact: bool,

    /// Disable training progress output
    #[arg(long)]
    no_progress: bool,

    #[command(flatten)]
    corpus: CorpusArgs,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Model JSON to load
    model: PathBuf,

    /// Labelled test data; omit to start interactive mode
    test_input: Option<PathBuf>,

    /// Where to write the confusion matrix CSV
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFUSION_MATRIX)]
    matrix_output: PathBuf,

    #[command(flatten)]
    corpus: CorpusArgs,
}

#[derive(Args, Debug)]
struct InteractiveArgs {
    /// Model JSON to load
    model: PathBuf,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Model JSON to load
    model: PathBuf,

    /// CSV file with a `text` column
    input: PathBuf,

    /// Output CSV path
    #[arg(value_name = "OUTPUT", default_value = DEFAULT_CLASSIFICATIONS)]
    output: PathBuf,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    #[command(flatten)]
    corpus: CorpusArgs,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Model JSON to inspect
    model: PathBuf,

    /// Emit machine-readable JSON summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let quiet = cli.quiet > 0;

    match cli.command {
        Commands::Train(args) => run_train(args, quiet),
        Commands::Predict(args) => run_predict(args),
        Commands::Interactive(args) => run_interactive(args),
        Commands::Classify(args) => run_classify(args, quiet),
        Commands::Info(args) => run_info(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn load_model(path: &Path) -> Result<NaiveBayesModel> {
    let model = NaiveBayesModel::load_json(path)
        .with_context(|| format!("failed to load model from {}", path.display()))?;
    info!("model loaded from {}", path.display());
    Ok(model)
}

fn run_train(args: TrainArgs, quiet: bool) -> Result<()> {
    let mut tokenizer = TokenizerConfig::builder()
        .bigrams(!args.no_bigrams)
        .english_stop_words(!args.no_english_stop_words)
        .extra_stop_words(args.stop_words.iter().cloned());
    if let Some(len) = args.min_token_len {
        tokenizer = tokenizer.min_token_len(len);
    }
    let trainer_cfg = TrainerConfig::builder()
        .tokenizer(tokenizer.build()?)
        .show_progress(!args.no_progress)
        .build()?;

    let corpus = args.corpus.to_config()?;
    let examples = load_labeled_csv(&args.input, &corpus)
        .with_context(|| format!("failed to load training data from {}", args.input.display()))?;
    if examples.is_empty() {
        bail!("no training data found in {}", args.input.display());
    }
    info!("loaded {} training examples", examples.len());

    let spinner = if args.no_progress || quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} counting tokens... {elapsed}")
            .context("invalid progress template")?;
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    };

    let trainer = Trainer::new(trainer_cfg);
    let artifacts = trainer.train(&examples)?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let model = &artifacts.model;
    model
        .save_json(&args.output, !args.compact)
        .with_context(|| format!("failed to save model to {}", args.output.display()))?;

    println!("Training completed. Categories: {}", model.categories().join(", "));
    println!("Total documents: {}", model.total_documents());
    println!("Vocabulary size: {}", model.vocabulary_size());
    println!("Model saved to {}", args.output.display());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let Some(test_input) = &args.test_input else {
        let stdin = io::stdin();
        return interactive_loop(&model, stdin.lock(), io::stdout().lock());
    };

    let corpus = args.corpus.to_config()?;
    let examples = load_labeled_csv(test_input, &corpus)
        .with_context(|| format!("failed to load test data from {}", test_input.display()))?;
    if examples.is_empty() {
        warn!("no test examples found in {}", test_input.display());
    }

    let start = Instant::now();
    let report = evaluate(&model, &examples)?;
    info!("evaluated {} examples in {:.2?}", report.total, start.elapsed());

    println!("{report}");
    report
        .confusion
        .write_csv(&args.matrix_output)
        .with_context(|| {
            format!(
                "failed to write confusion matrix to {}",
                args.matrix_output.display()
            )
        })?;
    println!("Confusion matrix saved to {}", args.matrix_output.display());
    Ok(())
}

fn run_interactive(args: InteractiveArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let stdin = io::stdin();
    interactive_loop(&model, stdin.lock(), io::stdout().lock())
}

fn interactive_loop<R: BufRead, W: Write>(
    model: &NaiveBayesModel,
    input: R,
    mut output: W,
) -> Result<()> {
    writeln!(output, "=== Interactive Classification Mode ===")?;
    writeln!(output, "Enter text to classify (or 'quit' to exit):")?;
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line.context("failed to read from stdin")?;
        let text = line.trim();
        if text == "quit" || text == "exit" {
            break;
        }
        if !text.is_empty() {
            match model.predict(text) {
                Some(prediction) => print_prediction(&mut output, &prediction)?,
                None => writeln!(output, "No prediction possible: the model has no training data")?,
            }
            writeln!(output)?;
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}

fn print_prediction<W: Write>(output: &mut W, prediction: &Prediction) -> Result<()> {
    writeln!(output, "Predicted category: {}", prediction.category())?;
    writeln!(output, "Probabilities:")?;
    for score in prediction.ranked() {
        writeln!(output, "  {}: {:.3}", score.category, score.probability)?;
    }
    Ok(())
}

fn run_classify(args: ClassifyArgs, quiet: bool) -> Result<()> {
    let model = load_model(&args.model)?;
    let corpus = args.corpus.to_config()?;
    let texts = load_text_csv(&args.input, &corpus)
        .with_context(|| format!("failed to load text data from {}", args.input.display()))?;
    if texts.is_empty() {
        bail!("no text data found in {}", args.input.display());
    }
    info!("loaded {} texts to classify", texts.len());
    if !model.is_trained() {
        warn!("model has no training data; every prediction will be empty");
    }

    let progress = if args.no_progress || quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(texts.len() as u64);
        let style = ProgressStyle::with_template("{bar:40} {pos}/{len} texts classified {elapsed}")
            .context("invalid progress template")?;
        pb.set_style(style);
        pb
    };

    let mut results = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(CLASSIFY_CHUNK) {
        let predictions = model.predict_batch(chunk);
        for (text, prediction) in chunk.iter().zip(predictions) {
            let (predicted_category, confidence) = match prediction {
                Some(prediction) => (prediction.category().to_string(), prediction.confidence()),
                None => (String::new(), 0.0),
            };
            results.push(Classification {
                text: text.clone(),
                predicted_category,
                confidence,
            });
        }
        progress.inc(chunk.len() as u64);
    }
    progress.finish_and_clear();

    write_classifications(&args.output, &results)
        .with_context(|| format!("failed to write results to {}", args.output.display()))?;
    println!("Classification completed! Results saved to {}", args.output.display());
    print_classification_summary(&model, &results);
    Ok(())
}

fn print_classification_summary(model: &NaiveBayesModel, results: &[Classification]) {
    let total = results.len() as f64;
    println!();
    println!("Classification Summary:");
    for category in model.categories() {
        let count = results
            .iter()
            .filter(|result| &result.predicted_category == category)
            .count();
        if count > 0 {
            println!(
                "  {}: {} ({:.1}%)",
                category,
                count,
                count as f64 / total * 100.0
            );
        }
    }
    let confidence: f64 = results.iter().map(|result| result.confidence).sum();
    println!("Average confidence: {:.3}", confidence / total);
}

fn run_info(args: InfoArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let categories: Vec<_> = model
        .categories()
        .iter()
        .map(|category| {
            json!({
                "name": category,
                "documents": model.document_count(category),
                "tokens": model.total_words(category),
                "prior": model.prior(category),
            })
        })
        .collect();
    let tokenizer = model.tokenizer_config();
    let summary = json!({
        "path": args.model.display().to_string(),
        "total_documents": model.total_documents(),
        "vocabulary_size": model.vocabulary_size(),
        "smoothing": model.smoothing(),
        "categories": categories,
        "tokenizer": tokenizer,
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Documents    : {}", model.total_documents());
    println!("Vocab size   : {}", model.vocabulary_size());
    println!("Smoothing    : {}", model.smoothing());
    println!(
        "Tokenizer    : min_len={} bigrams={} english_stop_words={} extra_stop_words={}",
        tokenizer.min_token_len,
        tokenizer.bigrams,
        tokenizer.english_stop_words,
        tokenizer.extra_stop_words.len()
    );
    if model.categories().is_empty() {
        println!("Categories   : (none)");
    } else {
        println!("Categories   :");
        for category in model.categories() {
            println!(
                "  {:<20} documents={:<8} tokens={:<10} prior={:.4}",
                category,
                model.document_count(category),
                model.total_words(category),
                model.prior(category).unwrap_or(0.0)
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbclassify::LabeledText;

    fn model() -> NaiveBayesModel {
        let cfg = TrainerConfig::builder().show_progress(false).build().unwrap();
        let examples = vec![
            LabeledText::new("football match goal", "sports"),
            LabeledText::new("election ballot vote", "politics"),
        ];
        Trainer::new(cfg).train(&examples).unwrap().model
    }

    #[test]
    fn interactive_loop_prints_sorted_probabilities_and_stops_on_quit() {
        let input = b"football goal\n\nquit\nelection\n".as_slice();
        let mut output = Vec::new();
        interactive_loop(&model(), input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Predicted category: sports"));
        assert!(!text.contains("Predicted category: politics"));
        let sports = text.find("  sports:").unwrap();
        let politics = text.find("  politics:").unwrap();
        assert!(sports < politics);
    }

    #[test]
    fn interactive_loop_reports_untrained_model() {
        let model = NaiveBayesModel::empty(TokenizerConfig::default());
        let mut output = Vec::new();
        interactive_loop(&model, b"hello world\n".as_slice(), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("No prediction possible"));
    }
}
