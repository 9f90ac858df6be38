use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use amygdala::export::{
    batch_classify, export_corpus_examples, load_saved_results, save_classification_results, HistoryStats,
    ResultRow,
};
use amygdala::{evaluate, Classifier, Corpus, TrainingConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Train on this corpus (JSON array or Text,Category CSV) instead of the built-in one
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Directory for the cached model
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Ignore any cached model and retrain
    #[arg(short, long, global = true)]
    fresh: bool,

    /// Never read or write the cached model
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a single text
    Classify {
        text: String,
    },
    /// Classify every non-blank line of a file and save the results as CSV
    Batch {
        input: PathBuf,
        /// Directory for the results file
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
    },
    /// Cross-validated accuracy and a per-class report
    Metrics,
    /// Statistics about the training corpus
    Stats,
    /// Write the training corpus to a JSON file
    ExportExamples {
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
    },
    /// Summarize every results file saved by `batch`
    History {
        #[arg(long, default_value = "data")]
        dir: PathBuf,
    },
}

fn load_corpus(args: &Args) -> Result<Corpus> {
    match &args.corpus {
        Some(path) => Corpus::from_path(path).with_context(|| format!("Failed to load corpus from {:?}", path)),
        None => Ok(Corpus::builtin()),
    }
}

fn build_classifier(args: &Args, corpus: Corpus) -> Result<Classifier> {
    let start_time = Instant::now();
    info!("Building classifier...");

    let mut builder = Classifier::builder().with_corpus(corpus).fresh(args.fresh);
    if args.no_cache {
        builder = builder.without_cache();
    } else if let Some(dir) = &args.cache_dir {
        builder = builder.with_cache_dir(dir);
    }
    let classifier = builder.build().context("Failed to build classifier")?;

    info!("=== Classifier Ready (took {:.2?}) ===", start_time.elapsed());
    Ok(classifier)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let corpus = load_corpus(&args)?;

    match &args.command {
        Command::Classify { text } => {
            let classifier = build_classifier(&args, corpus)?;
            let result = classifier.classify(text)?;

            println!("\nResults:");
            println!("  Category: {}", result.category);
            println!("  Description: {}", result.description);
            println!("  Model prediction: {} (margin {:.3})", result.raw_prediction, result.margin);
            match result.rule {
                Some(rule) => println!("  Override rule: {}", rule.as_str()),
                None => println!("  Override rule: none"),
            }
        }
        Command::Batch { input, out_dir } => {
            let content = fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?;
            let texts: Vec<&str> = content.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
            if texts.is_empty() {
                anyhow::bail!("{:?} contains no text to classify", input);
            }

            let classifier = build_classifier(&args, corpus)?;
            let classify_start = Instant::now();
            let items = batch_classify(&classifier, &texts)?;
            info!(
                "Classified {} texts in {:.2?}",
                items.len(),
                classify_start.elapsed()
            );

            for item in &items {
                let preview: String = item.text.chars().take(40).collect();
                println!("{:<42} -> {:<14} ({})", preview, item.category.as_str(), item.description);
            }

            let mut counts = std::collections::BTreeMap::new();
            for item in &items {
                *counts.entry(item.category).or_insert(0usize) += 1;
            }
            println!("\nSummary:");
            for (category, count) in counts {
                println!("  {}: {}", category, count);
            }

            let rows: Vec<ResultRow> = items.iter().map(ResultRow::from).collect();
            let path = save_classification_results(out_dir, &rows, None)?;
            println!("\nResults saved to {}", path.display());
        }
        Command::Metrics => {
            let metrics = evaluate(&corpus, &TrainingConfig::default())?;
            let folds: Vec<String> = metrics.fold_scores.iter().map(|s| format!("{:.3}", s)).collect();
            println!("Cross-validation scores: [{}]", folds.join(", "));
            println!(
                "Mean accuracy: {:.3} (+/- {:.3})",
                metrics.mean_accuracy, metrics.std_accuracy
            );
            println!("\nClassification report (on training data, optimistic):\n");
            print!("{}", metrics.training_report);
        }
        Command::Stats => {
            let stats = corpus.stats();
            println!("Total examples: {}", stats.total_examples);
            let categories: Vec<&str> = stats.categories.iter().map(|c| c.as_str()).collect();
            println!("Categories: {}", categories.join(", "));
            println!("Category distribution:");
            for (category, count) in &stats.category_distribution {
                println!("  - {}: {} examples", category, count);
            }
            println!("Average example length: {:.1} characters", stats.average_example_length);
            println!("Fingerprint: {}", corpus.fingerprint());
        }
        Command::ExportExamples { out_dir } => {
            let path = export_corpus_examples(out_dir, &corpus)?;
            println!("Exported classifier examples to: {}", path.display());
        }
        Command::History { dir } => {
            let results = load_saved_results(dir)?;
            if results.is_empty() {
                println!("No historical data found in {}. Use `batch` to generate data.", dir.display());
                return Ok(());
            }

            let stats = HistoryStats::from_results(&results);
            println!("Total classifications: {}", stats.total_classifications);
            println!("Unique texts: {}", stats.unique_texts);
            println!("Data sources: {}", stats.data_sources);
            println!("Category distribution:");
            for (category, count) in &stats.category_distribution {
                println!("  - {}: {}", category, count);
            }

            if let Some(latest) = results.iter().filter_map(|r| r.timestamp).max() {
                println!("Most recent run: {}", latest.format("%Y-%m-%d %H:%M:%S"));
            }
        }
    }

    Ok(())
}
