//! Saving classification results and exporting the corpus.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::classifier::{Category, Classifier, ClassifierError};
use crate::corpus::{Corpus, Example};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row of a results file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Category")]
    pub category: Category,
}

/// A classified text with its description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub text: String,
    pub category: Category,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
struct CorpusExport<'a> {
    examples: &'a [Example],
    fingerprint: String,
    exported_at: String,
}

const RESULTS_PREFIX: &str = "classification_results_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Default file name for a results CSV, e.g. `classification_results_20240102_030405.csv`.
pub fn default_results_filename() -> String {
    format!("{}{}.csv", RESULTS_PREFIX, timestamp())
}

/// The save time encoded in a results file name, if it has one.
pub fn parse_results_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let stamp = file_name.strip_prefix(RESULTS_PREFIX)?.strip_suffix(".csv")?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

/// Writes `Text,Category` rows to any writer, header first.
pub fn write_results<W: io::Write>(writer: W, rows: &[ResultRow]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        writer.write_record(["Text", "Category"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads rows written by [`write_results`], in order.
pub fn read_results<R: io::Read>(reader: R) -> Result<Vec<ResultRow>, ExportError> {
    let mut reader = csv::Reader::from_reader(reader);
    let rows = reader.deserialize().collect::<Result<Vec<ResultRow>, _>>()?;
    Ok(rows)
}

/// Saves results under `dir`, creating it if needed. Without a `filename` a
/// timestamped one is used. Returns the path written.
pub fn save_classification_results(
    dir: &Path,
    rows: &[ResultRow],
    filename: Option<&str>,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = match filename {
        Some(name) => dir.join(name),
        None => dir.join(default_results_filename()),
    };
    write_results(fs::File::create(&path)?, rows)?;
    log::info!("Saved {} classification results to {:?}", rows.len(), path);
    Ok(path)
}

pub fn load_classification_results(path: &Path) -> Result<Vec<ResultRow>, ExportError> {
    read_results(fs::File::open(path)?)
}

/// Classifies every text, stopping at the first failure.
pub fn batch_classify<S: AsRef<str>>(
    classifier: &Classifier,
    texts: &[S],
) -> Result<Vec<BatchItem>, ClassifierError> {
    texts
        .iter()
        .map(|text| {
            let text = text.as_ref();
            classifier.classify(text).map(|c| BatchItem {
                text: text.to_string(),
                category: c.category,
                description: c.description,
            })
        })
        .collect()
}

impl From<&BatchItem> for ResultRow {
    fn from(item: &BatchItem) -> Self {
        Self {
            text: item.text.clone(),
            category: item.category,
        }
    }
}

/// A row from a previously saved results file.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedResult {
    pub source_file: String,
    /// Parsed from the file name; `None` when the name carries no valid timestamp
    pub timestamp: Option<NaiveDateTime>,
    pub row: ResultRow,
}

/// Summary over every saved results file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_classifications: usize,
    pub unique_texts: usize,
    pub data_sources: usize,
    pub category_distribution: BTreeMap<Category, usize>,
}

impl HistoryStats {
    pub fn from_results(results: &[SavedResult]) -> Self {
        let mut category_distribution = BTreeMap::new();
        for result in results {
            *category_distribution.entry(result.row.category).or_insert(0) += 1;
        }
        Self {
            total_classifications: results.len(),
            unique_texts: results.iter().map(|r| r.row.text.as_str()).collect::<HashSet<_>>().len(),
            data_sources: results.iter().map(|r| r.source_file.as_str()).collect::<HashSet<_>>().len(),
            category_distribution,
        }
    }
}

/// Loads every `classification_results_*.csv` under `dir`, in file name order.
///
/// A missing directory yields no results. Files that fail to parse are
/// logged and skipped.
pub fn load_saved_results(dir: &Path) -> Result<Vec<SavedResult>, ExportError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(RESULTS_PREFIX) && name.ends_with(".csv") && entry.path().is_file() {
            files.push((name, entry.path()));
        }
    }
    files.sort();

    let mut results = Vec::new();
    for (name, path) in files {
        let rows = match load_classification_results(&path) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("Skipping results file {:?}: {}", path, e);
                continue;
            }
        };
        let timestamp = parse_results_timestamp(&name);
        results.extend(rows.into_iter().map(|row| SavedResult {
            source_file: name.clone(),
            timestamp,
            row,
        }));
    }

    log::info!("Loaded {} saved results from {:?}", results.len(), dir);
    Ok(results)
}

/// Writes the corpus as JSON to `classifier_examples_<timestamp>.json` under `dir`.
pub fn export_corpus_examples(dir: &Path, corpus: &Corpus) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let export = CorpusExport {
        examples: corpus.examples(),
        fingerprint: corpus.fingerprint(),
        exported_at: Local::now().to_rfc3339(),
    };
    let path = dir.join(format!("classifier_examples_{}.json", timestamp()));
    fs::write(&path, serde_json::to_string_pretty(&export)?)?;
    log::info!("Exported {} examples to {:?}", corpus.len(), path);
    Ok(path)
}
