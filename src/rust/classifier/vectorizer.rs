use std::collections::{BTreeMap, HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::utils::l2_normalize;
use crate::config::TrainingConfig;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"\b\w\w+\b").expect("TOKEN: invalid pattern");
}

/// A sparse feature vector: `(feature index, value)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// TF-IDF vectorizer over word n-grams.
///
/// Tokens are runs of two or more word characters. Term frequencies are
/// optionally dampened to `1 + ln(tf)`, weighted by smoothed inverse document
/// frequency and L2 normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    ngram_range: (usize, usize),
    max_features: usize,
    sublinear_tf: bool,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            ngram_range: config.ngram_range,
            max_features: config.max_features,
            sublinear_tf: config.sublinear_tf,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    /// Splits a preprocessed document into its n-gram terms.
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = TOKEN.find_iter(document).map(|m| m.as_str()).collect();
        let (min_n, max_n) = self.ngram_range;

        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Learns the vocabulary and IDF weights from preprocessed documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<(), ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::TrainingError("Cannot fit vectorizer on zero documents".into()));
        }

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for document in documents {
            let terms = self.analyze(document);
            let unique: HashSet<&String> = terms.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_counts.entry(term).or_insert(0) += 1;
            }
        }

        if term_counts.is_empty() {
            return Err(ClassifierError::TrainingError(
                "Empty vocabulary; the documents contain no terms".into(),
            ));
        }

        // Keep the most frequent terms, breaking ties by the term itself.
        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let kept: BTreeMap<String, usize> = ranked
            .into_iter()
            .map(|(term, _)| {
                let df = doc_freq.get(&term).copied().unwrap_or(0);
                (term, df)
            })
            .collect();

        let n_docs = documents.len() as f64;
        self.vocabulary.clear();
        self.idf.clear();
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            self.vocabulary.insert(term, idx);
            self.idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
        }

        log::debug!("Vectorizer fitted with {} features", self.idf.len());
        Ok(())
    }

    /// Maps a preprocessed document to its normalized TF-IDF vector.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect();
        l2_normalize(&mut vector);
        vector
    }

    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>, ClassifierError> {
        self.fit(documents)?;
        Ok(documents.iter().map(|d| self.transform(d)).collect())
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_analyze_ngrams() {
        let vectorizer = TfIdfVectorizer::new(&TrainingConfig::default());
        let terms = vectorizer.analyze("a big red fox");
        // "a" is a single character and is not a token
        assert_eq!(
            terms,
            vec!["big", "red", "fox", "big red", "red fox", "big red fox"]
        );
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let mut vectorizer = TfIdfVectorizer::new(&TrainingConfig::default().with_ngram_range(1, 1));
        vectorizer.fit(&docs(&["zebra apple", "mango apple"])).unwrap();
        assert_eq!(vectorizer.vocabulary()["apple"], 0);
        assert_eq!(vectorizer.vocabulary()["mango"], 1);
        assert_eq!(vectorizer.vocabulary()["zebra"], 2);
    }

    #[test]
    fn test_max_features_keeps_frequent_terms() {
        let config = TrainingConfig::default().with_ngram_range(1, 1).with_max_features(1);
        let mut vectorizer = TfIdfVectorizer::new(&config);
        vectorizer.fit(&docs(&["rare common", "common other"])).unwrap();
        assert_eq!(vectorizer.n_features(), 1);
        assert!(vectorizer.vocabulary().contains_key("common"));
    }

    #[test]
    fn test_transform_is_normalized() {
        let mut vectorizer = TfIdfVectorizer::new(&TrainingConfig::default());
        let vectors = vectorizer.fit_transform(&docs(&["good good product", "bad product"])).unwrap();
        for vector in &vectors {
            let norm: f64 = vector.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        assert!(vectorizer.transform("unseen words only").is_empty());
    }

    #[test]
    fn test_idf_downweights_shared_terms() {
        let config = TrainingConfig::default().with_ngram_range(1, 1);
        let mut vectorizer = TfIdfVectorizer::new(&config);
        vectorizer.fit(&docs(&["shared alpha", "shared beta"])).unwrap();
        let vector = vectorizer.transform("shared alpha");
        let shared = vector.iter().find(|(i, _)| *i == vectorizer.vocabulary()["shared"]).unwrap().1;
        let alpha = vector.iter().find(|(i, _)| *i == vectorizer.vocabulary()["alpha"]).unwrap().1;
        assert!(alpha > shared);
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let mut vectorizer = TfIdfVectorizer::new(&TrainingConfig::default());
        assert!(vectorizer.fit(&docs(&["a b c"])).is_err());
        assert!(vectorizer.fit(&[]).is_err());
    }
}
