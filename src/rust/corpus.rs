//! The labelled example corpus the classifier is trained on.
//!
//! A corpus is a single ordered list of `(text, category)` pairs, so texts and
//! labels can never drift out of step. It is loaded once (built in, or from a
//! JSON/CSV file) and passed explicitly to training and evaluation.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classifier::Category;

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid JSON corpus: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid CSV corpus: {0}")]
    Csv(#[from] csv::Error),
    #[error("Example {index} has unknown or untrainable category '{label}'")]
    UnknownCategory { index: usize, label: String },
    #[error("Example {0} has an empty text")]
    EmptyText(usize),
    #[error("Corpus contains no examples")]
    Empty,
}

/// A single labelled training sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    pub category: Category,
}

impl Example {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// Summary statistics over a corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub total_examples: usize,
    pub category_distribution: BTreeMap<Category, usize>,
    /// Mean length in characters
    pub average_example_length: f64,
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct RawExample {
    #[serde(alias = "Text")]
    text: String,
    #[serde(alias = "Category", alias = "label")]
    category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    examples: Vec<Example>,
}

impl Corpus {
    /// Builds a corpus, rejecting blank texts and untrainable labels.
    pub fn from_examples(examples: Vec<Example>) -> Result<Self, CorpusError> {
        if examples.is_empty() {
            return Err(CorpusError::Empty);
        }
        for (i, example) in examples.iter().enumerate() {
            if example.text.trim().is_empty() {
                return Err(CorpusError::EmptyText(i + 1));
            }
            if !example.category.is_trainable() {
                return Err(CorpusError::UnknownCategory {
                    index: i + 1,
                    label: example.category.to_string(),
                });
            }
        }
        Ok(Self { examples })
    }

    /// The curated examples shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            examples: BUILTIN_EXAMPLES
                .iter()
                .map(|&(text, category)| Example::new(text, category))
                .collect(),
        }
    }

    /// Loads a corpus from disk. Files ending in `.csv` are read as
    /// `Text,Category` CSV, anything else as a JSON array of
    /// `{"text": ..., "category": ...}` objects.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let raw: Vec<RawExample> = if is_csv {
            let mut reader = csv::Reader::from_path(path)?;
            reader.deserialize().collect::<Result<_, _>>()?
        } else {
            serde_json::from_str(&fs::read_to_string(path)?)?
        };

        log::info!("Loaded {} raw examples from {:?}", raw.len(), path);
        Self::from_raw(raw)
    }

    /// Parses a JSON array of examples.
    pub fn from_json_str(json: &str) -> Result<Self, CorpusError> {
        Self::from_raw(serde_json::from_str(json)?)
    }

    fn from_raw(raw: Vec<RawExample>) -> Result<Self, CorpusError> {
        let examples = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.category
                    .parse::<Category>()
                    .map(|category| Example::new(r.text, category))
                    .map_err(|_| CorpusError::UnknownCategory {
                        index: i + 1,
                        label: r.category,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_examples(examples)
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.examples.iter().map(|e| e.text.as_str())
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.examples.iter().map(|e| e.category)
    }

    /// Distinct categories present, in label order.
    pub fn distinct_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories().collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// A subset of the corpus by index. Used for cross-validation folds.
    pub(crate) fn subset(&self, indices: &[usize]) -> Corpus {
        Corpus {
            examples: indices.iter().map(|&i| self.examples[i].clone()).collect(),
        }
    }

    /// SHA-256 over the ordered examples, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for example in &self.examples {
            hasher.update(example.category.as_str().as_bytes());
            hasher.update(b"\t");
            hasher.update(example.text.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn stats(&self) -> CorpusStats {
        let mut category_distribution = BTreeMap::new();
        for category in self.categories() {
            *category_distribution.entry(category).or_insert(0) += 1;
        }

        let total_examples = self.examples.len();
        let average_example_length = if total_examples == 0 {
            0.0
        } else {
            self.texts().map(|t| t.chars().count()).sum::<usize>() as f64 / total_examples as f64
        };

        CorpusStats {
            total_examples,
            categories: category_distribution.keys().copied().collect(),
            category_distribution,
            average_example_length,
        }
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::builtin()
    }
}

use crate::classifier::Category::{Informational, Negative, Neutral, Positive, Question};

const BUILTIN_EXAMPLES: &[(&str, Category)] = &[
    ("This product is great, I loved it!", Positive),
    ("Amazing experience, I recommend it to everyone", Positive),
    ("Very satisfied with the service provided", Positive),
    ("The product arrived as expected and working perfectly", Positive),
    ("This is an amazing product, I love it!", Positive),
    ("Excellent quality, exceeded my expectations", Positive),
    ("I am very happy with my purchase", Positive),
    ("Fantastic customer support, they solved my problem quickly", Positive),
    ("Best purchase I have made this year", Positive),
    ("Wonderful design and very easy to use", Positive),
    ("I love how fast the delivery was", Positive),
    ("Great value for the money, highly recommended", Positive),
    ("The staff was friendly and helpful", Positive),
    ("Absolutely love it, works like a charm", Positive),
    ("Really good product, I would buy it again", Positive),
    ("Five stars, everything was perfect", Positive),
    ("The new update is awesome and much faster", Positive),
    ("I'm impressed with the build quality", Positive),
    ("Superb service from start to finish", Positive),
    ("My family loves this product", Positive),

    ("Horrible, I don't recommend it to anyone", Negative),
    ("Terrible experience, don't buy", Negative),
    ("Low quality product, broke on first use", Negative),
    ("Poor customer service and defective product", Negative),
    ("This is terrible, I hate it and would not recommend it.", Negative),
    ("Worst purchase I have ever made", Negative),
    ("The item arrived damaged and nobody answered my emails", Negative),
    ("Complete waste of money", Negative),
    ("I am very disappointed with the quality", Negative),
    ("It stopped working after two days", Negative),
    ("The delivery was late and the box was broken", Negative),
    ("Awful service, never ordering again", Negative),
    ("I hate this product, it is useless", Negative),
    ("The battery dies too quickly, very frustrating", Negative),
    ("Customer support was rude and unhelpful", Negative),
    ("Not worth the price at all", Negative),
    ("The instructions were confusing and the parts were missing", Negative),
    ("I regret buying this", Negative),
    ("Cheap materials that fall apart easily", Negative),
    ("This app keeps crashing and losing my data", Negative),

    ("How does this work?", Question),
    ("What is the return policy?", Question),
    ("Can you help me with this issue?", Question),
    ("When will my order arrive?", Question),
    ("How does this product work? Can you help me?", Question),
    ("Where can I find the user manual?", Question),
    ("Is this item available in other colors?", Question),
    ("Do you ship internationally?", Question),
    ("How long does the battery last?", Question),
    ("What payment methods do you accept?", Question),
    ("Can I change my delivery address?", Question),
    ("Why was my order cancelled?", Question),
    ("Which size should I choose?", Question),
    ("Is there a warranty on this product?", Question),
    ("How can I contact customer support?", Question),
    ("Could you explain how to install it?", Question),
    ("What are the opening hours of the store?", Question),
    ("Does this work with my phone?", Question),
    ("How much does shipping cost?", Question),
    ("Can you tell me how to return this item?", Question),

    ("The store opens at 9am and closes at 6pm", Informational),
    ("This product contains 500mg of vitamin C", Informational),
    ("The company was founded in 2010", Informational),
    ("The product weighs 2.5 kg and measures 30x40 cm", Informational),
    ("The product weighs 2kg and is available in blue and red colors.", Informational),
    ("The package contains 12 units per box", Informational),
    ("Shipping takes between three and five business days", Informational),
    ("The device has a battery capacity of 4000 mAh", Informational),
    ("Our office is located on Main Street", Informational),
    ("The warranty covers manufacturing defects for two years", Informational),
    ("This model is available in black, white and silver", Informational),
    ("The jacket is made of 100% cotton", Informational),
    ("Orders placed before noon are shipped the same day", Informational),
    ("The manual is included in the box", Informational),
    ("The screen size is 15 inches with a resolution of 1920x1080", Informational),
    ("The event will take place on March 3rd", Informational),
    ("Each bottle holds 750 ml", Informational),
    ("The software supports Windows and Linux", Informational),
    ("Prices include sales tax", Informational),
    ("The table is made of solid oak and weighs 20 kg", Informational),

    ("The product is okay", Neutral),
    ("It is fine, nothing special", Neutral),
    ("I received the package today", Neutral),
    ("It does what it says", Neutral),
    ("The color is as shown in the picture", Neutral),
    ("I used it once so far", Neutral),
    ("Average quality for the price", Neutral),
    ("It works as described", Neutral),
    ("Nothing to add", Neutral),
    ("The order was delivered on Tuesday", Neutral),
    ("I have not decided yet", Neutral),
    ("It is an ordinary product", Neutral),
    ("I bought it for my brother", Neutral),
    ("It is similar to the previous version", Neutral),
    ("The box was standard size", Neutral),
    ("I might use it again", Neutral),
    ("It is what I expected", Neutral),
    ("Mixed feelings about this one", Neutral),
    ("Time will tell", Neutral),
    ("It arrived in a plain package", Neutral),
];
