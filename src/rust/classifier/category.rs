use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// Returned by [`get_category_description`] for labels outside the closed set.
pub const UNKNOWN_CATEGORY: &str = "Unknown category";

/// The closed set of labels the classifier can return.
///
/// `Uncertain` is never learned from the corpus; it only exists so that
/// downstream consumers can describe and parse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Informational,
    Negative,
    Neutral,
    Positive,
    Question,
    Uncertain,
}

impl Category {
    /// Every category, in label order.
    pub const ALL: [Category; 6] = [
        Category::Informational,
        Category::Negative,
        Category::Neutral,
        Category::Positive,
        Category::Question,
        Category::Uncertain,
    ];

    /// The lowercase label used in files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::Question => "question",
            Self::Uncertain => "uncertain",
        }
    }

    /// Whether examples may carry this label.
    pub fn is_trainable(&self) -> bool {
        !matches!(self, Self::Uncertain)
    }

    /// A human-readable sentence describing the category.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Positive => "This text expresses positive sentiment or satisfaction",
            Self::Negative => "This text expresses negative sentiment or dissatisfaction",
            Self::Question => "This text is asking for information or assistance",
            Self::Informational => "This text is providing factual information",
            Self::Neutral => "This text does not express a clear sentiment or intent",
            Self::Uncertain => "The classifier is not confident about the category",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ClassifierError::ValidationError(format!("Unknown category '{}'", s)))
    }
}

/// Looks up the description for a label given as a string.
///
/// Returns [`UNKNOWN_CATEGORY`] for anything that does not parse.
pub fn get_category_description(label: &str) -> &'static str {
    label
        .parse::<Category>()
        .map(|c| c.describe())
        .unwrap_or(UNKNOWN_CATEGORY)
}
