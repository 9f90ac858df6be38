//! Hand-written overrides applied on top of the statistical prediction.
//!
//! Rules are evaluated in a fixed priority order and the first match wins.
//! Matching is by literal substring on the lowercased input, so phrasing
//! variants slip through and unrelated words can match ("whatever" contains
//! "hate"). The order decides texts that match several rules.

use serde::Serialize;

use super::category::Category;
use super::model::Prediction;

/// Sentence openers that force a negative label.
pub const NEGATIVE_OPENERS: &[&str] = &[
    "i do not",
    "i don't",
    "i did not",
    "i didn't",
    "i cannot",
    "i can't",
    "i will never",
    "i won't",
    "i hate",
    "i dislike",
    "i regret",
    "i am not happy",
    "i'm not happy",
];

/// Substrings that force a negative label anywhere in the text.
pub const NEGATIVE_PATTERNS: &[&str] = &[
    "not good",
    "not great",
    "not worth",
    "not recommend",
    "not happy",
    "not satisfied",
    "terrible",
    "horrible",
    "awful",
    "worst",
    "waste",
    "hate",
    "disappoint",
    "useless",
    "broken",
    "poor quality",
    "never again",
    "don't buy",
    "do not buy",
];

pub const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "awesome",
    "fantastic",
    "wonderful",
    "love",
    "perfect",
    "happy",
    "satisfied",
    "recommend",
    "best",
    "impressed",
    "superb",
];

/// Phrases that force a positive label even when rule c did not fire.
pub const EXTREME_POSITIVE_PHRASES: &[&str] = &[
    "best ever",
    "highly recommend",
    "absolutely love",
    "exceeded my expectations",
    "exceeded expectations",
    "five stars",
    "10/10",
    "could not be happier",
    "couldn't be happier",
];

/// Prefixes that the preprocessor fuses onto the following word.
const NEGATION_PREFIXES: &[&str] = &["not_", "never_"];

/// Texts shorter than this many words may fall back to neutral.
pub const SHORT_TEXT_WORDS: usize = 5;

/// Which override replaced the model's prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideRule {
    /// a: starts with a negative opener
    NegativeOpener,
    /// b: contains a negative pattern or a negated positive word
    NegativePattern,
    /// c: contains a positive word with no "not "
    PositiveWord,
    /// d: contains an extreme positive phrase
    ExtremePositive,
    /// e: short text with a weak, non-sentiment prediction
    LowConfidence,
}

impl OverrideRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NegativeOpener => "negative_opener",
            Self::NegativePattern => "negative_pattern",
            Self::PositiveWord => "positive_word",
            Self::ExtremePositive => "extreme_positive",
            Self::LowConfidence => "low_confidence",
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn has_negated_positive(processed: &str) -> bool {
    NEGATION_PREFIXES.iter().any(|prefix| {
        POSITIVE_WORDS
            .iter()
            .any(|word| processed.contains(&format!("{}{}", prefix, word)))
    })
}

/// Applies the override chain.
///
/// `text` is the caller's original input, `processed` its preprocessed form.
/// Returns the final category and the rule that produced it, if any.
pub fn apply_overrides(
    text: &str,
    processed: &str,
    prediction: &Prediction,
    confidence_threshold: f64,
) -> (Category, Option<OverrideRule>) {
    let lowered = text.to_lowercase();
    let trimmed = lowered.trim_start();

    if NEGATIVE_OPENERS.iter().any(|o| trimmed.starts_with(o)) {
        return (Category::Negative, Some(OverrideRule::NegativeOpener));
    }

    if contains_any(&lowered, NEGATIVE_PATTERNS) || has_negated_positive(processed) {
        return (Category::Negative, Some(OverrideRule::NegativePattern));
    }

    if contains_any(&lowered, POSITIVE_WORDS)
        && !lowered.contains("not ")
        && prediction.category != Category::Positive
    {
        return (Category::Positive, Some(OverrideRule::PositiveWord));
    }

    if contains_any(&lowered, EXTREME_POSITIVE_PHRASES) {
        return (Category::Positive, Some(OverrideRule::ExtremePositive));
    }

    let word_count = text.split_whitespace().count();
    let sentiment_or_question = matches!(
        prediction.category,
        Category::Question | Category::Negative | Category::Positive
    );
    if word_count < SHORT_TEXT_WORDS
        && !sentiment_or_question
        && prediction.margin < confidence_threshold
    {
        return (Category::Neutral, Some(OverrideRule::LowConfidence));
    }

    (prediction.category, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::preprocess::preprocess;

    fn run(text: &str, category: Category, margin: f64) -> (Category, Option<OverrideRule>) {
        apply_overrides(text, &preprocess(text), &Prediction { category, margin }, 0.5)
    }

    #[test]
    fn test_negative_opener_beats_positive_word() {
        assert_eq!(
            run("I don't love this", Category::Positive, 1.0),
            (Category::Negative, Some(OverrideRule::NegativeOpener))
        );
        assert_eq!(
            run("  I cannot believe how good it is", Category::Positive, 1.0).0,
            Category::Negative
        );
    }

    #[test]
    fn test_negative_patterns() {
        assert_eq!(
            run("This is terrible but the box is great", Category::Positive, 1.0),
            (Category::Negative, Some(OverrideRule::NegativePattern))
        );
        assert_eq!(
            run("It was never good", Category::Neutral, 0.1),
            (Category::Negative, Some(OverrideRule::NegativePattern))
        );
        assert_eq!(
            run("They didn't love it", Category::Positive, 0.9),
            (Category::Negative, Some(OverrideRule::NegativePattern))
        );
    }

    #[test]
    fn test_positive_word_only_when_model_disagrees() {
        assert_eq!(
            run("The shipping was great", Category::Informational, 0.7),
            (Category::Positive, Some(OverrideRule::PositiveWord))
        );
        assert_eq!(
            run("The shipping was great", Category::Positive, 0.7),
            (Category::Positive, None)
        );
    }

    #[test]
    fn test_extreme_positive_with_negation() {
        // "not " blocks rule c; rule d still applies
        assert_eq!(
            run("Could not be happier, highly recommend", Category::Neutral, 0.2),
            (Category::Positive, Some(OverrideRule::ExtremePositive))
        );
    }

    #[test]
    fn test_low_confidence_fallback() {
        assert_eq!(
            run("Blue box here", Category::Informational, 0.1),
            (Category::Neutral, Some(OverrideRule::LowConfidence))
        );
        assert_eq!(run("Blue box here", Category::Informational, 0.9), (Category::Informational, None));
        assert_eq!(run("Where is it?", Category::Question, 0.1), (Category::Question, None));
        assert_eq!(
            run("The box is blue and square", Category::Informational, 0.1),
            (Category::Informational, None)
        );
    }

    #[test]
    fn test_no_rule_keeps_prediction() {
        assert_eq!(run("When does the shop open?", Category::Question, 1.2), (Category::Question, None));
    }
}
