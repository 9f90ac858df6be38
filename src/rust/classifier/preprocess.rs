use lazy_static::lazy_static;
use regex::Regex;

/// Contraction expansions, applied in order by literal substring replacement.
///
/// Later entries see the output of earlier ones, so the specific forms must
/// stay ahead of the generic `n't` suffix.
pub const CONTRACTIONS: &[(&str, &str)] = &[
    ("\u{2019}", "'"),
    ("won't", "will not"),
    ("can't", "can not"),
    ("shan't", "shall not"),
    ("cannot", "can not"),
    ("n't", " not"),
    ("'re", " are"),
    ("'s", " is"),
    ("'d", " would"),
    ("'ll", " will"),
    ("'ve", " have"),
    ("'m", " am"),
];

lazy_static! {
    static ref NEGATED_WORD: Regex = Regex::new(r"\b(not|never)\s+(\w+)")
        .expect("NEGATED_WORD: invalid pattern");
}

/// Normalizes raw text before vectorization.
///
/// Lowercases, expands contractions, fuses `not`/`never` onto the following
/// word (`not good` becomes `not_good`) and collapses whitespace. Never fails.
///
/// ```
/// use amygdala::preprocess;
///
/// assert_eq!(preprocess("I  DON'T like it"), "i do not_like it");
/// ```
pub fn preprocess(text: &str) -> String {
    let mut processed = text.to_lowercase();

    for (contraction, expansion) in CONTRACTIONS {
        if processed.contains(contraction) {
            processed = processed.replace(contraction, expansion);
        }
    }

    let fused = NEGATED_WORD.replace_all(&processed, "${1}_${2}");

    fused.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_whitespace() {
        assert_eq!(preprocess("  Hello\t\tWORLD \n"), "hello world");
        assert_eq!(preprocess(""), "");
        assert_eq!(preprocess("   "), "");
    }

    #[test]
    fn test_contraction_order() {
        assert_eq!(preprocess("won't"), "will not");
        assert_eq!(preprocess("can't stop"), "can not_stop");
        assert_eq!(preprocess("I cannot"), "i can not");
        assert_eq!(preprocess("they're here"), "they are here");
        assert_eq!(preprocess("I'm sure it's fine"), "i am sure it is fine");
        assert_eq!(preprocess("we'll see, you've seen"), "we will see, you have seen");
    }

    #[test]
    fn test_curly_apostrophe() {
        assert_eq!(preprocess("Don\u{2019}t buy"), "do not_buy");
    }

    #[test]
    fn test_negation_fusion() {
        assert_eq!(preprocess("This is not good"), "this is not_good");
        assert_eq!(preprocess("I never liked it"), "i never_liked it");
        assert_eq!(preprocess("not"), "not");
        assert_eq!(preprocess("a knot tied"), "a knot tied");
    }
}
