use amygdala::corpus::Example;
use amygdala::{Category, Classifier, ClassifierError, Corpus, CorpusError, TrainingConfig};

fn setup_test_classifier() -> Classifier {
    Classifier::builder()
        .without_cache()
        .build()
        .expect("Failed to create classifier")
}

#[test]
fn test_empty_input() {
    let classifier = setup_test_classifier();
    for text in ["", "   ", "\n\t"] {
        let result = classifier.classify(text);
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    }
}

#[test]
fn test_unicode_input() -> Result<(), ClassifierError> {
    let classifier = setup_test_classifier();
    let result = classifier.classify("C’est génial 🚀 なに?")?;
    assert_ne!(result.category, Category::Uncertain);
    Ok(())
}

#[test]
fn test_long_input() -> Result<(), ClassifierError> {
    let classifier = setup_test_classifier();
    let text = "The package contains a manual and a charger. ".repeat(200);
    classifier.classify(&text)?;
    Ok(())
}

#[test]
fn test_empty_corpus() {
    assert!(matches!(Corpus::from_examples(vec![]), Err(CorpusError::Empty)));
}

#[test]
fn test_blank_example_text() {
    let result = Corpus::from_examples(vec![
        Example::new("fine", Category::Neutral),
        Example::new("  ", Category::Positive),
    ]);
    assert!(matches!(result, Err(CorpusError::EmptyText(2))));
}

#[test]
fn test_untrainable_label() {
    let result = Corpus::from_examples(vec![Example::new("hmm", Category::Uncertain)]);
    assert!(matches!(result, Err(CorpusError::UnknownCategory { index: 1, .. })));

    let result = Corpus::from_json_str(r#"[{"text": "ok", "category": "sarcastic"}]"#);
    match result {
        Err(CorpusError::UnknownCategory { index, label }) => {
            assert_eq!(index, 1);
            assert_eq!(label, "sarcastic");
        }
        other => panic!("expected unknown category error, got {:?}", other),
    }
}

#[test]
fn test_malformed_json_corpus() {
    assert!(matches!(Corpus::from_json_str("{not json"), Err(CorpusError::Json(_))));
}

#[test]
fn test_single_class_corpus_cannot_train() {
    let corpus = Corpus::from_examples(vec![
        Example::new("great stuff", Category::Positive),
        Example::new("lovely stuff", Category::Positive),
    ])
    .unwrap();
    let result = Classifier::builder().with_corpus(corpus).without_cache().build();
    assert!(matches!(result, Err(ClassifierError::TrainingError(_))));
}

#[test]
fn test_invalid_config() {
    let configs = [
        TrainingConfig::default().with_ngram_range(0, 2),
        TrainingConfig::default().with_ngram_range(3, 1),
        TrainingConfig::default().with_max_features(0),
        TrainingConfig::default().with_c(0.0),
        TrainingConfig::default().with_c(f64::NAN),
        TrainingConfig::default().with_max_iter(0),
        TrainingConfig::default().with_tolerance(-1.0),
    ];
    for config in configs {
        let result = Classifier::builder().with_config(config).without_cache().build();
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    }
}

#[test]
fn test_corpus_loaded_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("corpus.csv");
    std::fs::write(
        &path,
        "Text,Category\n\
         \"Great, really great\",positive\n\
         Awful experience,negative\n\
         Where is the store?,question\n",
    )?;
    let corpus = Corpus::from_path(&path)?;
    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus.examples()[0].text, "Great, really great");
    assert_eq!(corpus.examples()[2].category, Category::Question);
    Ok(())
}
