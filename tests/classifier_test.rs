use amygdala::{Category, Classifier, Corpus, OverrideRule, TrainingConfig};
use std::sync::Arc;
use std::thread;

fn setup_test_classifier() -> Classifier {
    Classifier::builder()
        .without_cache()
        .build()
        .expect("Failed to create classifier")
}

#[test]
fn test_positive_classification() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    let result = classifier.classify("This is an amazing product, I love it!")?;
    assert_eq!(result.category, Category::Positive);
    Ok(())
}

#[test]
fn test_negative_classification() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    let result = classifier.classify("This is terrible, I hate it and would not recommend it.")?;
    assert_eq!(result.category, Category::Negative);
    Ok(())
}

#[test]
fn test_question_classification() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    let result = classifier.classify("How does this product work? Can you help me?")?;
    assert_eq!(result.category, Category::Question);
    assert_eq!(result.rule, None);
    Ok(())
}

#[test]
fn test_informational_classification() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    let result = classifier.classify("The product weighs 2kg and is available in blue and red colors.")?;
    assert_eq!(result.category, Category::Informational);
    Ok(())
}

#[test]
fn test_negative_opener_beats_positive_word() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    let result = classifier.classify("I don't love this")?;
    assert_eq!(result.category, Category::Negative);
    assert_eq!(result.rule, Some(OverrideRule::NegativeOpener));
    Ok(())
}

#[test]
fn test_negated_positive_word() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    let result = classifier.classify("Honestly the quality was never good")?;
    assert_eq!(result.category, Category::Negative);
    Ok(())
}

#[test]
fn test_repeated_calls_agree() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    let inputs = [
        "When will my order arrive?",
        "It is fine, nothing special",
        "The store opens at 9am and closes at 6pm",
        "ok",
    ];
    for text in inputs {
        let first = classifier.classify(text)?;
        let second = classifier.classify(text)?;
        assert_eq!(first, second);
    }
    Ok(())
}

#[test]
fn test_independent_trainings_agree() -> Result<(), Box<dyn std::error::Error>> {
    let a = setup_test_classifier();
    let b = setup_test_classifier();
    assert_eq!(a.info().fingerprint, b.info().fingerprint);
    for example in Corpus::builtin().examples() {
        assert_eq!(a.classify(&example.text)?, b.classify(&example.text)?);
    }
    Ok(())
}

#[test]
fn test_training_examples_mostly_recovered() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    let corpus = Corpus::builtin();
    let mut correct = 0;
    for example in corpus.examples() {
        if classifier.classify_label(&example.text)? == example.category {
            correct += 1;
        }
    }
    assert!(correct as f64 / corpus.len() as f64 >= 0.85);
    Ok(())
}

#[test]
fn test_never_returns_uncertain() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    for text in ["hmm", "zzz qqq", "The", "42"] {
        assert_ne!(classifier.classify_label(text)?, Category::Uncertain);
    }
    Ok(())
}

#[test]
fn test_low_confidence_threshold_is_configurable() -> Result<(), Box<dyn std::error::Error>> {
    // With an unreachable threshold a short informational text falls back to neutral
    let classifier = Classifier::builder()
        .without_cache()
        .with_config(TrainingConfig::default().with_confidence_threshold(f64::INFINITY))
        .build()?;
    let result = classifier.classify("Prices include sales tax")?;
    assert_eq!(result.raw_prediction, Category::Informational);
    assert!(result.margin.is_finite());
    assert_eq!(result.category, Category::Neutral);
    assert_eq!(result.rule, Some(OverrideRule::LowConfidence));

    // A threshold at negative infinity never fires, so the raw label survives
    let classifier = Classifier::builder()
        .without_cache()
        .with_config(TrainingConfig::default().with_confidence_threshold(f64::NEG_INFINITY))
        .build()?;
    let result = classifier.classify("Prices include sales tax")?;
    assert_eq!(result.category, Category::Informational);
    assert_eq!(result.rule, None);
    Ok(())
}

#[test]
fn test_thread_safety() {
    let classifier = Arc::new(setup_test_classifier());
    let mut handles = vec![];

    for _ in 0..3 {
        let classifier = Arc::clone(&classifier);
        let handle = thread::spawn(move || {
            let result = classifier.classify("Can you help me with this issue?");
            assert!(result.is_ok());
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_descriptions() {
    for category in Category::ALL {
        let description = amygdala::get_category_description(category.as_str());
        assert!(!description.is_empty());
        assert_ne!(description, "Unknown category");
    }
    assert_eq!(amygdala::get_category_description("sarcastic"), "Unknown category");
}
