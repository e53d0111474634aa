use super::common::*;
use crate::triage::classifier::{Category, ClassifierConfig, RuleConfig};
use crate::triage::Classifier;

#[test]
fn crisis_keyword_routes_to_crisis_reply() {
    let result = classifier().classify("I want to die");

    assert_eq!(result.category, Category::Crisis);
    assert!(result.is_crisis);
    assert!(result.reply.contains("988"));
    assert_eq!(result.matched_keyword.as_deref(), Some("die"));
}

#[test]
fn crisis_wins_over_every_other_tier() {
    let classifier = classifier();
    for text in [
        "exam stress makes me want to hurt myself",
        "I'm anxious, sad and thinking about suicide",
        "so tired of this assignment I could kill someone",
    ] {
        let result = classifier.classify(text);
        assert_eq!(result.category, Category::Crisis, "text: {text}");
        assert!(result.is_crisis);
    }
}

#[test]
fn anxiety_outranks_depression_and_academic_stress() {
    let result = classifier().classify("I feel so stressed and sad");
    assert_eq!(result.category, Category::Anxiety);
    assert!(!result.is_crisis);

    let result = classifier().classify("sad about my exam grade");
    assert_eq!(result.category, Category::Depression);
}

#[test]
fn academic_keywords_reach_the_last_tier() {
    let result = classifier().classify("I have an exam tomorrow");
    assert_eq!(result.category, Category::AcademicStress);
    assert!(result.reply.starts_with("Academic pressure can be overwhelming."));
}

#[test]
fn matching_ignores_case() {
    let result = classifier().classify("PANIC ATTACK before my EXAM");
    assert_eq!(result.category, Category::Anxiety);
    assert_eq!(result.matched_keyword.as_deref(), Some("panic"));
}

#[test]
fn substrings_inside_larger_words_still_match() {
    // "diet" contains "die"; over-triggering the crisis reply is accepted here.
    let result = classifier().classify("I'm starting a new diet");
    assert_eq!(result.category, Category::Crisis);

    let result = classifier().classify("studying all night");
    assert_eq!(result.category, Category::AcademicStress);
}

#[test]
fn empty_and_unmatched_text_fall_back_to_general() {
    let classifier = classifier();
    for text in ["", "   ", "hello there", "😊 just checking in"] {
        let result = classifier.classify(text);
        assert_eq!(result.category, Category::General, "text: {text:?}");
        assert!(!result.is_crisis);
        assert!(result.matched_keyword.is_none());
        assert!(result.reply.starts_with("Thank you for sharing that with me."));
    }
}

#[test]
fn classification_is_deterministic() {
    let classifier = classifier();
    let first = classifier.classify("worried and lonely");
    for _ in 0..10 {
        assert_eq!(classifier.classify("worried and lonely"), first);
    }
}

#[test]
fn non_ascii_text_is_folded_before_matching() {
    let result = classifier().classify("ÉTUDES et EXAM à réviser");
    assert_eq!(result.category, Category::AcademicStress);
}

#[test]
fn custom_rules_keep_crisis_first_regardless_of_order() {
    let mut config = ClassifierConfig::standard();
    config.rules.reverse();
    config.rules.push(RuleConfig {
        category: Category::Anxiety,
        keywords: vec!["overwhelmed".to_string()],
        reply: "Let's slow down together.".to_string(),
    });
    let classifier = Classifier::new(config.build().expect("valid rules"));

    assert_eq!(
        classifier.classify("overwhelmed and want to die").category,
        Category::Crisis
    );
    assert_eq!(
        classifier.classify("overwhelmed by everything").category,
        Category::Anxiety
    );
}
