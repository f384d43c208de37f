//! Default rule set for callers without a team configuration.

use crate::matcher::Heuristic;
use crate::model::{Category, DetectionRule, Severity};

const SLOP_WORDS: &[&str] = &[
    "crucial",
    "groundbreaking",
    "pivotal",
    "paramount",
    "seamless",
    "holistic",
    "multifaceted",
    "meticulous",
    "invaluable",
    "game-changing",
    "revolutionary",
    "unparalleled",
    "cutting-edge",
    "impactful",
    "delve",
    "delves",
    "delving",
    "embark",
    "elevate",
    "foster",
    "harness",
    "unleash",
    "unlock",
    "streamline",
    "underscore",
    "showcase",
    "leverage",
    "landscape",
    "tapestry",
    "paradigm",
    "testament",
    "realm",
    "intricacies",
];

const FILLER_PHRASES: &[&str] = &[
    "it's worth noting",
    "it's important to note",
    "here's the thing",
    "at the end of the day",
    "in today's fast-paced",
    "in today's digital age",
    "as technology continues to",
    "let's dive in",
    "let's break this down",
    "without further ado",
    "what this means is",
    "the bottom line is",
    "the key takeaway",
];

const HEDGING_PHRASES: &[&str] = &[
    "some critics argue",
    "many believe",
    "experts suggest",
    "studies show",
    "it is widely believed",
    "research suggests",
    "arguably",
    "to some extent",
];

const TRANSITION_CLICHES: &[&str] = &[
    "furthermore",
    "moreover",
    "additionally",
    "in conclusion",
    "in summary",
    "on the other hand",
    "that being said",
    "with that in mind",
];

const META_COMMUNICATION: &[&str] = &[
    "i hope this helps",
    "let me know if",
    "would you like me to",
    "feel free to",
    "don't hesitate to",
    "great question",
];

const AI_DISCLOSURE: &[&str] = &[
    r"\bas an ai\b",
    r"\bas a language model\b",
    r"\bi don't have personal\b",
    r"\bas of my (?:last |knowledge )?cutoff\b",
    r"\bi'm just an? ai\b",
];

fn slug(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn structural_severity(heuristic: Heuristic) -> Severity {
    match heuristic {
        Heuristic::Placeholder => Severity::High,
        Heuristic::SetupResolution | Heuristic::NotJustBut | Heuristic::BoldHeader => {
            Severity::Medium
        }
        _ => Severity::Low,
    }
}

/// Curated AI-tell rules: slop vocabulary, filler and hedging phrases,
/// transition cliches, meta-communication, self-disclosure and every
/// structural heuristic.
pub fn default_rules() -> Vec<DetectionRule> {
    let mut rules = Vec::new();

    let words = SLOP_WORDS
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    rules.push(DetectionRule::regex(
        "builtin:slop-vocabulary",
        format!(r"\b(?:{words})\b"),
        Category::Other("vocabulary".to_string()),
        Severity::Low,
    ));

    for phrase in FILLER_PHRASES {
        rules.push(DetectionRule::literal(
            format!("builtin:filler:{}", slug(phrase)),
            *phrase,
            Category::FillerPhrase,
            Severity::Medium,
        ));
    }
    for phrase in HEDGING_PHRASES {
        rules.push(DetectionRule::regex(
            format!("builtin:hedging:{}", slug(phrase)),
            format!(r"\b{}\b", regex::escape(phrase)),
            Category::Hedging,
            Severity::Medium,
        ));
    }
    for phrase in TRANSITION_CLICHES {
        rules.push(DetectionRule::regex(
            format!("builtin:transition:{}", slug(phrase)),
            format!(r"\b{}\b", regex::escape(phrase)),
            Category::TransitionCliche,
            Severity::Low,
        ));
    }
    for phrase in META_COMMUNICATION {
        rules.push(DetectionRule::literal(
            format!("builtin:meta:{}", slug(phrase)),
            *phrase,
            Category::Other("meta-communication".to_string()),
            Severity::High,
        ));
    }
    for (i, pattern) in AI_DISCLOSURE.iter().enumerate() {
        rules.push(DetectionRule::regex(
            format!("builtin:ai-disclosure:{}", i + 1),
            *pattern,
            Category::Other("ai-disclosure".to_string()),
            Severity::High,
        ));
    }
    for heuristic in Heuristic::ALL {
        rules.push(DetectionRule::structural(
            format!("builtin:structural:{}", heuristic.name()),
            heuristic.name(),
            structural_severity(heuristic),
        ));
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::RuleSet;
    use std::collections::HashSet;

    #[test]
    fn every_builtin_rule_compiles() {
        let rules = default_rules();
        let set = RuleSet::compile(&rules);
        assert!(set.skipped().is_empty(), "skipped: {:?}", set.skipped());
        assert_eq!(set.len(), rules.len());
    }

    #[test]
    fn builtin_ids_are_unique() {
        let rules = default_rules();
        let ids: HashSet<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn slugs_collapse_punctuation() {
        assert_eq!(slug("it's worth noting"), "it-s-worth-noting");
    }
}
