//! Frequency-based topic extraction.
//!
//! Deliberately simple: lowercase, drop punctuation, split on whitespace,
//! keep tokens that repeat. Page indexes built at crawl time depend on the
//! exact output, so the heuristics stay as they are rather than growing into
//! a real tokenizer.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::TopicConfig;
use crate::error::Result;

static PUNCTUATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

#[derive(Debug, Clone, Default)]
pub struct TopicExtractor {
    config: TopicConfig,
}

impl TopicExtractor {
    pub fn new(config: TopicConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TopicConfig {
        &self.config
    }

    /// Up to `max_topics` repeated, non-stop-word tokens, most frequent first.
    /// Equal counts keep first-appearance order.
    pub fn extract(&self, text: &str, max_topics: usize) -> Vec<String> {
        let normalized = PUNCTUATION_RE.replace_all(&text.to_lowercase(), "").into_owned();

        // token -> (count, first position)
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (position, token) in normalized
            .split_whitespace()
            .filter(|t| t.chars().count() >= self.config.min_token_chars)
            .enumerate()
        {
            counts.entry(token).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .filter(|(token, (count, _))| {
                *count >= self.config.min_frequency && !self.config.stop_words.contains(*token)
            })
            .map(|(token, (count, first))| (token, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(max_topics)
            .map(|(token, _, _)| token.to_string())
            .collect()
    }

    /// [`TopicExtractor::extract`] with the configured default limit.
    pub fn extract_default(&self, text: &str) -> Vec<String> {
        self.extract(text, self.config.default_max_topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_is_removed_not_split() {
        let extractor = TopicExtractor::default();
        let topics = extractor.extract("Today's plan. Todays plan!", 5);
        assert_eq!(topics, vec!["todays", "plan"]);
    }

    #[test]
    fn ties_keep_first_appearance() {
        let extractor = TopicExtractor::default();
        let text = "zebra apple zebra apple mango mango mango";
        assert_eq!(extractor.extract(text, 10), vec!["mango", "zebra", "apple"]);
    }

    #[test]
    fn zero_min_frequency_is_rejected() {
        let config = TopicConfig {
            min_frequency: 0,
            ..TopicConfig::default()
        };
        assert!(TopicExtractor::new(config).is_err());
    }
}
