//! AI-tell detection and internal-link relevance for long-form prose.
//!
//! Two independent pipelines, both pure and synchronous:
//!
//! * **Detection**: [`DetectionRule`]s are compiled into a [`RuleSet`],
//!   scanned over the text, and the matches aggregated into a
//!   [`DetectionResult`] with per-category counts and a 0-100 `ai_score`.
//! * **Linking**: topics are extracted from the draft, every indexed page is
//!   scored against them, and the best pages come back as
//!   [`LinkSuggestion`]s, optionally with the sentence to anchor each link in.
//!
//! ```
//! use content_signals::{detect_patterns, DetectionRule, Severity};
//!
//! let rules = vec![DetectionRule::literal(
//!     "cliche-1",
//!     "in today's world",
//!     "cliché",
//!     Severity::Medium,
//! )];
//! let result = detect_patterns(
//!     "In today's world, businesses must adapt. In today's world, speed wins.",
//!     &rules,
//! );
//! assert_eq!(result.total_matches, 2);
//! ```

pub mod aggregate;
pub mod builtin;
pub mod config;
pub mod error;
pub mod links;
pub mod matcher;
pub mod model;
pub mod relevance;
mod text;
pub mod topics;

pub use aggregate::aggregate;
pub use config::{DetectionConfig, EngineConfig, RelevanceConfig, SeverityWeights, TopicConfig};
pub use error::{Error, Result, RuleCompilationError};
pub use links::{find_best_insertion_point, rank_pages_by_relevance, LinkRanker, RankOptions};
pub use matcher::{match_context, match_rules, Heuristic, MatchOutcome, RuleSet};
pub use model::{
    Category, DetectionResult, DetectionRule, IndexedPage, InsertionPoint, LinkSuggestion,
    PatternKind, PatternMatch, PlannedLink, RelevanceScore, ScoreBand, Severity,
};
pub use relevance::{calculate_relevance_score, RelevanceScorer};
pub use text::word_count;
pub use topics::TopicExtractor;

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Scans text with a rule set and scores the result.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectionConfig,
}

impl Detector {
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Compile `rules` and run them over `content`. Rules that fail to
    /// compile are listed in `skipped_rules`.
    pub fn detect(&self, content: &str, rules: &[DetectionRule]) -> DetectionResult {
        self.detect_with(content, &RuleSet::compile(rules))
    }

    /// Run an already compiled rule set over `content`.
    pub fn detect_with(&self, content: &str, rules: &RuleSet) -> DetectionResult {
        let matches = rules.scan(content);
        let mut result = aggregate(matches, word_count(content), &self.config);
        result.skipped_rules = rules.skipped().to_vec();
        result
    }

    /// Excerpt around a match, sized by `context_window_chars`.
    pub fn context(&self, content: &str, m: &PatternMatch) -> String {
        match_context(content, m, self.config.context_window_chars)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Detect with the default scoring configuration.
pub fn detect_patterns(content: &str, rules: &[DetectionRule]) -> DetectionResult {
    Detector::default().detect(content, rules)
}

/// Topics with the default stop words and limit.
pub fn extract_topics_from_content(content: &str) -> Vec<String> {
    TopicExtractor::default().extract_default(content)
}

/// Up to `max_topics` topics with the default stop words.
pub fn extract_topics(text: &str, max_topics: usize) -> Vec<String> {
    TopicExtractor::default().extract(text, max_topics)
}
