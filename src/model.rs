use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, RuleCompilationError};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

/// Rule category. The known set is closed over the common AI tells; anything
/// else a team configures lands in `Other` with its original label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    FillerPhrase,
    Hedging,
    TransitionCliche,
    Structural,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::FillerPhrase => "filler-phrase",
            Category::Hedging => "hedging",
            Category::TransitionCliche => "transition-cliche",
            Category::Structural => "structural",
            Category::Other(label) => label,
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        match label.trim().to_lowercase().replace('_', "-").as_str() {
            "filler-phrase" => Category::FillerPhrase,
            "hedging" => Category::Hedging,
            "transition-cliche" | "transition-cliché" => Category::TransitionCliche,
            "structural" => Category::Structural,
            _ => Category::Other(label),
        }
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Category::from(label.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rule's `pattern` string is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Exact phrase, matched character for character.
    #[default]
    Literal,
    Regex,
    /// Name of a built-in heuristic, see `matcher::Heuristic`.
    Structural,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRule {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub kind: PatternKind,
    pub category: Category,
    pub severity: Severity,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub case_sensitive: bool,
}

fn default_active() -> bool {
    true
}

impl DetectionRule {
    pub fn literal(
        id: impl Into<String>,
        pattern: impl Into<String>,
        category: impl Into<Category>,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            kind: PatternKind::Literal,
            category: category.into(),
            severity,
            active: true,
            case_sensitive: false,
        }
    }

    pub fn regex(
        id: impl Into<String>,
        pattern: impl Into<String>,
        category: impl Into<Category>,
        severity: Severity,
    ) -> Self {
        Self {
            kind: PatternKind::Regex,
            ..Self::literal(id, pattern, category, severity)
        }
    }

    pub fn structural(
        id: impl Into<String>,
        heuristic: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            kind: PatternKind::Structural,
            ..Self::literal(id, heuristic, Category::Structural, severity)
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Detection output
// ---------------------------------------------------------------------------

/// One flagged span. Offsets are character (not byte) offsets into the
/// scanned text, half-open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub rule_id: String,
    pub matched_text: String,
    pub category: Category,
    pub severity: Severity,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl PatternMatch {
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    pub fn overlaps(&self, other: &PatternMatch) -> bool {
        self.start_offset < other.end_offset && other.start_offset < self.end_offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Clean,
    Light,
    Moderate,
    Heavy,
    Saturated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub matches: Vec<PatternMatch>,
    pub total_matches: usize,
    pub matches_by_category: BTreeMap<Category, usize>,
    pub matches_by_severity: BTreeMap<Severity, usize>,
    pub word_count: usize,
    pub weighted_sum: f64,
    pub density: f64,
    pub ai_score: f64,
    pub band: ScoreBand,
    #[serde(default)]
    pub skipped_rules: Vec<RuleCompilationError>,
}

impl DetectionResult {
    pub fn empty(word_count: usize) -> Self {
        Self {
            matches: Vec::new(),
            total_matches: 0,
            matches_by_category: BTreeMap::new(),
            matches_by_severity: BTreeMap::new(),
            word_count,
            weighted_sum: 0.0,
            density: 0.0,
            ai_score: 0.0,
            band: ScoreBand::Clean,
            skipped_rules: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Page index and link suggestions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedPage {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_topics: Vec<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub word_count: Option<u64>,
}

impl IndexedPage {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: None,
            summary: None,
            key_topics: Vec::new(),
            meta_description: None,
            word_count: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_word_count(mut self, word_count: u64) -> Self {
        self.word_count = Some(word_count);
        self
    }

    /// Rejects pages missing the fields every caller relies on.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "indexed page with url '{}' has an empty id",
                self.url
            )));
        }
        if self.url.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "indexed page '{}' has an empty url",
                self.id
            )));
        }
        Ok(())
    }
}

/// Output of the relevance scorer for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceScore {
    pub score: u32,
    pub matched_topics: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSuggestion<'a> {
    pub page: &'a IndexedPage,
    pub relevance_score: u32,
    pub matched_topics: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertionPoint {
    pub sentence: String,
    /// Character offset of the sentence start in the source content.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedLink<'a> {
    #[serde(flatten)]
    pub suggestion: LinkSuggestion<'a>,
    pub insertion: Option<InsertionPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        assert_eq!(Category::from("filler_phrase"), Category::FillerPhrase);
        assert_eq!(Category::from("Hedging"), Category::Hedging);
        assert_eq!(
            Category::from("cliché"),
            Category::Other("cliché".to_string())
        );
        let json = serde_json::to_string(&Category::TransitionCliche).unwrap();
        assert_eq!(json, "\"transition-cliche\"");
    }

    #[test]
    fn rule_defaults_when_deserialized() {
        let rule: DetectionRule = serde_json::from_str(
            r#"{"id": "r1", "pattern": "delve", "category": "other", "severity": "low"}"#,
        )
        .unwrap();
        assert!(rule.active);
        assert!(!rule.case_sensitive);
        assert_eq!(rule.kind, PatternKind::Literal);
    }

    #[test]
    fn page_without_url_is_invalid() {
        let page = IndexedPage::new("p1", "  ");
        assert!(matches!(page.validate(), Err(Error::InvalidInput(_))));
    }
}
