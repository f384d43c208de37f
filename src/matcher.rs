//! Rule-driven scanner: turns a team's detection rules into position-annotated
//! matches over a piece of prose.
//!
//! Literal and regex rules compile to a [`Regex`]; structural rules name one
//! of the built-in [`Heuristic`]s. Rules that fail to compile are skipped and
//! reported, never fatal to the scan.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::{Result, RuleCompilationError};
use crate::model::{Category, DetectionRule, PatternKind, PatternMatch, Severity};
use crate::text::{context_around, CharIndex};

const REGEX_SIZE_LIMIT: usize = 1 << 20;
const BULLET_RUN_MIN: usize = 6;

// ---------------------------------------------------------------------------
// Structural heuristics
// ---------------------------------------------------------------------------

static EM_DASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\u{2014}| -- ").unwrap());

static TRIADIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\w+, \w+, and \w+").unwrap());

static BOLD_HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*[^*\n]+[.:]\*\*").unwrap());

static BULLET_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*[-*]\s|\s*\d+\.\s)").unwrap());

static HORIZONTAL_RULE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:---+|\*\*\*+|___+)[ \t]*$").unwrap());

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\[insert [^\]]*\]|\[describe [^\]]*\]|\[url [^\]]*\]|\[your [^\]]*\]|\[todo[^\]]*\]",
    )
    .unwrap()
});

static CONTRAST_PAIR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\w+), not (\w+)\b").unwrap());

static NOT_JUST_BUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bnot (?:just|only) .{1,40}?, but(?: also)?\b").unwrap());

static SETUP_RESOLUTION_A_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(this|that|these|those|it|they|we)\s+",
        r"(isn't|aren't|wasn't|weren't|doesn't|don't|didn't|hasn't|haven't|won't|can't|couldn't|shouldn't",
        r"|is\s+not|are\s+not|was\s+not|were\s+not|does\s+not|do\s+not|did\s+not",
        r"|has\s+not|have\s+not|will\s+not|cannot|could\s+not|should\s+not)\b",
        r".{0,80}[.;:,]\s*",
        r"(it's|they're|that's|he's|she's|we're|it\s+is|they\s+are|that\s+is|this\s+is",
        r"|these\s+are|those\s+are|he\s+is|she\s+is|we\s+are|what's|what\s+is",
        r"|the\s+real|the\s+actual|instead|rather)",
    ))
    .unwrap()
});

static SETUP_RESOLUTION_B_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(it's|that's|this\s+is|they're|he's|she's|we're)\s+not\b",
        r".{0,80}[.;:,]\s*",
        r"(it's|they're|that's|he's|she's|we're|it\s+is|they\s+are|that\s+is|this\s+is",
        r"|these\s+are|those\s+are|what's|what\s+is|the\s+real|the\s+actual|instead|rather)",
    ))
    .unwrap()
});

static SENTENCE_OPENER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)(?:^|[.!?]\s+)((?:certainly|absolutely|indeed|honestly)[,!])").unwrap()
});

/// Prose-shape detectors that a plain phrase or regex rule cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Heuristic {
    EmDash,
    TriadicList,
    BoldHeader,
    BulletRun,
    HorizontalRule,
    Placeholder,
    ContrastPair,
    NotJustBut,
    SetupResolution,
    SentenceOpener,
}

impl Heuristic {
    pub const ALL: [Heuristic; 10] = [
        Heuristic::EmDash,
        Heuristic::TriadicList,
        Heuristic::BoldHeader,
        Heuristic::BulletRun,
        Heuristic::HorizontalRule,
        Heuristic::Placeholder,
        Heuristic::ContrastPair,
        Heuristic::NotJustBut,
        Heuristic::SetupResolution,
        Heuristic::SentenceOpener,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::EmDash => "em-dash",
            Heuristic::TriadicList => "triadic-list",
            Heuristic::BoldHeader => "bold-header",
            Heuristic::BulletRun => "bullet-run",
            Heuristic::HorizontalRule => "horizontal-rule",
            Heuristic::Placeholder => "placeholder",
            Heuristic::ContrastPair => "contrast-pair",
            Heuristic::NotJustBut => "not-just-but",
            Heuristic::SetupResolution => "setup-resolution",
            Heuristic::SentenceOpener => "sentence-opener",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|h| h.name() == normalized)
    }

    /// Byte spans flagged by this heuristic.
    fn spans(self, text: &str) -> Vec<(usize, usize)> {
        match self {
            Heuristic::EmDash => regex_spans(&EM_DASH_RE, text),
            Heuristic::TriadicList => regex_spans(&TRIADIC_RE, text),
            Heuristic::BoldHeader => regex_spans(&BOLD_HEADER_RE, text),
            Heuristic::BulletRun => bullet_runs(text),
            Heuristic::HorizontalRule => regex_spans(&HORIZONTAL_RULE_RE, text),
            Heuristic::Placeholder => regex_spans(&PLACEHOLDER_RE, text),
            Heuristic::ContrastPair => regex_spans(&CONTRAST_PAIR_RE, text),
            Heuristic::NotJustBut => regex_spans(&NOT_JUST_BUT_RE, text),
            Heuristic::SetupResolution => {
                let mut spans = regex_spans(&SETUP_RESOLUTION_A_RE, text);
                for (start, end) in regex_spans(&SETUP_RESOLUTION_B_RE, text) {
                    if spans.iter().all(|&(s, e)| end <= s || e <= start) {
                        spans.push((start, end));
                    }
                }
                spans.sort_unstable();
                spans
            }
            Heuristic::SentenceOpener => SENTENCE_OPENER_RE
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| (m.start(), m.end()))
                .collect(),
        }
    }
}

fn regex_spans(re: &Regex, text: &str) -> Vec<(usize, usize)> {
    re.find_iter(text).map(|m| (m.start(), m.end())).collect()
}

/// Runs of at least `BULLET_RUN_MIN` consecutive bullet lines, one span per run.
fn bullet_runs(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut run: Option<(usize, usize, usize)> = None; // (start, end, lines)
    let mut offset = 0usize;

    for line in text.split('\n') {
        let line_start = offset;
        let line_end = line_start + line.trim_end_matches('\r').len();
        offset += line.len() + 1;

        if BULLET_LINE_RE.is_match(line) {
            run = match run {
                Some((start, _, lines)) => Some((start, line_end, lines + 1)),
                None => Some((line_start, line_end, 1)),
            };
            continue;
        }
        if let Some((start, end, lines)) = run.take() {
            if lines >= BULLET_RUN_MIN {
                spans.push((start, end));
            }
        }
    }
    if let Some((start, end, lines)) = run {
        if lines >= BULLET_RUN_MIN {
            spans.push((start, end));
        }
    }
    spans
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Matcher {
    Pattern(Regex),
    Heuristic(Heuristic),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    id: String,
    category: Category,
    severity: Severity,
    matcher: Matcher,
}

fn compile_rule(rule: &DetectionRule) -> std::result::Result<CompiledRule, RuleCompilationError> {
    if rule.pattern.trim().is_empty() {
        return Err(RuleCompilationError::new(&rule.id, "pattern is empty"));
    }

    let matcher = match rule.kind {
        PatternKind::Literal | PatternKind::Regex => {
            let source = match rule.kind {
                PatternKind::Literal => regex::escape(&rule.pattern),
                _ => rule.pattern.clone(),
            };
            let re = RegexBuilder::new(&source)
                .case_insensitive(!rule.case_sensitive)
                .size_limit(REGEX_SIZE_LIMIT)
                .build()
                .map_err(|e| RuleCompilationError::new(&rule.id, e.to_string()))?;
            Matcher::Pattern(re)
        }
        PatternKind::Structural => {
            let heuristic = Heuristic::from_name(&rule.pattern).ok_or_else(|| {
                RuleCompilationError::new(
                    &rule.id,
                    format!("unknown structural heuristic '{}'", rule.pattern),
                )
            })?;
            Matcher::Heuristic(heuristic)
        }
    };

    Ok(CompiledRule {
        id: rule.id.clone(),
        category: rule.category.clone(),
        severity: rule.severity,
        matcher,
    })
}

/// The active rules of a configuration, compiled once and reusable across
/// documents.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    skipped: Vec<RuleCompilationError>,
}

impl RuleSet {
    /// Compiles every active rule. Inactive rules are dropped without being
    /// looked at; rules that fail to compile are recorded in `skipped`.
    pub fn compile(rules: &[DetectionRule]) -> Self {
        let mut set = RuleSet::default();
        for rule in rules.iter().filter(|r| r.active) {
            match compile_rule(rule) {
                Ok(compiled) => set.rules.push(compiled),
                Err(err) => set.skipped.push(err),
            }
        }
        set
    }

    /// Like [`RuleSet::compile`] but fails on the first bad rule.
    pub fn compile_strict(rules: &[DetectionRule]) -> Result<Self> {
        let set = Self::compile(rules);
        match set.skipped.first() {
            Some(err) => Err(err.clone().into()),
            None => Ok(set),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn skipped(&self) -> &[RuleCompilationError] {
        &self.skipped
    }

    /// Every occurrence of every compiled rule, ordered by start offset,
    /// longer spans first, then rule order.
    pub fn scan(&self, text: &str) -> Vec<PatternMatch> {
        if text.is_empty() || self.rules.is_empty() {
            return Vec::new();
        }
        let index = CharIndex::new(text);

        let per_rule: Vec<Vec<PatternMatch>> = self
            .rules
            .par_iter()
            .map(|rule| {
                let spans = match &rule.matcher {
                    Matcher::Pattern(re) => regex_spans(re, text),
                    Matcher::Heuristic(h) => h.spans(text),
                };
                spans
                    .into_iter()
                    .filter(|(start, end)| start < end)
                    .map(|(start, end)| PatternMatch {
                        rule_id: rule.id.clone(),
                        matched_text: text[start..end].to_string(),
                        category: rule.category.clone(),
                        severity: rule.severity,
                        start_offset: index.char_offset(start),
                        end_offset: index.char_offset(end),
                    })
                    .collect()
            })
            .collect();

        let mut seen = HashSet::new();
        let mut matches: Vec<PatternMatch> = per_rule
            .into_iter()
            .flatten()
            .filter(|m| seen.insert((m.rule_id.clone(), m.start_offset, m.end_offset)))
            .collect();
        matches.sort_by(|a, b| {
            a.start_offset
                .cmp(&b.start_offset)
                .then_with(|| b.len().cmp(&a.len()))
        });
        matches
    }
}

// ---------------------------------------------------------------------------
// One-shot API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub matches: Vec<PatternMatch>,
    pub skipped: Vec<RuleCompilationError>,
}

/// Compile `rules` and scan `text` with them in one go.
pub fn match_rules(text: &str, rules: &[DetectionRule]) -> MatchOutcome {
    let set = RuleSet::compile(rules);
    MatchOutcome {
        matches: set.scan(text),
        skipped: set.skipped,
    }
}

/// Short `...`-elided excerpt around a match, for prompt builders.
pub fn match_context(text: &str, m: &PatternMatch, width: usize) -> String {
    let index = CharIndex::new(text);
    let start = index.byte_offset(m.start_offset);
    let end = index.byte_offset(m.end_offset);
    context_around(text, start, end, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    #[test]
    fn heuristic_names_parse_with_either_separator() {
        assert_eq!(Heuristic::from_name("em_dash"), Some(Heuristic::EmDash));
        assert_eq!(
            Heuristic::from_name("Triadic-List"),
            Some(Heuristic::TriadicList)
        );
        assert_eq!(Heuristic::from_name("rhymes"), None);
    }

    #[test]
    fn bullet_run_needs_enough_lines() {
        let short = "- a\n- b\n- c\ntext";
        assert!(bullet_runs(short).is_empty());

        let long = "Intro\n- one\n- two\n- three\n- four\n- five\n- six\nOutro";
        let spans = bullet_runs(long);
        assert_eq!(spans.len(), 1);
        let (start, end) = spans[0];
        assert!(long[start..end].starts_with("- one"));
        assert!(long[start..end].ends_with("- six"));
    }

    #[test]
    fn zero_width_regex_hits_are_dropped() {
        let rules = vec![DetectionRule::regex("opt", "x*", "other", Severity::Low)];
        let outcome = match_rules("abc", &rules);
        assert!(outcome.matches.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn duplicate_rule_ids_do_not_duplicate_matches() {
        let rule = DetectionRule::literal("dup", "delve", "other", Severity::Low);
        let outcome = match_rules("We delve.", &[rule.clone(), rule]);
        assert_eq!(outcome.matches.len(), 1);
    }

    #[test]
    fn sentence_opener_span_excludes_preceding_punctuation() {
        let rules = vec![DetectionRule::structural("open", "sentence-opener", Severity::Low)];
        let outcome = match_rules("Fine. Certainly, we agree.", &rules);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].matched_text, "Certainly,");
        assert_eq!(outcome.matches[0].start_offset, 6);
    }
}
