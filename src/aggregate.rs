use std::collections::BTreeMap;

use crate::config::DetectionConfig;
use crate::model::{DetectionResult, PatternMatch};

/// Orders matches by start offset, longer span first on equal starts.
pub fn sort_matches(matches: &mut [PatternMatch]) {
    matches.sort_by(|a, b| {
        a.start_offset
            .cmp(&b.start_offset)
            .then_with(|| b.end_offset.cmp(&a.end_offset))
    });
}

/// Fold `next` into `current`. Both must be exact slices of the same text and
/// `next` must not start before `current`.
fn merge_pair(current: PatternMatch, next: PatternMatch) -> PatternMatch {
    let end_offset = current.end_offset.max(next.end_offset);
    let mut matched_text = current.matched_text;
    if next.end_offset > current.end_offset {
        let skip = current.end_offset - next.start_offset;
        matched_text.extend(next.matched_text.chars().skip(skip));
    }

    // Ties keep the earlier match's attribution.
    let (rule_id, category, severity) = if next.severity > current.severity {
        (next.rule_id, next.category, next.severity)
    } else {
        (current.rule_id, current.category, current.severity)
    };

    PatternMatch {
        rule_id,
        matched_text,
        category,
        severity,
        start_offset: current.start_offset,
        end_offset,
    }
}

/// Collapses overlapping matches into their union span. Spans that merely
/// touch (`a.end == b.start`) stay separate.
pub fn merge_overlapping(mut matches: Vec<PatternMatch>) -> Vec<PatternMatch> {
    sort_matches(&mut matches);

    let mut merged: Vec<PatternMatch> = Vec::with_capacity(matches.len());
    for m in matches {
        match merged.pop() {
            Some(current) if current.overlaps(&m) => merged.push(merge_pair(current, m)),
            Some(current) => {
                merged.push(current);
                merged.push(m);
            }
            None => merged.push(m),
        }
    }
    merged
}

/// Builds the full detection report for a document of `word_count` words.
pub fn aggregate(
    matches: Vec<PatternMatch>,
    word_count: usize,
    config: &DetectionConfig,
) -> DetectionResult {
    if matches.is_empty() {
        return DetectionResult::empty(word_count);
    }

    let matches = merge_overlapping(matches);

    let mut matches_by_category = BTreeMap::new();
    let mut matches_by_severity = BTreeMap::new();
    let mut weighted_sum = 0.0f64;
    for m in &matches {
        *matches_by_category.entry(m.category.clone()).or_insert(0) += 1;
        *matches_by_severity.entry(m.severity).or_insert(0) += 1;
        weighted_sum += config.severity_weights.weight(m.severity);
    }

    let density = if word_count > 0 {
        weighted_sum / (word_count as f64 / config.density_words_basis)
    } else {
        0.0
    };
    let ai_score = (density / config.saturation_density * 100.0).clamp(0.0, 100.0);
    let ai_score = (ai_score * 100.0).round() / 100.0;

    DetectionResult {
        total_matches: matches.len(),
        matches,
        matches_by_category,
        matches_by_severity,
        word_count,
        weighted_sum: (weighted_sum * 100.0).round() / 100.0,
        density: (density * 100.0).round() / 100.0,
        band: config.band_for_score(ai_score),
        ai_score,
        skipped_rules: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Severity};

    fn slice(text: &str, rule: &str, start: usize, end: usize, severity: Severity) -> PatternMatch {
        PatternMatch {
            rule_id: rule.to_string(),
            matched_text: text.chars().skip(start).take(end - start).collect(),
            category: Category::Other(rule.to_string()),
            severity,
            start_offset: start,
            end_offset: end,
        }
    }

    #[test]
    fn overlapping_matches_take_union_and_higher_severity() {
        let text = "it is worth noting that";
        let generic = slice(text, "generic", 0, 10, Severity::Low);
        let specific = slice(text, "specific", 6, 18, Severity::High);

        let merged = merge_overlapping(vec![specific, generic]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start_offset, 0);
        assert_eq!(merged[0].end_offset, 18);
        assert_eq!(merged[0].matched_text, "it is worth noting");
        assert_eq!(merged[0].severity, Severity::High);
        assert_eq!(merged[0].rule_id, "specific");
    }

    #[test]
    fn equal_severity_keeps_earlier_category() {
        let text = "abcdefghij";
        let first = slice(text, "first", 0, 5, Severity::Medium);
        let second = slice(text, "second", 3, 8, Severity::Medium);
        let merged = merge_overlapping(vec![second, first]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].category, Category::Other("first".to_string()));
        assert_eq!(merged[0].matched_text, "abcdefgh");
    }

    #[test]
    fn contained_match_is_absorbed() {
        let text = "abcdefghij";
        let outer = slice(text, "outer", 1, 9, Severity::Low);
        let inner = slice(text, "inner", 3, 5, Severity::Low);
        let merged = merge_overlapping(vec![inner, outer]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].matched_text, "bcdefghi");
    }

    #[test]
    fn touching_spans_are_not_merged() {
        let text = "abcdef";
        let merged = merge_overlapping(vec![
            slice(text, "a", 0, 3, Severity::Low),
            slice(text, "b", 3, 6, Severity::Low),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let result = aggregate(Vec::new(), 120, &DetectionConfig::default());
        assert_eq!(result.total_matches, 0);
        assert_eq!(result.ai_score, 0.0);
        assert!(result.matches_by_category.is_empty());
        assert_eq!(result.word_count, 120);
    }

    #[test]
    fn score_saturates_at_one_hundred() {
        let text = "delve delve delve";
        let matches = vec![
            slice(text, "r", 0, 5, Severity::High),
            slice(text, "r", 6, 11, Severity::High),
            slice(text, "r", 12, 17, Severity::High),
        ];
        let result = aggregate(matches, 3, &DetectionConfig::default());
        assert_eq!(result.ai_score, 100.0);
    }

    #[test]
    fn density_scales_with_word_count() {
        let text = "delve";
        let config = DetectionConfig::default();
        // 2 points over 100 words at basis 100 -> density 2, score 2 / 12 * 100.
        let result = aggregate(vec![slice(text, "r", 0, 5, Severity::Medium)], 100, &config);
        assert_eq!(result.density, 2.0);
        assert_eq!(result.ai_score, 16.67);
    }
}
