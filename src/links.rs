//! Internal-link suggestions: rank indexed pages for an article and pick the
//! sentence a link would go into.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{IndexedPage, InsertionPoint, LinkSuggestion, PlannedLink, RelevanceScore};
use crate::relevance::RelevanceScorer;
use crate::text::{sentence_spans, CharIndex};
use crate::topics::TopicExtractor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankOptions {
    pub min_score: u32,
    pub max_results: usize,
    /// Compared case-insensitively against `IndexedPage::url`.
    pub exclude_urls: Vec<String>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            min_score: 20,
            max_results: 10,
            exclude_urls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkRanker {
    scorer: RelevanceScorer,
    topics: TopicExtractor,
}

impl LinkRanker {
    pub fn new(scorer: RelevanceScorer, topics: TopicExtractor) -> Self {
        Self { scorer, topics }
    }

    /// Pages scoring at least `min_score`, best first, at most `max_results`.
    /// Excluded URLs are filtered out before scoring. Equal scores keep the
    /// order the pages were given in.
    pub fn rank<'a>(
        &self,
        pages: &'a [IndexedPage],
        article_topics: &[String],
        article_title: &str,
        opts: &RankOptions,
    ) -> Result<Vec<LinkSuggestion<'a>>> {
        for page in pages {
            page.validate()?;
        }

        let excluded: HashSet<String> = opts
            .exclude_urls
            .iter()
            .map(|u| u.to_lowercase())
            .collect();

        let scored: Vec<(&'a IndexedPage, RelevanceScore)> = pages
            .par_iter()
            .filter(|page| !excluded.contains(&page.url.to_lowercase()))
            .map(|page| (page, self.scorer.score(article_topics, article_title, page)))
            .collect();

        let mut suggestions: Vec<LinkSuggestion<'a>> = scored
            .into_iter()
            .filter(|(_, relevance)| relevance.score >= opts.min_score)
            .map(|(page, relevance)| LinkSuggestion {
                page,
                relevance_score: relevance.score,
                matched_topics: relevance.matched_topics,
                reason: relevance.reason,
            })
            .collect();

        // Stable: ties stay in input order.
        suggestions.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        suggestions.truncate(opts.max_results);
        Ok(suggestions)
    }

    /// Extracts the article's topics, ranks `pages`, and picks an insertion
    /// sentence for each suggestion.
    pub fn plan<'a>(
        &self,
        content: &str,
        article_title: &str,
        pages: &'a [IndexedPage],
        opts: &RankOptions,
    ) -> Result<Vec<PlannedLink<'a>>> {
        let article_topics = self.topics.extract_default(content);
        let suggestions = self.rank(pages, &article_topics, article_title, opts)?;

        Ok(suggestions
            .into_iter()
            .map(|suggestion| {
                let link_topics = if suggestion.matched_topics.is_empty() {
                    &suggestion.page.key_topics
                } else {
                    &suggestion.matched_topics
                };
                let insertion = find_best_insertion_point(content, link_topics);
                PlannedLink {
                    suggestion,
                    insertion,
                }
            })
            .collect())
    }
}

/// Ranks pages with the default scorer.
pub fn rank_pages_by_relevance<'a>(
    pages: &'a [IndexedPage],
    article_topics: &[String],
    article_title: &str,
    opts: &RankOptions,
) -> Result<Vec<LinkSuggestion<'a>>> {
    LinkRanker::default().rank(pages, article_topics, article_title, opts)
}

/// The sentence mentioning the most `link_topics` (case-insensitive
/// substring), with its character offset. The first such sentence wins ties;
/// `None` when no sentence mentions any topic.
pub fn find_best_insertion_point(content: &str, link_topics: &[String]) -> Option<InsertionPoint> {
    let topics: Vec<String> = link_topics
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if topics.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize, &str)> = None; // (hits, byte start, sentence)
    for span in sentence_spans(content) {
        let lower = span.text.to_lowercase();
        let hits = topics.iter().filter(|t| lower.contains(t.as_str())).count();
        if hits > best.map_or(0, |(h, _, _)| h) {
            best = Some((hits, span.start, span.text));
        }
    }

    best.map(|(_, start, sentence)| InsertionPoint {
        sentence: sentence.to_string(),
        position: CharIndex::new(content).char_offset(start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_point_offsets_are_in_chars() {
        let content = "Caf\u{e9} culture matters. Good seo starts with content.";
        let point = find_best_insertion_point(content, &["SEO".to_string()]).unwrap();
        assert_eq!(point.sentence, "Good seo starts with content.");
        assert_eq!(point.position, 22);
    }

    #[test]
    fn blank_topics_never_match() {
        assert_eq!(find_best_insertion_point("Some text.", &[" ".to_string()]), None);
    }
}
