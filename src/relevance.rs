use std::collections::HashSet;

use crate::config::RelevanceConfig;
use crate::error::Result;
use crate::model::{IndexedPage, RelevanceScore};

const REASON_TITLE: &str = "title keyword match";
const REASON_SUMMARY: &str = "summary relevance";
const REASON_FALLBACK: &str = "general relevance";

/// Scores how well an indexed page fits as a link target for an article.
///
/// Four parts: topic overlap, title keywords, summary mentions and a
/// content-length fit. The first three share one ceiling
/// ([`RelevanceConfig::content_cap`]) applied to their running total; the
/// length bonus is added on top of that.
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    config: RelevanceConfig,
}

impl RelevanceScorer {
    pub fn new(config: RelevanceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RelevanceConfig {
        &self.config
    }

    pub fn score(
        &self,
        article_topics: &[String],
        article_title: &str,
        page: &IndexedPage,
    ) -> RelevanceScore {
        let cfg = &self.config;
        let mut reasons: Vec<String> = Vec::new();

        // Topic overlap: exact, case-insensitive.
        let page_topics: HashSet<String> =
            page.key_topics.iter().map(|t| t.to_lowercase()).collect();
        let matched_topics: Vec<String> = article_topics
            .iter()
            .filter(|t| page_topics.contains(&t.to_lowercase()))
            .cloned()
            .collect();
        let topic_points =
            (matched_topics.len() as u32 * cfg.topic_match_points).min(cfg.topic_cap);
        if !matched_topics.is_empty() {
            reasons.push(format!("{} topic matches", matched_topics.len()));
        }

        // Title: article-title words found anywhere in the page title.
        let title_points = match page.title.as_deref() {
            Some(title) if !title.trim().is_empty() => {
                let page_title = title.to_lowercase();
                let hits = article_title
                    .to_lowercase()
                    .split_whitespace()
                    .filter(|w| w.chars().count() >= cfg.title_word_min_chars)
                    .filter(|w| page_title.contains(w))
                    .count() as u32;
                (hits * cfg.title_word_points).min(cfg.title_cap)
            }
            _ => 0,
        };
        if title_points > 0 {
            reasons.push(REASON_TITLE.to_string());
        }

        // Summary: leading article topics mentioned in the page summary.
        let summary_points = match page.summary.as_deref() {
            Some(summary) if !summary.trim().is_empty() => {
                let summary = summary.to_lowercase();
                let hits = article_topics
                    .iter()
                    .take(cfg.summary_topics_checked)
                    .map(|t| t.to_lowercase())
                    .filter(|t| !t.is_empty() && summary.contains(t.as_str()))
                    .count() as u32;
                hits * cfg.summary_topic_points
            }
            _ => 0,
        };
        if summary_points > 0 {
            reasons.push(REASON_SUMMARY.to_string());
        }

        let content_points = (topic_points + title_points + summary_points).min(cfg.content_cap());
        let score = (content_points + self.length_points(page.word_count)).min(cfg.score_max);

        let reason = if reasons.is_empty() {
            REASON_FALLBACK.to_string()
        } else {
            reasons.join(", ")
        };

        RelevanceScore {
            score,
            matched_topics,
            reason,
        }
    }

    fn length_points(&self, word_count: Option<u64>) -> u32 {
        let cfg = &self.config;
        let Some(words) = word_count else {
            return 0;
        };
        let within = |(lo, hi): (u64, u64)| words >= lo && words <= hi;
        if within(cfg.length_ideal) {
            cfg.length_ideal_points
        } else if within(cfg.length_acceptable) {
            cfg.length_acceptable_points
        } else if words >= cfg.length_minimum {
            cfg.length_minimum_points
        } else {
            0
        }
    }
}

/// Scores one page with the default weights.
pub fn calculate_relevance_score(
    article_topics: &[String],
    article_title: &str,
    page: &IndexedPage,
) -> RelevanceScore {
    RelevanceScorer::default().score(article_topics, article_title, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn length_bands() {
        let scorer = RelevanceScorer::default();
        assert_eq!(scorer.length_points(None), 0);
        assert_eq!(scorer.length_points(Some(50)), 0);
        assert_eq!(scorer.length_points(Some(100)), 5);
        assert_eq!(scorer.length_points(Some(300)), 10);
        assert_eq!(scorer.length_points(Some(500)), 15);
        assert_eq!(scorer.length_points(Some(2000)), 15);
        assert_eq!(scorer.length_points(Some(2500)), 10);
        assert_eq!(scorer.length_points(Some(5000)), 5);
    }

    #[test]
    fn title_points_cap_at_twenty_five() {
        let page = IndexedPage::new("p", "https://a.com/p")
            .with_title("Content marketing strategy guide for startups");
        let result = calculate_relevance_score(
            &[],
            "content marketing strategy guide startups",
            &page,
        );
        assert_eq!(result.score, 25);
        assert_eq!(result.reason, "title keyword match");
    }

    #[test]
    fn short_title_words_are_ignored() {
        let page = IndexedPage::new("p", "https://a.com/p").with_title("How to win at SEO");
        let result = calculate_relevance_score(&[], "how to win seo", &page);
        assert_eq!(result.score, 0);
        assert_eq!(result.reason, "general relevance");
    }

    #[test]
    fn summary_only_checks_first_five_topics() {
        let page = IndexedPage::new("p", "https://a.com/p")
            .with_summary("alpha beta gamma delta epsilon zeta eta");
        let article = topics(&["alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta"]);
        let result = calculate_relevance_score(&article, "", &page);
        assert_eq!(result.score, 20);
        assert_eq!(result.reason, "summary relevance");
    }

    #[test]
    fn running_total_clamps_before_length_bonus() {
        let page = IndexedPage::new("p", "https://a.com/p")
            .with_title("seo growth content marketing funnels")
            .with_summary("seo growth content marketing funnels")
            .with_topics(["seo", "growth", "content", "marketing", "funnels"])
            .with_word_count(1000);
        let article = topics(&["seo", "growth", "content", "marketing", "funnels"]);
        let result =
            calculate_relevance_score(&article, "growth content marketing funnels", &page);
        // 40 + 25 + 20 = 85, then +15 for length.
        assert_eq!(result.score, 100);
        assert_eq!(
            result.reason,
            "5 topic matches, title keyword match, summary relevance"
        );
    }
}
