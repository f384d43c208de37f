use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{ScoreBand, Severity};

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Weight each severity contributes to the density sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 2.0,
            high: 3.0,
        }
    }
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub severity_weights: SeverityWeights,
    /// Density is expressed as weight points per this many words.
    pub density_words_basis: f64,
    /// Density at which `ai_score` saturates at 100.
    pub saturation_density: f64,
    pub band_light_min: f64,
    pub band_moderate_min: f64,
    pub band_heavy_min: f64,
    pub band_saturated_min: f64,
    /// Width of the window returned by `match_context`.
    pub context_window_chars: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            severity_weights: SeverityWeights::default(),
            density_words_basis: 100.0,
            saturation_density: 12.0,
            band_light_min: 20.0,
            band_moderate_min: 40.0,
            band_heavy_min: 60.0,
            band_saturated_min: 80.0,
            context_window_chars: 60,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        let w = &self.severity_weights;
        for (name, value) in [("low", w.low), ("medium", w.medium), ("high", w.high)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "severity weight '{name}' must be a non-negative number, got {value}"
                )));
            }
        }
        if !(self.density_words_basis.is_finite() && self.density_words_basis > 0.0) {
            return Err(Error::InvalidInput(format!(
                "density_words_basis must be positive, got {}",
                self.density_words_basis
            )));
        }
        if !(self.saturation_density.is_finite() && self.saturation_density > 0.0) {
            return Err(Error::InvalidInput(format!(
                "saturation_density must be positive, got {}",
                self.saturation_density
            )));
        }
        let bands = [
            self.band_light_min,
            self.band_moderate_min,
            self.band_heavy_min,
            self.band_saturated_min,
        ];
        if bands.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(Error::InvalidInput(
                "score band thresholds must be ascending".to_string(),
            ));
        }
        Ok(())
    }

    pub fn band_for_score(&self, score: f64) -> ScoreBand {
        if score >= self.band_saturated_min {
            ScoreBand::Saturated
        } else if score >= self.band_heavy_min {
            ScoreBand::Heavy
        } else if score >= self.band_moderate_min {
            ScoreBand::Moderate
        } else if score >= self.band_light_min {
            ScoreBand::Light
        } else {
            ScoreBand::Clean
        }
    }
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "is", "it", "that",
    "this", "with", "as", "by", "from", "was", "were", "are", "be", "been", "being", "has", "have",
    "had", "not", "no", "do", "does", "did", "will", "would", "could", "should", "can", "may",
    "might", "must", "shall", "if", "then", "than", "so", "up", "out", "about", "into", "over",
    "after", "before", "between", "through", "just", "also", "very", "more", "most", "some",
    "any", "each", "every", "all", "both", "few", "other", "such", "only", "own", "same", "too",
    "how", "what", "which", "who", "whom", "whose", "when", "where", "why", "there", "their",
    "them", "they", "these", "those", "your", "yours", "ours", "here", "while", "because",
    "during", "without", "within", "upon", "under", "again", "once", "even", "still", "much",
    "many", "like", "make", "made", "well", "however", "therefore", "furthermore", "moreover",
    "additionally", "although", "though", "whether", "since", "until", "unless", "another",
    "often", "always", "never", "really", "quite", "rather", "instead", "thus", "hence",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub stop_words: HashSet<String>,
    /// Tokens shorter than this many characters are dropped.
    pub min_token_chars: usize,
    /// A token must occur at least this many times to qualify.
    pub min_frequency: usize,
    pub default_max_topics: usize,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_token_chars: 4,
            min_frequency: 2,
            default_max_topics: 20,
        }
    }
}

impl TopicConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_frequency == 0 {
            return Err(Error::InvalidInput(
                "min_frequency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Relevance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub topic_match_points: u32,
    pub topic_cap: u32,
    pub title_word_points: u32,
    pub title_cap: u32,
    /// Title words need at least this many characters to count.
    pub title_word_min_chars: usize,
    pub summary_topic_points: u32,
    /// Only the first N article topics are checked against the summary.
    pub summary_topics_checked: usize,
    pub summary_cap: u32,
    pub length_ideal: (u64, u64),
    pub length_ideal_points: u32,
    pub length_acceptable: (u64, u64),
    pub length_acceptable_points: u32,
    pub length_minimum: u64,
    pub length_minimum_points: u32,
    pub score_max: u32,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            topic_match_points: 10,
            topic_cap: 40,
            title_word_points: 8,
            title_cap: 25,
            title_word_min_chars: 4,
            summary_topic_points: 4,
            summary_topics_checked: 5,
            summary_cap: 20,
            length_ideal: (500, 2000),
            length_ideal_points: 15,
            length_acceptable: (300, 3000),
            length_acceptable_points: 10,
            length_minimum: 100,
            length_minimum_points: 5,
            score_max: 100,
        }
    }
}

impl RelevanceConfig {
    /// Ceiling applied to the running topic + title + summary total.
    pub fn content_cap(&self) -> u32 {
        self.topic_cap + self.title_cap + self.summary_cap
    }

    pub fn validate(&self) -> Result<()> {
        if self.score_max == 0 || self.score_max > 100 {
            return Err(Error::InvalidInput(format!(
                "score_max must be within 1..=100, got {}",
                self.score_max
            )));
        }
        if self.length_ideal.0 > self.length_ideal.1
            || self.length_acceptable.0 > self.length_acceptable.1
        {
            return Err(Error::InvalidInput(
                "length bands must be (min, max) with min <= max".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Everything the engine can be tuned with, as loaded from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detection: DetectionConfig,
    pub topics: TopicConfig,
    pub relevance: RelevanceConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.topics.validate()?;
        self.relevance.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_saturation() {
        let config = DetectionConfig {
            saturation_density: 0.0,
            ..DetectionConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"detection": {"saturation_density": 5.0}}"#).unwrap();
        assert_eq!(config.detection.saturation_density, 5.0);
        assert_eq!(config.detection.severity_weights.high, 3.0);
        assert_eq!(config.relevance.topic_cap, 40);
    }

    #[test]
    fn bands_follow_thresholds() {
        let config = DetectionConfig::default();
        assert_eq!(config.band_for_score(0.0), ScoreBand::Clean);
        assert_eq!(config.band_for_score(25.0), ScoreBand::Light);
        assert_eq!(config.band_for_score(45.0), ScoreBand::Moderate);
        assert_eq!(config.band_for_score(79.9), ScoreBand::Heavy);
        assert_eq!(config.band_for_score(100.0), ScoreBand::Saturated);
    }
}
