//! Engine configuration
//!
//! Scoring constants are tunable policy, not structural constants; they
//! live here so retuning never touches strategy logic.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scoring policy applied by strategies and the ranker
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScorePolicy {
    /// Flat boost on top of the Text strategy's priority
    pub text_boost: i32,

    /// Bonus when an Attribute candidate is built on a unique id
    pub id_bonus: i32,

    /// Bonus for a name attribute match
    pub name_bonus: i32,

    /// Bonus for other priority-tier attribute matches
    pub priority_attr_bonus: i32,

    /// Bonus for a stable data attribute match
    pub data_attr_bonus: i32,

    /// Bonus for a filtered class match
    pub class_bonus: i32,

    /// Subtracted from Attribute candidates when the class list looks
    /// machine-generated
    pub random_class_penalty: i32,

    /// Bonus when an anchor is an immediate sibling
    pub anchor_proximity_bonus: i32,

    /// Fixed minimal score of the position-indexed fallback
    pub fallback_score: i32,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            text_boost: 100,
            id_bonus: 50,
            name_bonus: 40,
            priority_attr_bonus: 30,
            data_attr_bonus: 25,
            class_bonus: 10,
            random_class_penalty: 50,
            anchor_proximity_bonus: 15,
            fallback_score: 10,
        }
    }
}

/// Top-level engine configuration
#[derive(Clone, Debug)]
pub struct SynthConfig {
    /// TTL of cached generation results
    pub result_ttl: Duration,

    /// TTL of cached feature snapshots
    pub feature_ttl: Duration,

    /// Visible-text length cap for the Text strategy
    pub max_text_len: usize,

    /// How many ancestor levels the Anchor strategy inspects
    pub anchor_ancestor_levels: usize,

    pub scores: ScorePolicy,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            result_ttl: Duration::from_secs(10),
            feature_ttl: Duration::from_secs(5),
            max_text_len: 50,
            anchor_ancestor_levels: 3,
            scores: ScorePolicy::default(),
        }
    }
}

impl SynthConfig {
    /// Set the result cache TTL
    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl = ttl;
        self
    }

    /// Set the feature cache TTL
    pub fn with_feature_ttl(mut self, ttl: Duration) -> Self {
        self.feature_ttl = ttl;
        self
    }

    /// Replace the scoring policy
    pub fn with_scores(mut self, scores: ScorePolicy) -> Self {
        self.scores = scores;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pin_documented_constants() {
        let scores = ScorePolicy::default();
        assert_eq!(scores.text_boost, 100);
        assert_eq!(scores.id_bonus, 50);
        assert_eq!(scores.random_class_penalty, 50);

        let config = SynthConfig::default();
        assert_eq!(config.max_text_len, 50);
        assert_eq!(config.result_ttl, Duration::from_secs(10));
        assert_eq!(config.feature_ttl, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_style() {
        let config = SynthConfig::default()
            .with_result_ttl(Duration::from_millis(50))
            .with_feature_ttl(Duration::from_millis(20));
        assert_eq!(config.result_ttl, Duration::from_millis(50));
        assert_eq!(config.feature_ttl, Duration::from_millis(20));
    }
}
