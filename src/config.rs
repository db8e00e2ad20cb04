//! Clustering tunables.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (VOICEPRINT_SIMILARITY_THRESHOLD,
//!    VOICEPRINT_OCCURRENCE_THRESHOLD)
//! 2. Caller-supplied values (e.g. deserialized from the host service's
//!    own config file)
//! 3. Defaults

use serde::Deserialize;

/// Default cosine similarity required to join an existing cluster
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.85;

/// Default occurrence count at which an unlabeled cluster escalates
pub const DEFAULT_OCCURRENCE_THRESHOLD: u32 = 5;

/// Tunables for one clustering session
#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringConfig {
    /// Minimum cosine similarity (inclusive) for an embedding to join an
    /// existing cluster rather than create a new one
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Occurrence count at which an unlabeled cluster is escalated for
    /// human labeling
    #[serde(default = "default_occurrence_threshold")]
    pub occurrence_threshold: u32,
}

fn default_similarity_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_occurrence_threshold() -> u32 {
    DEFAULT_OCCURRENCE_THRESHOLD
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            occurrence_threshold: DEFAULT_OCCURRENCE_THRESHOLD,
        }
    }
}

impl ClusteringConfig {
    /// Defaults with any VOICEPRINT_* environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply VOICEPRINT_* environment overrides to this config.
    /// Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("VOICEPRINT_SIMILARITY_THRESHOLD") {
            if let Ok(threshold) = value.parse() {
                self.similarity_threshold = threshold;
            }
        }
        if let Ok(value) = std::env::var("VOICEPRINT_OCCURRENCE_THRESHOLD") {
            if let Ok(threshold) = value.parse() {
                self.occurrence_threshold = threshold;
            }
        }
        self
    }

    /// Set the similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the escalation occurrence threshold
    pub fn with_occurrence_threshold(mut self, threshold: u32) -> Self {
        self.occurrence_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClusteringConfig::default();
        assert!((config.similarity_threshold - 0.85).abs() < f32::EPSILON);
        assert_eq!(config.occurrence_threshold, 5);
    }

    #[test]
    fn test_builders() {
        let config = ClusteringConfig::default()
            .with_similarity_threshold(0.7)
            .with_occurrence_threshold(3);

        assert!((config.similarity_threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.occurrence_threshold, 3);
    }

    #[test]
    fn test_deserialization_fills_defaults() {
        let config: ClusteringConfig = serde_json::from_str("{}").unwrap();
        assert!((config.similarity_threshold - 0.85).abs() < f32::EPSILON);

        let config: ClusteringConfig =
            serde_json::from_str(r#"{"similarity_threshold": 0.9}"#).unwrap();
        assert!((config.similarity_threshold - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.occurrence_threshold, 5);
    }
}
