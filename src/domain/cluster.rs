//! Speaker cluster: the unit of speaker identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persistent speaker identity built up from assigned embeddings.
///
/// The centroid is always the arithmetic mean of every embedding ever
/// folded into the cluster, including embeddings absorbed through merges.
/// Clusters are created on first assignment and never exist empty.
///
/// Ids are sequence-derived within a store so that replaying an identical
/// embedding sequence reproduces identical ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerCluster {
    /// Opaque unique identifier, stable for the cluster's lifetime
    pub id: String,

    /// The user whose audio this cluster belongs to (never changes)
    pub owner: String,

    /// Running mean of all member embeddings
    pub centroid: Vec<f32>,

    /// Number of individual embeddings folded into the centroid
    pub member_count: u64,

    /// Number of clustering events attributed to this cluster.
    /// Tracked separately from member_count so the two can be
    /// decoupled later (e.g. occurrence weighting).
    pub occurrence_count: u64,

    /// Whether a human has confirmed this cluster's identity
    pub is_labeled: bool,

    /// Human-assigned label, if any
    pub label: Option<String>,

    /// When this cluster was created
    pub created_at: DateTime<Utc>,

    /// When this cluster was last mutated
    pub last_updated: DateTime<Utc>,
}

impl SpeakerCluster {
    /// Create a cluster from its first embedding
    pub fn new(id: impl Into<String>, owner: impl Into<String>, embedding: Vec<f32>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            owner: owner.into(),
            centroid: embedding,
            member_count: 1,
            occurrence_count: 1,
            is_labeled: false,
            label: None,
            created_at: now,
            last_updated: now,
        }
    }

    /// Attach a confirmed human label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self.is_labeled = true;
        self
    }

    /// Dimensionality of the centroid
    pub fn dimension(&self) -> usize {
        self.centroid.len()
    }
}
