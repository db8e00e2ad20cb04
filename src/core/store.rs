//! Insertion-ordered cluster store with incremental centroid maintenance.
//!
//! Iteration order is creation order, and the best-match scan breaks ties
//! by taking the first cluster reaching the maximum similarity. That makes
//! replays of an identical embedding sequence produce identical
//! assignments, which downstream persistence relies on.
//!
//! Centroids are maintained through an f64 running sum per cluster, so the
//! externally visible centroid is always the exact mean of every member
//! embedding regardless of how many folds the cluster has seen.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{ClusterAction, ClusterUpdate, SpeakerCluster};
use crate::math::{self, MathError};

/// Errors from cluster store operations
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("Cluster not found: {0}")]
    NotFound(String),

    #[error("Cannot merge cluster {0} into itself")]
    SelfMerge(String),

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Result of assigning one embedding
#[derive(Debug, Clone)]
pub struct Assignment {
    /// The cluster the embedding was attributed to
    pub cluster_id: String,

    /// True when the assignment created the cluster
    pub is_new: bool,

    /// Best-match similarity (absent when the store was empty)
    pub similarity: Option<f32>,

    /// Mutation record for the caller to persist or replay
    pub update: ClusterUpdate,
}

/// A cluster plus its running embedding sum
#[derive(Debug, Clone)]
struct Entry {
    cluster: SpeakerCluster,
    sum: Vec<f64>,
}

impl Entry {
    fn from_cluster(cluster: SpeakerCluster) -> Self {
        let count = cluster.member_count as f64;
        let sum = cluster
            .centroid
            .iter()
            .map(|c| f64::from(*c) * count)
            .collect();
        Self { cluster, sum }
    }

    fn refresh_centroid(&mut self) {
        let count = self.cluster.member_count as f64;
        self.cluster.centroid = self.sum.iter().map(|s| (s / count) as f32).collect();
        self.cluster.last_updated = Utc::now();
    }
}

/// In-memory collection of one user's speaker clusters.
///
/// Owned by a single sequencer for the duration of one batch; distinct
/// users' stores share nothing.
#[derive(Debug, Default)]
pub struct ClusterStore {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    /// Count of clusters ever created here; the next id suffix. Survives
    /// merges (ids are never reused) and seeding (recovered from the
    /// highest persisted suffix).
    next_cluster_index: u64,
}

impl ClusterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from clusters persisted by a previous session.
    ///
    /// Running sums are reconstructed as centroid × member_count, so a
    /// seeded store continues the exact mean from where it left off.
    pub fn from_clusters(clusters: Vec<SpeakerCluster>) -> Self {
        let mut store = Self::new();
        for cluster in clusters {
            // Never reuse an id that a previous session handed out, even
            // when merges left gaps in the sequence
            let next = parse_cluster_index(&cluster.id)
                .map(|i| i + 1)
                .unwrap_or(store.entries.len() as u64 + 1);
            store.next_cluster_index = store.next_cluster_index.max(next);

            store.index.insert(cluster.id.clone(), store.entries.len());
            store.entries.push(Entry::from_cluster(cluster));
        }
        store
    }

    /// Drain the store back into a plain cluster list for persistence
    pub fn into_clusters(self) -> Vec<SpeakerCluster> {
        self.entries.into_iter().map(|e| e.cluster).collect()
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a cluster by id
    pub fn get(&self, id: &str) -> Option<&SpeakerCluster> {
        self.index.get(id).map(|&i| &self.entries[i].cluster)
    }

    /// Iterate clusters in creation order
    pub fn clusters(&self) -> impl Iterator<Item = &SpeakerCluster> {
        self.entries.iter().map(|e| &e.cluster)
    }

    /// Mark a cluster as labeled by a human
    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> Result<(), ClusterError> {
        let idx = self.lookup(id)?;
        let cluster = &mut self.entries[idx].cluster;
        cluster.label = Some(label.into());
        cluster.is_labeled = true;
        cluster.last_updated = Utc::now();
        Ok(())
    }

    /// Find the existing cluster most similar to `embedding`.
    ///
    /// Full scan in creation order with a strict `>` comparison, so the
    /// first cluster achieving the maximum wins ties exactly.
    pub fn best_match(&self, embedding: &[f32]) -> Result<Option<(String, f32)>, ClusterError> {
        let mut best: Option<(String, f32)> = None;

        for entry in &self.entries {
            let sim = math::cosine_similarity(embedding, &entry.cluster.centroid)?;
            match best {
                Some((_, best_sim)) if sim <= best_sim => {}
                _ => best = Some((entry.cluster.id.clone(), sim)),
            }
        }

        Ok(best)
    }

    /// Allocate a new cluster whose centroid is the embedding itself
    pub fn create_cluster(&mut self, embedding: Vec<f32>, owner: &str) -> &SpeakerCluster {
        let id = format!("speaker_{}", self.next_cluster_index);
        self.next_cluster_index += 1;

        let cluster = SpeakerCluster::new(id, owner, embedding);
        debug!(cluster_id = %cluster.id, owner, "Created speaker cluster");

        let idx = self.entries.len();
        self.index.insert(cluster.id.clone(), idx);
        self.entries.push(Entry::from_cluster(cluster));
        &self.entries[idx].cluster
    }

    /// Fold an embedding into an existing cluster, updating the exact
    /// incremental mean and both counters.
    pub fn fold_into(&mut self, id: &str, embedding: &[f32]) -> Result<&SpeakerCluster, ClusterError> {
        let idx = self.lookup(id)?;
        let entry = &mut self.entries[idx];

        if embedding.len() != entry.cluster.centroid.len() {
            return Err(MathError::DimensionMismatch {
                expected: entry.cluster.centroid.len(),
                actual: embedding.len(),
            }
            .into());
        }

        for (s, x) in entry.sum.iter_mut().zip(embedding.iter()) {
            *s += f64::from(*x);
        }
        entry.cluster.member_count += 1;
        entry.cluster.occurrence_count += 1;
        entry.refresh_centroid();

        Ok(&entry.cluster)
    }

    /// Combine `source_id` into `target_id`.
    ///
    /// The new centroid is the member-count-weighted mean of the two; both
    /// counters are summed and the source cluster is removed. A failed
    /// merge leaves the store untouched.
    pub fn merge(&mut self, target_id: &str, source_id: &str) -> Result<ClusterUpdate, ClusterError> {
        if target_id == source_id {
            return Err(ClusterError::SelfMerge(target_id.to_string()));
        }

        let target_idx = self.lookup(target_id)?;
        let source_idx = self.lookup(source_id)?;

        if self.entries[source_idx].cluster.centroid.len()
            != self.entries[target_idx].cluster.centroid.len()
        {
            return Err(MathError::DimensionMismatch {
                expected: self.entries[target_idx].cluster.centroid.len(),
                actual: self.entries[source_idx].cluster.centroid.len(),
            }
            .into());
        }

        let source = self.entries.remove(source_idx);
        // Removal shifts every later entry left by one
        self.index.remove(source_id);
        for (i, entry) in self.entries.iter().enumerate().skip(source_idx) {
            self.index.insert(entry.cluster.id.clone(), i);
        }

        let target_idx = self.lookup(target_id)?;
        let target = &mut self.entries[target_idx];
        for (s, x) in target.sum.iter_mut().zip(source.sum.iter()) {
            *s += x;
        }
        target.cluster.member_count += source.cluster.member_count;
        target.cluster.occurrence_count += source.cluster.occurrence_count;
        target.refresh_centroid();

        info!(
            target = %target_id,
            source = %source_id,
            member_count = target.cluster.member_count,
            "Merged speaker clusters"
        );

        Ok(ClusterUpdate {
            action: ClusterAction::Merge,
            cluster_id: target.cluster.id.clone(),
            centroid: target.cluster.centroid.clone(),
            member_count: target.cluster.member_count,
            occurrence_count: target.cluster.occurrence_count,
            merged_from: Some(source.cluster.id),
        })
    }

    /// Attribute an embedding to a cluster, creating one when nothing
    /// matches at or above `threshold`.
    ///
    /// The threshold is inclusive: a best similarity exactly equal to it
    /// joins the existing cluster.
    pub fn assign(
        &mut self,
        embedding: &[f32],
        owner: &str,
        threshold: f32,
    ) -> Result<Assignment, ClusterError> {
        match self.best_match(embedding)? {
            Some((id, sim)) if sim >= threshold => {
                let cluster = self.fold_into(&id, embedding)?;
                debug!(cluster_id = %id, similarity = sim, "Embedding joined existing cluster");
                Ok(Assignment {
                    cluster_id: id,
                    is_new: false,
                    similarity: Some(sim),
                    update: record(ClusterAction::Update, cluster),
                })
            }
            best => {
                let similarity = best.map(|(_, sim)| sim);
                let cluster = self.create_cluster(embedding.to_vec(), owner);
                Ok(Assignment {
                    cluster_id: cluster.id.clone(),
                    is_new: true,
                    similarity,
                    update: record(ClusterAction::Create, cluster),
                })
            }
        }
    }

    fn lookup(&self, id: &str) -> Result<usize, ClusterError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| ClusterError::NotFound(id.to_string()))
    }
}

fn parse_cluster_index(id: &str) -> Option<u64> {
    id.strip_prefix("speaker_")?.parse().ok()
}

fn record(action: ClusterAction, cluster: &SpeakerCluster) -> ClusterUpdate {
    ClusterUpdate {
        action,
        cluster_id: cluster.id.clone(),
        centroid: cluster.centroid.clone(),
        member_count: cluster.member_count,
        occurrence_count: cluster.occurrence_count,
        merged_from: None,
    }
}
