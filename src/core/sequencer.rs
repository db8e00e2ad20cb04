//! Cross-source batch sequencing.
//!
//! One user's batch of audio sources is processed strictly in the order
//! given, against a single mutable cluster store, so a speaker recurring
//! across files is recognized rather than re-created. Parallelizing across
//! sources would break that guarantee and is deliberately impossible with
//! this API: the sequencer owns the store for the duration of the batch.
//!
//! The safe cancellation boundary is between sources. A source is
//! processed atomically with respect to the update fold, so callers that
//! need cancellation stop submitting sources rather than interrupting one.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::config::ClusteringConfig;
use crate::domain::{dedup_updates, AudioSource, ClusterUpdate, PromptRequest, SpeakerCluster};
use crate::embedding::EmbeddingSource;

use super::escalation::escalate_batch;
use super::store::ClusterStore;

/// One segment's attribution to a cluster
#[derive(Debug, Clone)]
pub struct SegmentAssignment {
    /// Source the segment came from
    pub source_id: String,

    /// Index of the segment within its source
    pub segment_index: usize,

    /// Cluster the segment was attributed to
    pub cluster_id: String,

    /// True when this segment created the cluster
    pub is_new_speaker: bool,
}

/// A segment whose embedding could not be produced.
///
/// The segment is skipped without mutating any cluster; sibling segments
/// and sources continue.
#[derive(Debug, Clone)]
pub struct SegmentFailure {
    pub source_id: String,
    pub segment_index: usize,
    pub error: String,
}

/// Everything a completed batch hands back to the caller
#[derive(Debug)]
pub struct BatchOutcome {
    /// Per-segment cluster attributions, in processing order
    pub assignments: Vec<SegmentAssignment>,

    /// Deduplicated cluster mutations for the caller to persist
    pub updates: Vec<ClusterUpdate>,

    /// Segments skipped because embedding generation failed
    pub failures: Vec<SegmentFailure>,

    /// At most one labeling escalation for the whole batch
    pub prompt: Option<PromptRequest>,
}

/// Processes one user's audio sources against a shared cluster store.
///
/// Exclusive owner of the store for the session; a second batch for the
/// same user must wait for this one (or use the clusters it emits).
pub struct Sequencer {
    owner: String,
    config: ClusteringConfig,
    store: ClusterStore,
    /// First non-empty transcript text seen per cluster, for prompt context
    snippets: HashMap<String, String>,
}

impl Sequencer {
    /// Start a session with an empty store
    pub fn new(owner: impl Into<String>, config: ClusteringConfig) -> Self {
        Self {
            owner: owner.into(),
            config,
            store: ClusterStore::new(),
            snippets: HashMap::new(),
        }
    }

    /// Start a session seeded with clusters from previous sessions,
    /// enabling recognition across process restarts.
    pub fn with_seed(
        owner: impl Into<String>,
        config: ClusteringConfig,
        clusters: Vec<SpeakerCluster>,
    ) -> Self {
        Self {
            owner: owner.into(),
            config,
            store: ClusterStore::from_clusters(clusters),
            snippets: HashMap::new(),
        }
    }

    /// Process a batch of sources in order, sharing cluster state between
    /// them, then run the escalation policy over the final store state.
    ///
    /// Embedding failures are recorded per segment and processing
    /// continues; a dimension mismatch between an embedding and the store
    /// is a contract violation and aborts the batch.
    #[instrument(skip(self, sources, embedder), fields(owner = %self.owner, sources = sources.len()))]
    pub async fn process_batch(
        &mut self,
        sources: &[AudioSource],
        embedder: &dyn EmbeddingSource,
    ) -> Result<BatchOutcome> {
        info!(embedder = embedder.name(), "Starting clustering batch");

        let mut assignments = Vec::new();
        let mut failures = Vec::new();
        let mut batch_updates: Vec<ClusterUpdate> = Vec::new();

        for source in sources {
            let source_updates = self
                .process_source(source, embedder, &mut assignments, &mut failures)
                .await?;

            // Fold this source's net effect into the batch before the
            // next source starts
            batch_updates.extend(dedup_updates(source_updates));
        }

        let updates = dedup_updates(batch_updates);
        let prompt = escalate_batch(
            &self.store,
            u64::from(self.config.occurrence_threshold),
            &self.snippets,
        );

        info!(
            clusters = self.store.len(),
            assigned = assignments.len(),
            failed = failures.len(),
            escalated = prompt.is_some(),
            "Clustering batch finished"
        );

        Ok(BatchOutcome {
            assignments,
            updates,
            failures,
            prompt,
        })
    }

    async fn process_source(
        &mut self,
        source: &AudioSource,
        embedder: &dyn EmbeddingSource,
        assignments: &mut Vec<SegmentAssignment>,
        failures: &mut Vec<SegmentFailure>,
    ) -> Result<Vec<ClusterUpdate>> {
        let mut updates = Vec::new();

        for (segment_index, segment) in source.segments.iter().enumerate() {
            // The only await in the session: embedding generation happens
            // before the segment enters the clustering core
            let embedding = match embedder.generate_embedding(&segment.text).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!(
                        source_id = %source.id,
                        segment_index,
                        error = %e,
                        "Embedding failed, skipping segment"
                    );
                    failures.push(SegmentFailure {
                        source_id: source.id.clone(),
                        segment_index,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let assignment = self
                .store
                .assign(&embedding, &self.owner, self.config.similarity_threshold)
                .with_context(|| {
                    format!(
                        "Failed to assign segment {} of source '{}'",
                        segment_index, source.id
                    )
                })?;

            if !segment.text.trim().is_empty() {
                self.snippets
                    .entry(assignment.cluster_id.clone())
                    .or_insert_with(|| segment.text.clone());
            }

            assignments.push(SegmentAssignment {
                source_id: source.id.clone(),
                segment_index,
                cluster_id: assignment.cluster_id.clone(),
                is_new_speaker: assignment.is_new,
            });
            updates.push(assignment.update);
        }

        Ok(updates)
    }

    /// The store as it stands mid-session
    pub fn store(&self) -> &ClusterStore {
        &self.store
    }

    /// Confirm a cluster's identity with a human-provided label
    pub fn label_cluster(&mut self, cluster_id: &str, label: impl Into<String>) -> Result<()> {
        self.store
            .set_label(cluster_id, label)
            .context("Failed to label cluster")
    }

    /// End the session, handing every cluster back for persistence
    pub fn into_clusters(self) -> Vec<SpeakerCluster> {
        self.store.into_clusters()
    }
}
