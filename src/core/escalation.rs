//! Occurrence-driven escalation of unlabeled speakers to a human.
//!
//! Escalation is a pure query over final store state after a batch, never
//! an event emitted mid-processing. That keeps "which segment caused the
//! prompt" out of the contract entirely.

use std::collections::HashMap;

use tracing::info;

use crate::domain::{PromptPriority, PromptRequest, SpeakerCluster};

use super::store::ClusterStore;

/// Occurrence count at or above which a prompt's priority becomes high
pub const HIGH_PRIORITY_OCCURRENCES: u64 = 10;

/// All unlabeled clusters whose occurrence count has reached `threshold`,
/// in store iteration (creation) order.
pub fn clusters_needing_prompt(store: &ClusterStore, threshold: u64) -> Vec<&SpeakerCluster> {
    store
        .clusters()
        .filter(|c| !c.is_labeled && c.occurrence_count >= threshold)
        .collect()
}

/// Select at most one cluster to escalate for a completed batch.
///
/// The first cluster needing a prompt wins; `snippets` maps cluster id to
/// a transcript excerpt for human review. A missing snippet degrades the
/// context to an empty quotation but never suppresses the escalation.
pub fn escalate_batch(
    store: &ClusterStore,
    threshold: u64,
    snippets: &HashMap<String, String>,
) -> Option<PromptRequest> {
    let cluster = clusters_needing_prompt(store, threshold).into_iter().next()?;

    let priority = if cluster.occurrence_count >= HIGH_PRIORITY_OCCURRENCES {
        PromptPriority::High
    } else {
        PromptPriority::Medium
    };

    let snippet = snippets.get(&cluster.id).map(String::as_str).unwrap_or("");

    info!(
        cluster_id = %cluster.id,
        occurrences = cluster.occurrence_count,
        ?priority,
        "Escalating unlabeled speaker for labeling"
    );

    Some(PromptRequest::new(&cluster.id, snippet, priority))
}
