//! Cluster mutation records and batch deduplication.
//!
//! Every store mutation produces a `ClusterUpdate` so callers can replay
//! or persist the session's changes without the store performing any I/O.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of mutation applied to a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterAction {
    /// Cluster created from its first embedding
    Create,

    /// Embedding folded into an existing cluster
    Update,

    /// Another cluster absorbed into this one
    Merge,
}

/// Record of a single cluster mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterUpdate {
    /// Mutation kind
    pub action: ClusterAction,

    /// The affected cluster
    pub cluster_id: String,

    /// Centroid after the mutation
    pub centroid: Vec<f32>,

    /// Member count after the mutation
    pub member_count: u64,

    /// Occurrence count after the mutation
    pub occurrence_count: u64,

    /// For merges, the id of the absorbed cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_from: Option<String>,
}

/// Reduce a pass's updates to the latest state per cluster id.
///
/// Several segments in one pass can touch the same cluster; only the
/// final state is worth emitting. The record with the highest
/// `occurrence_count` wins; on equal counts a `Create` beats an `Update`
/// since creation is the cluster's true origin. First-seen cluster order
/// is preserved.
pub fn dedup_updates(updates: Vec<ClusterUpdate>) -> Vec<ClusterUpdate> {
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, ClusterUpdate> = HashMap::new();

    for update in updates {
        match latest.get(&update.cluster_id) {
            None => {
                order.push(update.cluster_id.clone());
                latest.insert(update.cluster_id.clone(), update);
            }
            Some(existing) => {
                let replaces = update.occurrence_count > existing.occurrence_count
                    || (update.occurrence_count == existing.occurrence_count
                        && update.action == ClusterAction::Create
                        && existing.action != ClusterAction::Create);
                if replaces {
                    latest.insert(update.cluster_id.clone(), update);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| latest.remove(&id))
        .collect()
}
