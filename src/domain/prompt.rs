//! Human-labeling escalation artifacts.

use serde::{Deserialize, Serialize};

/// Urgency of a labeling prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptPriority {
    Medium,
    High,
}

/// A request for a human to identify a recurring unlabeled speaker.
///
/// Produced by the escalation policy after a batch; consumed by an
/// external labeling workflow. Never stored by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest {
    /// The cluster awaiting a label
    pub cluster_id: String,

    /// Transcript excerpt for human review. May be empty when no segment
    /// text was available; the escalation still fires.
    pub context: String,

    /// Derived from the cluster's occurrence count
    pub priority: PromptPriority,
}

impl PromptRequest {
    /// Build a prompt with the context snippet quoted for display
    pub fn new(cluster_id: impl Into<String>, snippet: &str, priority: PromptPriority) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            context: format!("An unidentified speaker said: \"{}\"", snippet),
            priority,
        }
    }
}
