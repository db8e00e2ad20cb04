//! Core clustering engine.
//!
//! This module contains:
//! - ClusterStore: insertion-ordered cluster state and mutation
//! - Escalation: occurrence-driven human-labeling prompts
//! - Sequencer: cross-source batch processing

pub mod escalation;
pub mod sequencer;
pub mod store;

// Re-export commonly used types
pub use escalation::{clusters_needing_prompt, escalate_batch, HIGH_PRIORITY_OCCURRENCES};
pub use sequencer::{BatchOutcome, SegmentAssignment, SegmentFailure, Sequencer};
pub use store::{Assignment, ClusterError, ClusterStore};
