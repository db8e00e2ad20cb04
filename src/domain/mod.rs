//! Domain types for the speaker-clustering engine.
//!
//! This module contains the core data structures:
//! - SpeakerCluster: a persistent speaker identity
//! - ClusterUpdate: immutable record of one store mutation
//! - PromptRequest: human-labeling escalation artifact
//! - SpeechSegment / AudioSource: diarized transcript input

pub mod cluster;
pub mod prompt;
pub mod segment;
pub mod update;

// Re-export commonly used types
pub use cluster::SpeakerCluster;
pub use prompt::{PromptPriority, PromptRequest};
pub use segment::{AudioSource, SpeechSegment};
pub use update::{dedup_updates, ClusterAction, ClusterUpdate};
