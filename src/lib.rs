//! voiceprint - Incremental speaker clustering for audio diarization
//!
//! Attributes diarized speech segments to persistent speaker identities
//! as they arrive: no re-processing of previously seen audio, no upfront
//! enrollment, and a periodic escalation asking a human to label a
//! recurring unidentified speaker.
//!
//! # Architecture
//!
//! The engine is a pure in-process library around one shared state
//! object, the [`ClusterStore`]:
//! - Each segment's embedding is matched against every cluster centroid
//!   (full scan, deterministic creation-order tie-break)
//! - A match at or above the similarity threshold folds into the
//!   cluster's running mean; anything else creates a new cluster
//! - After a batch, unlabeled clusters that recur often enough produce a
//!   single [`PromptRequest`] for a human labeling workflow
//! - The [`Sequencer`] threads one store through a user's sources in
//!   order, so speakers recurring across files are recognized
//!
//! Embedding generation, transcription, and persistence are external
//! collaborators; the core performs no I/O.
//!
//! # Modules
//!
//! - `math`: vector primitives (dot, norm, cosine similarity, mean)
//! - `domain`: data structures (SpeakerCluster, ClusterUpdate, prompts)
//! - `core`: store, assignment, escalation, sequencing
//! - `embedding`: the EmbeddingSource collaborator trait
//! - `config`: session tunables

pub mod config;
pub mod core;
pub mod domain;
pub mod embedding;
pub mod math;

// Re-export main types at crate root for convenience
pub use config::ClusteringConfig;
pub use self::core::{
    Assignment, BatchOutcome, ClusterError, ClusterStore, SegmentAssignment, SegmentFailure,
    Sequencer,
};
pub use domain::{
    dedup_updates, AudioSource, ClusterAction, ClusterUpdate, PromptPriority, PromptRequest,
    SpeakerCluster, SpeechSegment,
};
pub use embedding::{EmbeddingSource, HashEmbedder};
pub use math::MathError;
