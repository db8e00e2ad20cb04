//! Embedding source seam.
//!
//! The clustering core never produces embeddings itself; it consumes a
//! fixed-length vector per segment from an upstream source. Failures
//! propagate as per-segment processing failures, never as a crash of the
//! whole batch.

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::math;

/// Trait for external embedding providers
#[async_trait]
pub trait EmbeddingSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Produce a speaker embedding for one segment's text.
    ///
    /// Dimensionality must be uniform across one clustering session.
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>>;
}

/// Deterministic text-hash embedder.
///
/// A stand-in for a real voice embedding model: each token is hashed and
/// folded into a fixed-dimension vector, then unit-normalized. Identical
/// text always yields the identical vector, which is what the clustering
/// tests and local runs need. Not a biometric signal.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(128)
    }
}

#[async_trait]
impl EmbeddingSource for HashEmbedder {
    fn name(&self) -> &str {
        "hash-embedder"
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text.split_whitespace() {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            for (i, byte) in digest.iter().enumerate() {
                let slot = (usize::from(digest[(i + 1) % digest.len()]) * 256 + i) % self.dimension;
                // Center byte values so tokens can cancel as well as add
                vector[slot] += f32::from(*byte) - 127.5;
            }
        }

        Ok(math::normalize(&vector))
    }
}
