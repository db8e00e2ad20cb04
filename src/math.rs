//! Vector math primitives for embedding comparison.
//!
//! All pairwise operations require equal-length inputs; a length mismatch
//! is a contract violation and returns an error rather than truncating.
//! Zero-magnitude vectors are handled explicitly so cosine similarity
//! never produces NaN.

use thiserror::Error;

/// Errors from vector math contract violations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MathError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot compute mean of zero vectors")]
    EmptyInput,
}

/// Dot product of two equal-length vectors
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32, MathError> {
    check_dims(a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Euclidean (L2) norm
pub fn norm(a: &[f32]) -> f32 {
    a.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Return a unit-length copy of `a`. A zero vector is returned unchanged.
pub fn normalize(a: &[f32]) -> Vec<f32> {
    let n = norm(a);
    if n == 0.0 {
        return a.to_vec();
    }
    a.iter().map(|x| x / n).collect()
}

/// Cosine similarity in [-1, 1].
///
/// Scale-invariant; any comparison involving a zero-magnitude vector is
/// defined as exactly 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, MathError> {
    check_dims(a, b)?;

    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let sim = dot(a, b)? / (norm_a * norm_b);
    // Floating-point rounding can push the ratio just past the unit interval
    Ok(sim.clamp(-1.0, 1.0))
}

/// Arithmetic mean of a non-empty set of equal-length vectors
pub fn mean(vectors: &[Vec<f32>]) -> Result<Vec<f32>, MathError> {
    let first = vectors.first().ok_or(MathError::EmptyInput)?;
    let dim = first.len();

    let mut sum = vec![0.0f64; dim];
    for v in vectors {
        if v.len() != dim {
            return Err(MathError::DimensionMismatch {
                expected: dim,
                actual: v.len(),
            });
        }
        for (s, x) in sum.iter_mut().zip(v.iter()) {
            *s += f64::from(*x);
        }
    }

    let count = vectors.len() as f64;
    Ok(sum.iter().map(|s| (s / count) as f32).collect())
}

fn check_dims(a: &[f32], b: &[f32]) -> Result<(), MathError> {
    if a.len() != b.len() {
        return Err(MathError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}
