//! Fixed-width embedding math.

use thiserror::Error;

/// Failure modes of vector operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VectorError {
    /// One operand has zero magnitude, so the angle is undefined.
    #[error("cosine similarity is undefined for a zero-magnitude vector")]
    Degenerate,

    #[error("vector length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// Component-wise mean of `vectors`.
///
/// Returns `None` for an empty input, never a zero vector standing in for a
/// real average. All vectors must share the width of the first one.
pub fn average<V: AsRef<[f32]>>(vectors: &[V]) -> Result<Option<Vec<f32>>, VectorError> {
    let Some(first) = vectors.first() else {
        return Ok(None);
    };
    let dims = first.as_ref().len();
    let mut sum = vec![0.0f64; dims];

    for vector in vectors {
        let vector = vector.as_ref();
        if vector.len() != dims {
            return Err(VectorError::LengthMismatch {
                left: dims,
                right: vector.len(),
            });
        }
        for (acc, value) in sum.iter_mut().zip(vector) {
            *acc += f64::from(*value);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let count = vectors.len() as f64;
    #[allow(clippy::cast_possible_truncation)]
    Ok(Some(sum.into_iter().map(|acc| (acc / count) as f32).collect()))
}

/// Euclidean norm.
pub fn magnitude(vector: &[f32]) -> f64 {
    vector
        .iter()
        .map(|value| f64::from(*value) * f64::from(*value))
        .sum::<f64>()
        .sqrt()
}

/// Cosine of the angle between `a` and `b`, clamped to `[-1, 1]`.
///
/// A zero-magnitude operand is reported as [`VectorError::Degenerate`] rather
/// than a similarity of zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let norm_a = magnitude(a);
    let norm_b = magnitude(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(VectorError::Degenerate);
    }

    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}
