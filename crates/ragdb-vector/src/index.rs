//! Exact (brute-force) vector index.
//!
//! Vectors are stored row-major in one contiguous buffer; the id of a vector
//! is its row number. The index never normalises: inner product equals cosine
//! similarity only when callers store and query unit vectors.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Range;

use ragdb_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    InnerProduct,
}

impl Metric {
    #[inline]
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::InnerProduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dim: usize,
    metric: Metric,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("index dimension must be positive".into()));
        }
        Ok(Self { dim, metric: Metric::InnerProduct, data: Vec::new() })
    }

    /// Rebuild an index from its raw row-major buffer.
    pub fn from_raw(dim: usize, metric: Metric, data: Vec<f32>) -> Result<Self> {
        if dim == 0 || data.len() % dim != 0 {
            return Err(Error::InvalidConfig(format!(
                "buffer of {} floats is not a whole number of {}-d rows",
                data.len(),
                dim
            )));
        }
        Ok(Self { dim, metric, data })
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn metric(&self) -> Metric { self.metric }

    pub fn len(&self) -> usize { self.data.len() / self.dim }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    pub fn as_slice(&self) -> &[f32] { &self.data }

    pub fn vector(&self, id: usize) -> Option<&[f32]> {
        let start = id.checked_mul(self.dim)?;
        let end = start.checked_add(self.dim)?;
        self.data.get(start..end)
    }

    /// Append vectors in order and return the id range they received.
    ///
    /// Every vector is checked before the buffer is touched, so a
    /// `DimensionMismatch` leaves the index unchanged.
    pub fn append(&mut self, vectors: &[Vec<f32>]) -> Result<Range<usize>> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: bad.len() });
        }
        let start = self.len();
        self.data.reserve(vectors.len() * self.dim);
        for v in vectors {
            self.data.extend_from_slice(v);
        }
        Ok(start..self.len())
    }

    /// Exact top-`k` search, best first, as `(id, score)` pairs.
    ///
    /// Returns at most `min(k, len)` hits. Equal scores are ordered by
    /// ascending id, so repeated queries against the same state agree.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .map(|row| self.metric.score(row, query))
            .enumerate()
            .collect();
        let k = k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank);
            scored.truncate(k);
        }
        scored.sort_unstable_by(rank);
        Ok(scored)
    }

    /// Drop every vector; ids restart at 0. The dimension is kept.
    pub fn reset(&mut self) {
        self.data = Vec::new();
    }
}

/// Best-first ordering: higher score, then lower id. NaN ranks last.
fn rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    let key = |s: f32| if s.is_nan() { f32::NEG_INFINITY } else { s };
    key(b.1).total_cmp(&key(a.1)).then(a.0.cmp(&b.0))
}
