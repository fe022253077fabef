//! In-memory vector store with exact brute-force search.
//!
//! Vectors live in one contiguous row-major buffer; texts in a dense `Vec`
//! indexed by record id. Record `i` always has id `i`.

use ragvec_common::{RagVecError, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::types::{RecordId, RecordRef, SearchResult};

/// Squared Euclidean distance between two equal-length vectors.
///
/// This is the ranking metric used by [`VectorStore::search`]. Take the
/// square root for the true Euclidean distance.
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Append-only vector store
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStore {
    dimension: usize,
    data: Vec<f32>,
    texts: Vec<String>,
}

impl VectorStore {
    /// Create an empty store. Fails with `InvalidDimension` for dimension 0.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RagVecError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
            texts: Vec::new(),
        })
    }

    /// Rebuild a store from decoded image parts
    pub(crate) fn from_parts(dimension: usize, data: Vec<f32>, texts: Vec<String>) -> Result<Self> {
        if dimension == 0 {
            return Err(RagVecError::InvalidDimension(dimension));
        }
        if data.len() != texts.len() * dimension {
            return Err(RagVecError::internal(format!(
                "vector block holds {} floats, expected {} x {}",
                data.len(),
                texts.len(),
                dimension
            )));
        }
        Ok(Self {
            dimension,
            data,
            texts,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Largest accepted absolute component value.
    ///
    /// Bounded so that the squared distance between any two accepted
    /// vectors stays finite: each term is at most `f32::MAX / (4 * dim)`.
    pub fn max_component(&self) -> f32 {
        (f32::MAX / self.dimension as f32).sqrt() / 4.0
    }

    /// Row-major vector block (record `i` occupies `[i*dim, (i+1)*dim)`)
    pub fn vector_data(&self) -> &[f32] {
        &self.data
    }

    /// Texts in id order
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Append a record and return its id
    pub fn append(&mut self, vector: &[f32], text: impl Into<String>) -> Result<RecordId> {
        self.check_vector(vector)?;

        let id = self.texts.len() as RecordId;
        self.data.extend_from_slice(vector);
        self.texts.push(text.into());
        Ok(id)
    }

    /// Look up a record by id
    pub fn get(&self, id: RecordId) -> Option<RecordRef<'_>> {
        let idx = usize::try_from(id).ok()?;
        let text = self.texts.get(idx)?;
        let start = idx * self.dimension;
        Some(RecordRef {
            id,
            vector: &self.data[start..start + self.dimension],
            text,
        })
    }

    /// Iterate records in id order
    pub fn iter(&self) -> impl Iterator<Item = RecordRef<'_>> {
        self.data
            .chunks_exact(self.dimension)
            .zip(&self.texts)
            .enumerate()
            .map(|(i, (vector, text))| RecordRef {
                id: i as RecordId,
                vector,
                text,
            })
    }

    /// Exact k-nearest-neighbor search.
    ///
    /// Returns at most `k` results ordered by ascending squared Euclidean
    /// distance; equal distances are ordered by ascending id. A store with
    /// fewer than `k` records returns all of them.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(RagVecError::invalid_argument("k must be a positive integer"));
        }
        self.check_vector(query)?;

        // Max-heap of the best k seen so far; the root is the current worst.
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k.min(self.len()) + 1);
        for (idx, vector) in self.data.chunks_exact(self.dimension).enumerate() {
            let candidate = Candidate {
                distance: squared_euclidean(query, vector),
                idx,
            };
            if heap.len() < k {
                heap.push(candidate);
            } else if let Some(mut worst) = heap.peek_mut() {
                if candidate < *worst {
                    *worst = candidate;
                }
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| SearchResult::new(c.idx as RecordId, self.texts[c.idx].clone(), c.distance))
            .collect())
    }

    /// Drop every record at or after `len`. Used to undo an unpersisted append.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.texts.truncate(len);
        self.data.truncate(len * self.dimension);
    }

    fn check_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(RagVecError::dimension_mismatch(self.dimension, vector.len()));
        }
        if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
            return Err(RagVecError::invalid_argument(format!(
                "vector component {} is not finite",
                pos
            )));
        }
        let limit = self.max_component();
        if let Some(pos) = vector.iter().position(|v| v.abs() > limit) {
            return Err(RagVecError::invalid_argument(format!(
                "vector component {} exceeds the magnitude limit {:e}",
                pos, limit
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    idx: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.idx.cmp(&other.idx))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}
