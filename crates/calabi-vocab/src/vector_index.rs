//! HNSW vector index over vocabulary terms
//!
//! Each vector is keyed by the index of its vocabulary entry. The index is
//! built once at startup and only searched afterwards, so it carries no
//! locking of its own.
//!
//! # HNSW Parameters
//!
//! - **M**: bi-directional links per node (16)
//! - **efConstruction**: candidate list size while building (200)
//! - **efSearch**: candidate list size while searching, chosen per query

use hnsw_rs::prelude::*;
use thiserror::Error;

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 200;
const MIN_CAPACITY: usize = 1_024;

/// Errors that can occur during vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Invalid embedding dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },
}

/// Nearest-neighbour index keyed by vocabulary entry index
pub struct VectorIndex {
    dimension: usize,
    hnsw: Hnsw<'static, f32, DistCosine>,
    len: usize,
}

impl VectorIndex {
    /// Create an index for `capacity` vectors of `dimension` floats
    pub fn new(dimension: usize, capacity: usize) -> Self {
        let max_elements = capacity.max(MIN_CAPACITY);
        let nb_layer = 16.min((max_elements as f32).ln().trunc() as usize);

        let hnsw = Hnsw::<'static, f32, DistCosine>::new(
            DEFAULT_M,
            max_elements,
            nb_layer,
            DEFAULT_EF_CONSTRUCTION,
            DistCosine {},
        );

        Self {
            dimension,
            hnsw,
            len: 0,
        }
    }

    /// Add the embedding of vocabulary entry `id`
    pub fn add(&mut self, id: usize, embedding: &[f32]) -> Result<(), VectorIndexError> {
        self.check_dimension(embedding)?;
        self.hnsw.insert_slice((embedding, id));
        self.len += 1;
        Ok(())
    }

    /// The `k` nearest entries to `query` as `(id, similarity)`, most similar first
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<(usize, f32)>, VectorIndexError> {
        self.check_dimension(query)?;
        if self.len == 0 || k == 0 {
            return Ok(Vec::new());
        }

        let mut results: Vec<(usize, f32)> = self
            .hnsw
            .search(query, k, ef_search.max(k))
            .into_iter()
            .map(|neighbour| (neighbour.d_id, 1.0 - neighbour.distance))
            .collect();
        results.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(results)
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing has been indexed
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, v: &[f32]) -> Result<(), VectorIndexError> {
        if v.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: v.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("dimension", &self.dimension)
            .field("len", &self.len)
            .finish()
    }
}
