use serde::Serialize;
use std::path::PathBuf;

/// Record identifier: position in insertion order, starting at 0
pub type RecordId = u64;

/// Borrowed view of a stored record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordRef<'a> {
    pub id: RecordId,
    pub vector: &'a [f32],
    pub text: &'a str,
}

/// Owned copy of a stored record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub vector: Vec<f32>,
    pub text: String,
}

impl From<RecordRef<'_>> for Record {
    fn from(r: RecordRef<'_>) -> Self {
        Self {
            id: r.id,
            vector: r.vector.to_vec(),
            text: r.text.to_string(),
        }
    }
}

/// Search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Record id
    pub id: RecordId,

    /// Stored text
    pub text: String,

    /// Squared Euclidean distance to the query (no square root taken)
    pub distance: f32,
}

impl SearchResult {
    pub fn new(id: RecordId, text: String, distance: f32) -> Self {
        Self { id, text, distance }
    }
}

/// Index statistics
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub total_vectors: usize,
    pub dimension: usize,
    pub index_path: PathBuf,
}
