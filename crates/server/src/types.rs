use chrono::{DateTime, Utc};
use ragvec_vector::SearchResult;
use serde::{Deserialize, Serialize};

/// `POST /add` request
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    /// Text to embed and store
    pub text: Option<String>,
}

/// `POST /add` and `POST /vectors/add` response
#[derive(Debug, Serialize, Deserialize)]
pub struct AddResponse {
    pub status: String,
    pub total_vectors: usize,
}

/// `POST /search` request
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Query text
    pub text: Option<String>,

    /// Number of neighbours (server default when omitted)
    pub k: Option<i64>,
}

/// `POST /vectors/add` request
#[derive(Debug, Deserialize)]
pub struct VectorAddRequest {
    /// Text stored alongside the vector
    pub text: Option<String>,

    /// Precomputed embedding
    pub vector: Vec<f32>,
}

/// `POST /vectors/search` request
#[derive(Debug, Deserialize)]
pub struct VectorSearchRequest {
    /// Precomputed query embedding
    pub vector: Vec<f32>,

    pub k: Option<i64>,
}

/// One ranked hit
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub text: String,

    /// Squared Euclidean distance. Always finite: vectors with components
    /// beyond the store's magnitude limit are rejected on add and search.
    pub distance: f32,

    /// Record id
    pub index: u64,
}

impl From<SearchResult> for SearchResultItem {
    fn from(r: SearchResult) -> Self {
        Self {
            text: r.text,
            distance: r.distance,
            index: r.id,
        }
    }
}

/// Search response
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
}

/// `GET /records/{id}` response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub index: u64,
    pub text: String,
    pub vector: Vec<f32>,
}

/// `GET /stats` response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_vectors: usize,
    pub dimension: usize,
    pub embedding_model: String,
}

/// `GET /health` response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub started_at: DateTime<Utc>,
}
