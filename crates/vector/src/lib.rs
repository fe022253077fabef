//! ragvec vector index
//!
//! Exact nearest-neighbor search over an append-only, durably persisted
//! store of (vector, text) records.

pub mod persistence;
mod service;
mod store;
mod types;

pub use service::IndexService;
pub use store::{squared_euclidean, VectorStore};
pub use types::{IndexStats, Record, RecordId, RecordRef, SearchResult};
