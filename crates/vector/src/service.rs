use ragvec_common::{RagVecError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, info, warn};

use crate::persistence;
use crate::store::VectorStore;
use crate::types::{IndexStats, Record, RecordId, SearchResult};

/// Persistent exact vector index.
///
/// Every acknowledged `add` has been written to the image on disk. The write
/// lock is held across the in-memory append and the save, so concurrent
/// searches see the store either before or after an add, never in between,
/// and saves never overlap.
pub struct IndexService {
    store: Arc<RwLock<VectorStore>>,
    index_path: PathBuf,
}

impl IndexService {
    /// Open the index image at `index_path`, creating an empty one with
    /// `dimension` if no image exists yet.
    ///
    /// A corrupt image is a hard error: the file is left untouched and the
    /// caller should refuse to start.
    pub async fn open(index_path: impl Into<PathBuf>, dimension: usize) -> Result<Self> {
        let index_path = index_path.into();

        let path = index_path.clone();
        let store = tokio::task::spawn_blocking(move || open_store(&path, dimension))
            .await
            .map_err(|e| RagVecError::internal(format!("index open task failed: {}", e)))??;

        info!(
            "Vector index ready - {} entries, dimension {}",
            store.len(),
            store.dimension()
        );

        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            index_path,
        })
    }

    /// Append `vector` with its `text` and persist. Returns the new total count.
    ///
    /// If the save fails the record is removed again and the error returned.
    ///
    /// The append, save and rollback run on their own task holding an owned
    /// write guard, so dropping the returned future does not stop them
    /// halfway: the record ends up either saved or rolled back.
    pub async fn add(&self, text: impl Into<String>, vector: &[f32]) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let path = self.index_path.clone();
        let text = text.into();
        let vector = vector.to_vec();

        tokio::spawn(async move {
            let guard = store.write_owned().await;
            append_and_save(guard, &vector, text, path).await
        })
        .await
        .map_err(|e| RagVecError::internal(format!("index add task failed: {}", e)))?
    }

    /// Exact k-nearest-neighbor search by squared Euclidean distance
    pub async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let store = self.store.read().await;
        debug!("Searching {} records (k={})", store.len(), k);
        store.search(query, k)
    }

    /// Fetch a stored record by id
    pub async fn get(&self, id: RecordId) -> Option<Record> {
        self.store.read().await.get(id).map(Record::from)
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub async fn dimension(&self) -> usize {
        self.store.read().await.dimension()
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Get index statistics
    pub async fn stats(&self) -> IndexStats {
        let store = self.store.read().await;
        IndexStats {
            total_vectors: store.len(),
            dimension: store.dimension(),
            index_path: self.index_path.clone(),
        }
    }
}

async fn append_and_save(
    mut store: OwnedRwLockWriteGuard<VectorStore>,
    vector: &[f32],
    text: String,
    path: PathBuf,
) -> Result<usize> {
    let previous_len = store.len();

    let id = store.append(vector, text)?;
    let encoded = match persistence::encode(&store) {
        Ok(bytes) => bytes,
        Err(e) => {
            store.truncate(previous_len);
            return Err(e);
        }
    };

    let saved = tokio::task::spawn_blocking(move || persistence::save_bytes(&encoded, &path))
        .await
        .map_err(|e| RagVecError::internal(format!("index save task failed: {}", e)))
        .and_then(|r| r);

    if let Err(e) = saved {
        warn!("Rolling back record {} - save failed: {}", id, e);
        store.truncate(previous_len);
        return Err(e);
    }

    info!("Record {} added to index (total {})", id, store.len());
    Ok(store.len())
}

fn open_store(path: &Path, dimension: usize) -> Result<VectorStore> {
    let removed = persistence::remove_stale_temps(path)?;
    if removed > 0 {
        warn!("Removed {} temporary image(s) from an interrupted save", removed);
    }

    match persistence::load(path)? {
        Some(store) => {
            if store.dimension() != dimension {
                return Err(RagVecError::dimension_mismatch(dimension, store.dimension()));
            }
            Ok(store)
        }
        None => {
            info!("Creating new vector index at {}", path.display());
            let store = VectorStore::new(dimension)?;
            persistence::save(&store, path)?;
            Ok(store)
        }
    }
}
