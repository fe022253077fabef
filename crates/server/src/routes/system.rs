use actix_web::{get, web, HttpResponse};
use ragvec_common::RagVecError;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{HealthResponse, RecordResponse, StatsResponse};

#[get("/health")]
pub async fn health(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        started_at: state.started_at,
    })
}

#[get("/stats")]
pub async fn stats(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let stats = state.index.stats().await;

    HttpResponse::Ok().json(StatsResponse {
        total_vectors: stats.total_vectors,
        dimension: stats.dimension,
        embedding_model: state.embedder.model().to_string(),
    })
}

/// Fetch one stored record by id
#[get("/records/{id}")]
pub async fn get_record(
    path: web::Path<u64>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let record = state
        .index
        .get(id)
        .await
        .ok_or_else(|| RagVecError::not_found(format!("record {}", id)))?;

    Ok(HttpResponse::Ok().json(RecordResponse {
        index: record.id,
        text: record.text,
        vector: record.vector,
    }))
}
