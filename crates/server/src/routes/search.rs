use actix_web::{post, web, HttpResponse};
use std::sync::Arc;

use crate::error::ApiError;
use crate::routes::{require_text, resolve_k};
use crate::state::AppState;
use crate::types::{SearchRequest, SearchResponse, SearchResultItem, VectorSearchRequest};

/// Embed the query text and return the k nearest stored texts
#[post("/search")]
pub async fn search(
    req: web::Json<SearchRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let text = require_text(req.text.as_deref())?;
    let k = resolve_k(req.k, state.config.default_top_k)?;

    let query = state.embedder.embed(text).await?;
    let results = state.index.search(&query, k).await?;

    Ok(HttpResponse::Ok().json(SearchResponse {
        results: results.into_iter().map(SearchResultItem::from).collect(),
    }))
}

/// Search with a precomputed query embedding
#[post("/vectors/search")]
pub async fn search_vector(
    req: web::Json<VectorSearchRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let k = resolve_k(req.k, state.config.default_top_k)?;
    let results = state.index.search(&req.vector, k).await?;

    Ok(HttpResponse::Ok().json(SearchResponse {
        results: results.into_iter().map(SearchResultItem::from).collect(),
    }))
}
