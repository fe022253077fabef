use actix_web::{post, web, HttpResponse};
use std::sync::Arc;

use crate::error::ApiError;
use crate::routes::require_text;
use crate::state::AppState;
use crate::types::{AddRequest, AddResponse, VectorAddRequest};

/// Embed text and append it to the index
#[post("/add")]
pub async fn add_text(
    req: web::Json<AddRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let text = require_text(req.text.as_deref())?;

    // embedding failures return before the index is touched
    let vector = state.embedder.embed(text).await?;
    let total_vectors = state.index.add(text, &vector).await?;

    Ok(HttpResponse::Ok().json(AddResponse {
        status: "success".to_string(),
        total_vectors,
    }))
}

/// Append a precomputed embedding
#[post("/vectors/add")]
pub async fn add_vector(
    req: web::Json<VectorAddRequest>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let text = require_text(req.text.as_deref())?;
    let total_vectors = state.index.add(text, &req.vector).await?;

    Ok(HttpResponse::Ok().json(AddResponse {
        status: "success".to_string(),
        total_vectors,
    }))
}
