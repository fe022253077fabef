use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use ragvec_common::RagVecError;
use serde::Serialize;

/// HTTP-facing wrapper around [`RagVecError`]
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub RagVecError);

/// JSON error body: `{"error": "...", "kind": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", self.0.kind(), self.0);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.0.kind(), self.0);
        }

        HttpResponse::build(status).json(ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
        })
    }
}
