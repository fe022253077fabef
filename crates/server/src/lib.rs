//! ragvec HTTP server
//!
//! Actix-web REST layer over the persistent vector index

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use ragvec_common::{AppConfig, RagVecError, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use error::ApiError;
pub use routes::configure;
pub use state::AppState;

/// Request bodies carry full embeddings, so allow more than actix's default
const JSON_LIMIT_BYTES: usize = 8 * 1024 * 1024;

/// JSON extractor config: malformed bodies become `InvalidArgument` errors
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            ApiError(RagVecError::invalid_argument(format!("Malformed JSON body: {}", err))).into()
        })
}

/// Open the index and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let state = Arc::new(AppState::new(config).await?);

    info!(
        "Serving {} vectors (dimension {}, model {}) on http://{}",
        state.index.len().await,
        state.embedder.dimension(),
        state.embedder.model(),
        bind_addr
    );

    let data = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(data.clone())
            .app_data(json_config())
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
