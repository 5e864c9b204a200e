//! Question answering endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::cache::CacheStats;
use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QaRequest, QaResponse};

/// POST /api/sessions/:filename/qa - Answer a question about a session
pub async fn ask_question(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    payload: std::result::Result<Json<QaRequest>, JsonRejection>,
) -> Result<Json<QaResponse>> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected Q&A body: {}", e);
        Error::validation("Invalid JSON")
    })?;

    tracing::info!("Question on {}: \"{}\"", filename, request.question.trim());
    Ok(Json(state.qa().answer(&filename, &request).await?))
}

/// POST /api/sessions/:filename/reindex - Drop and rebuild the chunk index
pub async fn reindex_session(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Value>> {
    let chunks = state.qa().reindex(&filename).await?;
    Ok(Json(json!({
        "filename": filename,
        "chunks": chunks,
        "status": "success"
    })))
}

/// GET /api/cache/stats - Answer cache statistics
pub async fn cache_stats(State(state): State<AppState>) -> Result<Json<CacheStats>> {
    Ok(Json(state.answer_cache().stats().await?))
}
