//! API routes for the proceedings server

pub mod qa;
pub mod sessions;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Sessions
        .route("/sessions", get(sessions::list_sessions))
        .route(
            "/sessions/upload",
            post(sessions::upload_session).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/sessions/:filename", get(sessions::session_detail))
        // Generated artifacts
        .route("/sessions/:filename/summary", get(sessions::get_summary))
        .route("/sessions/:filename/summary/refresh", post(sessions::refresh_summary))
        .route("/sessions/:filename/topics", get(sessions::get_topics))
        .route("/sessions/:filename/topics/refresh", post(sessions::refresh_topics))
        // Q&A
        .route("/sessions/:filename/qa", post(qa::ask_question))
        .route("/sessions/:filename/reindex", post(qa::reindex_session))
        .route("/cache/stats", get(qa::cache_stats))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "proceedings-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering, summaries and topics over parliamentary session PDFs",
        "endpoints": {
            "GET /api/sessions": "List sessions",
            "POST /api/sessions/upload": "Upload a session PDF (multipart field pdf_file)",
            "GET /api/sessions/:filename": "Session detail with rendered summary and topics",
            "GET /api/sessions/:filename/summary": "Summary artifact",
            "POST /api/sessions/:filename/summary/refresh": "Regenerate the summary",
            "GET /api/sessions/:filename/topics": "Legislative topics",
            "POST /api/sessions/:filename/topics/refresh": "Regenerate the topics",
            "POST /api/sessions/:filename/qa": "Ask a question about a session",
            "POST /api/sessions/:filename/reindex": "Rebuild the chunk index",
            "GET /api/cache/stats": "Answer cache statistics",
            "GET /media/pdf_documents/:filename": "Original PDF"
        },
        "features": {
            "lexical_retrieval": "Keyword-overlap ranking over cached chunks",
            "answer_caching": "Cached answers with a fixed time-to-live",
            "artifact_caching": "Summaries, topics and chunks cached as JSON files"
        }
    }))
}
