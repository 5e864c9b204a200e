//! Session listing, upload and generated artifacts

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::services::render_markdown;
use crate::types::{SessionDetail, SessionInfo, SummaryArtifact};

/// Multipart field carrying the uploaded PDF
const UPLOAD_FIELD: &str = "pdf_file";

/// GET /api/sessions - List session PDFs
pub async fn list_sessions(State(state): State<AppState>) -> Result<Json<Vec<SessionInfo>>> {
    let sessions = state
        .documents()
        .list()
        .await?
        .iter()
        .map(|filename| SessionInfo::from_filename(filename))
        .collect();
    Ok(Json(sessions))
}

/// POST /api/sessions/upload - Store an uploaded session PDF
pub async fn upload_session(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(base_name)
            .ok_or_else(|| Error::validation("Uploaded file has no filename"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::validation(format!("Failed to read file: {}", e)))?;

        tracing::info!("Uploading session {} ({} bytes)", filename, data.len());
        let stored = state.documents().save(&filename, &data).await?;

        // A reused name must not serve artifacts of earlier content
        state.invalidate_document(&stored).await?;

        let session = SessionInfo::from_filename(&stored);
        return Ok((
            StatusCode::CREATED,
            Json(json!({
                "filename": session.filename,
                "title": session.title,
                "url": session.url,
                "status": "success"
            })),
        ));
    }

    Err(Error::validation(format!("Missing '{}' file field", UPLOAD_FIELD)))
}

/// Last path component of a client-supplied filename
fn base_name(name: &str) -> String {
    name.rsplit(&['/', '\\'][..]).next().unwrap_or(name).trim().to_string()
}

/// GET /api/sessions/:filename - Session page data
///
/// Summary and topics are generated concurrently; a failure in one renders
/// as an error line instead of failing the page.
pub async fn session_detail(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<SessionDetail>> {
    if !state.documents().exists(&filename).await? {
        return Err(Error::not_found(format!("Session {} not found", filename)));
    }

    let (summary, topics) = futures::future::join(
        state.summarizer().get_or_generate(&filename),
        state.topics().get_or_generate(&filename),
    )
    .await;

    Ok(Json(SessionDetail {
        session: SessionInfo::from_filename(&filename),
        summary_html: rendered_or_error("summary", summary.map(|s| s.summary)),
        topics_html: rendered_or_error("topics", topics.map(|t| t.topics)),
    }))
}

fn rendered_or_error(name: &str, markdown: Result<String>) -> String {
    match markdown {
        Ok(markdown) => render_markdown(&markdown),
        Err(e) => {
            tracing::warn!("Error getting {}: {}", name, e);
            format!("Error loading {}.", name)
        }
    }
}

/// GET /api/sessions/:filename/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<SummaryArtifact>> {
    Ok(Json(state.summarizer().get_or_generate(&filename).await?))
}

/// POST /api/sessions/:filename/summary/refresh
pub async fn refresh_summary(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<SummaryArtifact>> {
    Ok(Json(state.summarizer().regenerate(&filename).await?))
}

/// GET /api/sessions/:filename/topics
pub async fn get_topics(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Value>> {
    let topics = state.topics().get_or_generate(&filename).await?;
    Ok(Json(json!({
        "topics": topics.topics,
        "status": "success"
    })))
}

/// POST /api/sessions/:filename/topics/refresh
pub async fn refresh_topics(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Value>> {
    let topics = state.topics().regenerate(&filename).await?;
    Ok(Json(json!({
        "topics": topics.topics,
        "generated_at": topics.generated_at,
        "sections_found": topics.sections_found,
        "status": "success"
    })))
}
