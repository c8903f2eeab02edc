//! Background ingestion trigger.

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IngestAccepted {
    pub status: &'static str,
    pub message: String,
}

/// POST /ingest
///
/// Returns immediately. The outcome is only visible in the logs and through
/// `/health` once the store has chunks.
pub async fn trigger_ingest(State(state): State<AppState>) -> (StatusCode, Json<IngestAccepted>) {
    let dir = state.files_directory().to_path_buf();
    let ingestion = state.ingestion().clone();
    let message = format!("Ingestion of {} started in the background", dir.display());

    tokio::spawn(async move {
        match ingestion.ingest_directory(&dir).await {
            Ok(report) => tracing::info!(
                processed = report.processed,
                failed = report.failed.len(),
                chunks_added = report.chunks_added,
                "Background ingestion complete"
            ),
            Err(e) => tracing::error!("Background ingestion of {:?} failed: {}", dir, e),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(IngestAccepted {
            status: "accepted",
            message,
        }),
    )
}
