//! Statement upload handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use biashara_core::{
    ingest::{parse_statement, SkippedRow},
    models::DEFAULT_SUBJECT_ID,
};

/// Upload result
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub success: bool,
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

/// POST /api/upload - Replace a subject's statement
///
/// Expects multipart form with:
/// - statement: CSV file (required, max 10MB)
/// - subject_id: Subject to import into (optional, defaults to 1)
pub async fn upload_statement(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut subject_id = DEFAULT_SUBJECT_ID;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "statement" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;

                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes.to_vec());
            }
            "subject_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read subject_id"))?;
                let value = value.trim();
                if !value.is_empty() {
                    subject_id = value.parse().map_err(|_| {
                        AppError::bad_request(&format!("Invalid subject_id: {}", value))
                    })?;
                }
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("No file uploaded"))?;

    if state.db.get_subject(subject_id).map_err(AppError::core)?.is_none() {
        return Err(AppError::not_found("Subject not found"));
    }

    let import = parse_statement(file_data.as_slice()).map_err(AppError::core)?;
    let skipped = import.skipped;

    let imported = state
        .pipeline
        .import_and_store(&state.db, subject_id, import.transactions)
        .await
        .map_err(AppError::core)?;

    info!(subject_id, imported, skipped = skipped.len(), "Statement uploaded");

    Ok(Json(UploadResponse {
        message: "Success".to_string(),
        success: true,
        imported,
        skipped,
    }))
}
