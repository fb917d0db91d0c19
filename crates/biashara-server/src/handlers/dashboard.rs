//! Dashboard handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use biashara_core::models::{CreditReport, DEFAULT_SUBJECT_ID};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub subject_id: Option<i64>,
}

/// GET /api/dashboard-data - Credit report for a subject
pub async fn dashboard_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<CreditReport>, AppError> {
    let subject_id = query.subject_id.unwrap_or(DEFAULT_SUBJECT_ID);

    if state.db.get_subject(subject_id).map_err(AppError::core)?.is_none() {
        return Err(AppError::not_found("Subject not found"));
    }

    let report = state
        .pipeline
        .report_for(&state.db, subject_id)
        .map_err(AppError::core)?;
    Ok(Json(report))
}
