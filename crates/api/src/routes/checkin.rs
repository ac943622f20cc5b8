//! Manual check-in triggers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{info, Instrument};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::{EmployeeResult, RunReport, Trigger};

/// Start a whole-roster run in the background.
///
/// POST /api/checkin/run
pub async fn run_all(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let runner = Arc::clone(&state.runner);
    let span = tracing::info_span!("manual_run");

    tokio::spawn(
        async move {
            match runner.run(Trigger::Manual).await {
                RunReport::Completed(summary) => info!("Manual run finished: {}", summary),
                RunReport::NoUsers => info!("Manual run found no employees"),
                RunReport::Skipped(reason) => info!(reason = %reason, "Manual run skipped"),
            }
        }
        .instrument(span),
    );

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "success": true,
            "message": "Check-in run started"
        })),
    )
}

/// Check in one employee and wait for the outcome.
///
/// The attempt runs on its own task so a dropped connection cannot abort
/// it halfway; the browser is still closed and the outcome still logged.
///
/// POST /api/checkin/:nip
pub async fn run_single(
    State(state): State<AppState>,
    Path(nip): Path<String>,
) -> Result<Json<EmployeeResult>, ApiError> {
    let runner = Arc::clone(&state.runner);
    let span = tracing::info_span!("manual_single", nip = %nip);
    let attempt = tokio::spawn(async move { runner.run_one(&nip).await }.instrument(span));

    let result = attempt
        .await
        .map_err(|e| ApiError::Internal(format!("Check-in task failed: {}", e)))??;
    Ok(Json(result))
}
