//! Roster endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{Employee, UpsertEmployeeRequest};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: usize,
}

/// GET /api/employees
pub async fn list_employees(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.store.employees.list().await)
}

/// Add an employee, or update the one with the same NIP.
///
/// POST /api/employees
pub async fn upsert_employee(
    State(state): State<AppState>,
    Json(request): Json<UpsertEmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    request.validate()?;
    if request.nip.trim().is_empty() {
        return Err(ApiError::Validation("NIP must not be blank".to_string()));
    }

    let (employee, created) = state.store.employees.upsert(request).await?;
    info!(nip = %employee.nip, created, "Employee saved");

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(employee)))
}

/// DELETE /api/employees/:nip
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(nip): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !state.store.employees.delete(&nip).await? {
        return Err(ApiError::NotFound(format!("Employee {} not found", nip)));
    }
    info!(nip = %nip, "Employee deleted");
    Ok(Json(DeleteResponse {
        success: true,
        deleted: 1,
    }))
}

/// DELETE /api/employees
pub async fn delete_all_employees(State(state): State<AppState>) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.store.employees.delete_all().await?;
    info!(deleted, "Roster cleared");
    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

/// Flip the enabled flag.
///
/// POST /api/employees/:nip/toggle
pub async fn toggle_employee(
    State(state): State<AppState>,
    Path(nip): Path<String>,
) -> Result<Json<Employee>, ApiError> {
    let employee = state.store.employees.toggle(&nip).await?;
    info!(nip = %employee.nip, enabled = employee.enabled, "Employee toggled");
    Ok(Json(employee))
}
