//! Staff Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{EmployeeCreate, EmployeeResponse};
use crate::db::repository::EmployeeRepository;
use crate::utils::validation::validate_name;
use crate::utils::{AppError, AppResult};

/// GET /api/staff
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<EmployeeResponse>>> {
    let repo = EmployeeRepository::new(state.db.clone());
    let staff = repo
        .find_all()
        .await?
        .into_iter()
        .map(EmployeeResponse::from)
        .collect();
    Ok(Json(staff))
}

/// POST /api/staff
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<EmployeeResponse>> {
    validate_name(&payload.username, "username")?;
    if payload.password.len() < 8 {
        return Err(AppError::validation(
            "password must be at least 8 characters",
        ));
    }
    let repo = EmployeeRepository::new(state.db.clone());
    let employee = repo.create(payload).await?;
    Ok(Json(employee.into()))
}

/// PATCH /api/staff/{id}/toggle - flip the active flag
pub async fn toggle(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<EmployeeResponse>> {
    let repo = EmployeeRepository::new(state.db.clone());
    let employee = repo.toggle_active(&id).await?;
    Ok(Json(employee.into()))
}
