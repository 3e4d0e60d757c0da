//! Auth Handlers

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::EmployeeResponse;
use crate::db::repository::EmployeeRepository;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: EmployeeResponse,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let repo = EmployeeRepository::new(state.db.clone());
    let employee = repo
        .find_by_username(&payload.username)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !employee.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }
    let verified = employee
        .verify_password(&payload.password)
        .unwrap_or(false);
    if !verified {
        tracing::warn!(target: "security", username = %payload.username, "Login failed");
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(&employee)
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        token,
        user: employee.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: shared::Role,
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        role: user.role,
    })
}
