//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role gating.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::Role;

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// Authentication middleware - requires a logged-in user
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`,
/// then injects [`CurrentUser`] into request extensions.
///
/// # Paths that skip authentication
///
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths
/// - `/api/auth/login`
/// - `/api/health`
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public_api_route = path == "/api/auth/login" || path == "/api/health";
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.jwt_service.clone();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => {
            JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?
        }
        None => {
            tracing::warn!(target: "security", uri = %req.uri(), "Missing authorization header");
            return Err(AppError::unauthorized());
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims).map_err(|_| AppError::InvalidToken)?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(target: "security", error = %e, uri = %req.uri(), "Token validation failed");
            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token()),
            }
        }
    }
}

/// Role gate middleware - requires one of the given roles
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .route("/api/kitchen/orders", get(handler::queue))
///     .layer(middleware::from_fn(require_role(&[Role::Kitchen])));
/// ```
///
/// # Errors
///
/// 403 Forbidden when the authenticated user holds none of the roles.
/// Owners pass every gate.
pub fn require_role(
    allowed: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::Unauthorized)?;

            if user.role != Role::Owner && !allowed.contains(&user.role) {
                tracing::warn!(
                    target: "security",
                    user_id = %user.id,
                    username = %user.username,
                    role = %user.role,
                    "Role gate rejected request"
                );
                return Err(AppError::forbidden(format!(
                    "Role '{}' may not perform this action",
                    user.role
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Extension trait to pull the CurrentUser out of a request
pub trait CurrentUserExt {
    /// # Errors
    ///
    /// 401 Unauthorized when no user was injected
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or(AppError::Unauthorized)
    }
}
