//! Notification Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Notification;
use crate::db::repository::{NotificationRepository, parse_record_id};
use crate::utils::{AppError, AppResult};

fn recipient_record(user: &CurrentUser) -> AppResult<RecordId> {
    parse_record_id(&user.id, "employee")
        .map_err(|_| AppError::validation(format!("Invalid user id: {}", user.id)))
}

/// Load a notification and verify the caller owns it
async fn load_owned(
    repo: &NotificationRepository,
    user: &CurrentUser,
    id: &str,
) -> AppResult<(Notification, RecordId)> {
    let notification = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Notification {} not found", id)))?;
    if notification.recipient.to_string() != user.id {
        return Err(AppError::forbidden("Not your notification"));
    }
    let rec = notification
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Notification without id"))?;
    Ok((notification, rec))
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

/// GET /api/notifications
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<NotificationListResponse>> {
    let repo = NotificationRepository::new(state.db.clone());
    let recipient = recipient_record(&user)?;
    Ok(Json(NotificationListResponse {
        notifications: repo.find_by_recipient(&recipient, 50).await?,
        unread_count: repo.unread_count(&recipient).await?,
    }))
}

/// GET /api/notifications/recent
pub async fn recent(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Notification>>> {
    let repo = NotificationRepository::new(state.db.clone());
    let recipient = recipient_record(&user)?;
    Ok(Json(repo.find_by_recipient(&recipient, 10).await?))
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: usize,
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UnreadCountResponse>> {
    let repo = NotificationRepository::new(state.db.clone());
    let recipient = recipient_record(&user)?;
    Ok(Json(UnreadCountResponse {
        unread_count: repo.unread_count(&recipient).await?,
    }))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Notification>> {
    let repo = NotificationRepository::new(state.db.clone());
    let (_, rec) = load_owned(&repo, &user, &id).await?;
    Ok(Json(repo.mark_read(&rec).await?))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<bool>> {
    let repo = NotificationRepository::new(state.db.clone());
    let recipient = recipient_record(&user)?;
    repo.mark_all_read(&recipient).await?;
    Ok(Json(true))
}

/// DELETE /api/notifications/{id}
pub async fn delete_one(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = NotificationRepository::new(state.db.clone());
    let (_, rec) = load_owned(&repo, &user, &id).await?;
    repo.delete(&rec).await?;
    Ok(Json(true))
}

/// DELETE /api/notifications - clear the caller's feed
pub async fn clear_all(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<bool>> {
    let repo = NotificationRepository::new(state.db.clone());
    let recipient = recipient_record(&user)?;
    repo.clear_all(&recipient).await?;
    Ok(Json(true))
}
