//! Notification Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Notification, NotificationCreate};
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "notification";

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist one notification row
    pub async fn create(&self, data: NotificationCreate) -> RepoResult<Notification> {
        let notification = Notification {
            id: None,
            recipient: data.recipient,
            kind: data.kind,
            title: data.title,
            message: data.message,
            data: data.data,
            link: data.link,
            read_at: None,
            created_at: now_millis(),
        };
        let created: Option<Notification> =
            self.base.db().create(TABLE).content(notification).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create notification".to_string()))
    }

    /// Find notification by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Notification>> {
        let thing = parse_record_id(id, TABLE)?;
        let notification: Option<Notification> = self.base.db().select(thing).await?;
        Ok(notification)
    }

    /// A recipient's notifications, newest first
    pub async fn find_by_recipient(
        &self,
        recipient: &RecordId,
        limit: i64,
    ) -> RepoResult<Vec<Notification>> {
        let rows: Vec<Notification> = self
            .base
            .db()
            .query("SELECT * FROM notification WHERE recipient = $recipient ORDER BY created_at DESC LIMIT $limit")
            .bind(("recipient", recipient.clone()))
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(rows)
    }

    /// Count of unread notifications for a recipient
    pub async fn unread_count(&self, recipient: &RecordId) -> RepoResult<usize> {
        let ids: Vec<String> = self
            .base
            .db()
            .query("SELECT VALUE <string>id FROM notification WHERE recipient = $recipient AND read_at = NONE")
            .bind(("recipient", recipient.clone()))
            .await?
            .take(0)?;
        Ok(ids.len())
    }

    /// Mark one notification read
    pub async fn mark_read(&self, id: &RecordId) -> RepoResult<Notification> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET read_at = $now RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("now", now_millis()))
            .await?;
        let updated: Vec<Notification> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Notification {} not found", id)))
    }

    /// Mark all of a recipient's unread notifications read
    pub async fn mark_all_read(&self, recipient: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE notification SET read_at = $now WHERE recipient = $recipient AND read_at = NONE")
            .bind(("recipient", recipient.clone()))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Delete one notification
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", id.clone()))
            .await?;
        Ok(())
    }

    /// Delete all of a recipient's notifications
    pub async fn clear_all(&self, recipient: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE notification WHERE recipient = $recipient")
            .bind(("recipient", recipient.clone()))
            .await?;
        Ok(())
    }
}
