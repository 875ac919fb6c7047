//! Notification repository

use crate::domain::{CreateNotificationInput, Notification, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Create a notification record
    async fn create(&self, input: &CreateNotificationInput) -> Result<Notification>;

    /// Find a notification by id
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Notification>>;

    /// List notifications for a recipient, newest first
    async fn list_by_recipient(
        &self,
        recipient_id: StringUuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Notification>>;

    /// Count notifications for a recipient
    async fn count_by_recipient(&self, recipient_id: StringUuid) -> Result<i64>;

    /// Mark a notification as read
    async fn mark_read(&self, id: StringUuid) -> Result<Notification>;
}

pub struct NotificationRepositoryImpl {
    pool: MySqlPool,
}

impl NotificationRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for NotificationRepositoryImpl {
    async fn create(&self, input: &CreateNotificationInput) -> Result<Notification> {
        let id = StringUuid::new_v4();
        let data = serde_json::to_string(&input.data)
            .map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO notifications
                (id, recipient_id, business_id, notification_type, title, message,
                 data, requires_action, action_taken, is_read, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(input.recipient_id)
        .bind(input.business_id)
        .bind(input.notification_type.to_string())
        .bind(&input.title)
        .bind(&input.message)
        .bind(&data)
        .bind(input.requires_action)
        .bind(input.action_taken)
        .bind(input.is_read)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create notification")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_id, business_id, notification_type, title, message,
                   data, requires_action, action_taken, is_read, created_at, updated_at
            FROM notifications
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn list_by_recipient(
        &self,
        recipient_id: StringUuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_id, business_id, notification_type, title, message,
                   data, requires_action, action_taken, is_read, created_at, updated_at
            FROM notifications
            WHERE recipient_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(recipient_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    async fn count_by_recipient(&self, recipient_id: StringUuid) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE recipient_id = ?")
                .bind(recipient_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn mark_read(&self, id: StringUuid) -> Result<Notification> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))
    }
}
