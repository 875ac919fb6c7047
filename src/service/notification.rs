//! Notification fan-out for enrollment decisions

use crate::domain::{
    CreateNotificationInput, EnrollmentRequest, Notification, NotificationType, StringUuid,
};
use crate::error::Result;
use crate::repository::NotificationRepository;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Service for creating and reading notification records
pub struct NotificationService<N: NotificationRepository> {
    notification_repo: Arc<N>,
}

impl<N: NotificationRepository> NotificationService<N> {
    pub fn new(notification_repo: Arc<N>) -> Self {
        Self { notification_repo }
    }

    /// Create a notification record
    pub async fn create(&self, input: CreateNotificationInput) -> Result<Notification> {
        input.validate()?;
        let notification = self.notification_repo.create(&input).await?;
        metrics::counter!("perks_notifications_created_total").increment(1);
        Ok(notification)
    }

    /// Notify the customer about the decision on their enrollment request
    pub async fn notify_customer_decision(
        &self,
        request: &EnrollmentRequest,
        approved: bool,
        card_id: Option<StringUuid>,
    ) -> Result<Notification> {
        let (notification_type, title, message) = if approved {
            (
                NotificationType::EnrollmentAccepted,
                "Enrollment approved".to_string(),
                format!(
                    "Your enrollment in {} at {} was approved. Your loyalty card is ready.",
                    request.program_name, request.business_name
                ),
            )
        } else {
            (
                NotificationType::EnrollmentRejected,
                "Enrollment declined".to_string(),
                format!(
                    "Your enrollment in {} at {} was declined.",
                    request.program_name, request.business_name
                ),
            )
        };

        self.create(CreateNotificationInput {
            recipient_id: request.customer_id,
            business_id: request.business_id,
            notification_type,
            title,
            message,
            data: decision_payload(request, card_id),
            requires_action: false,
            action_taken: false,
            is_read: false,
        })
        .await
    }

    /// Notify the business about the decision on one of its invitations
    pub async fn notify_business_decision(
        &self,
        request: &EnrollmentRequest,
        approved: bool,
        card_id: Option<StringUuid>,
    ) -> Result<Notification> {
        let (notification_type, title, message) = if approved {
            (
                NotificationType::EnrollmentAccepted,
                "Customer enrollment approved".to_string(),
                format!("A customer joined {}.", request.program_name),
            )
        } else {
            (
                NotificationType::EnrollmentRejected,
                "Customer enrollment declined".to_string(),
                format!("A customer declined the invitation to {}.", request.program_name),
            )
        };

        self.create(CreateNotificationInput {
            recipient_id: request.business_id,
            business_id: request.business_id,
            notification_type,
            title,
            message,
            data: decision_payload(request, card_id),
            requires_action: false,
            action_taken: false,
            is_read: false,
        })
        .await
    }

    /// List notifications for a recipient with pagination
    pub async fn list_for_recipient(
        &self,
        recipient_id: StringUuid,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Notification>, i64)> {
        let offset = (page - 1) * per_page;
        let notifications = self
            .notification_repo
            .list_by_recipient(recipient_id, offset, per_page)
            .await?;
        let total = self.notification_repo.count_by_recipient(recipient_id).await?;

        Ok((notifications, total))
    }

    /// Mark a notification as read
    pub async fn mark_read(&self, id: StringUuid) -> Result<Notification> {
        self.notification_repo.mark_read(id).await
    }
}

fn decision_payload(request: &EnrollmentRequest, card_id: Option<StringUuid>) -> serde_json::Value {
    let mut payload = json!({
        "request_id": request.id,
        "program_id": request.program_id,
        "program_name": request.program_name,
    });
    if let Some(card_id) = card_id {
        payload["card_id"] = json!(card_id);
    }
    payload
}
