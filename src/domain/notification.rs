//! Notification domain types

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    EnrollmentAccepted,
    EnrollmentRejected,
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ENROLLMENT_ACCEPTED" => Ok(Self::EnrollmentAccepted),
            "ENROLLMENT_REJECTED" => Ok(Self::EnrollmentRejected),
            _ => Err(format!("Unknown notification type: {}", s)),
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnrollmentAccepted => write!(f, "ENROLLMENT_ACCEPTED"),
            Self::EnrollmentRejected => write!(f, "ENROLLMENT_REJECTED"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for NotificationType {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for NotificationType {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for NotificationType {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = self.to_string();
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s.as_str(), buf)
    }
}

/// Notification entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: StringUuid,
    pub recipient_id: StringUuid,
    pub business_id: StringUuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    /// Structured payload (program id/name, card id, request id)
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub requires_action: bool,
    pub action_taken: bool,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Notification {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: StringUuid::new_v4(),
            recipient_id: StringUuid::new_v4(),
            business_id: StringUuid::new_v4(),
            notification_type: NotificationType::EnrollmentAccepted,
            title: String::new(),
            message: String::new(),
            data: serde_json::Value::Null,
            requires_action: false,
            action_taken: false,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a notification record
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNotificationInput {
    pub recipient_id: StringUuid,
    pub business_id: StringUuid,
    pub notification_type: NotificationType,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 2000))]
    pub message: String,

    #[serde(default)]
    pub data: serde_json::Value,

    #[serde(default)]
    pub requires_action: bool,

    #[serde(default)]
    pub action_taken: bool,

    #[serde(default)]
    pub is_read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CreateNotificationInput {
        CreateNotificationInput {
            recipient_id: StringUuid::new_v4(),
            business_id: StringUuid::new_v4(),
            notification_type: NotificationType::EnrollmentAccepted,
            title: "Enrollment approved".to_string(),
            message: "You joined the program".to_string(),
            data: serde_json::Value::Null,
            requires_action: false,
            action_taken: false,
            is_read: false,
        }
    }

    #[test]
    fn test_notification_type_serialization() {
        let json = serde_json::to_string(&NotificationType::EnrollmentAccepted).unwrap();
        assert_eq!(json, "\"ENROLLMENT_ACCEPTED\"");

        let parsed: NotificationType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, NotificationType::EnrollmentAccepted);
    }

    #[test]
    fn test_notification_type_from_str() {
        assert_eq!(
            "ENROLLMENT_REJECTED".parse::<NotificationType>().unwrap(),
            NotificationType::EnrollmentRejected
        );
        assert!("ENROLLMENT_UNKNOWN".parse::<NotificationType>().is_err());
    }

    #[test]
    fn test_notification_flags_default_false() {
        let notification = Notification::default();
        assert!(!notification.requires_action);
        assert!(!notification.action_taken);
        assert!(!notification.is_read);
    }

    #[test]
    fn test_create_input_validation() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_create_input_empty_title_fails() {
        let input = CreateNotificationInput {
            title: String::new(),
            ..valid_input()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_input_oversized_message_fails() {
        let input = CreateNotificationInput {
            message: "x".repeat(2001),
            ..valid_input()
        };
        assert!(input.validate().is_err());
    }
}
