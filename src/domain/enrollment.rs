//! Enrollment request domain types

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Enrollment request status
///
/// Transitions are one-way and single-use: a request moves from `Pending`
/// to either `Approved` or `Rejected` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::str::FromStr for EnrollmentRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown enrollment request status: {}", s)),
        }
    }
}

impl std::fmt::Display for EnrollmentRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for EnrollmentRequestStatus {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for EnrollmentRequestStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for EnrollmentRequestStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = self.to_string();
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s.as_str(), buf)
    }
}

/// Enrollment request entity, denormalized with program and business
/// display names (the lookup joins them in).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EnrollmentRequest {
    pub id: StringUuid,
    pub customer_id: StringUuid,
    pub business_id: StringUuid,
    pub program_id: StringUuid,
    pub program_name: String,
    pub business_name: String,
    pub status: EnrollmentRequestStatus,
    /// Arbitrary payload attached by the invitation-issuing process
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EnrollmentRequest {
    pub fn is_pending(&self) -> bool {
        self.status == EnrollmentRequestStatus::Pending
    }
}

impl Default for EnrollmentRequest {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: StringUuid::new_v4(),
            customer_id: StringUuid::new_v4(),
            business_id: StringUuid::new_v4(),
            program_id: StringUuid::new_v4(),
            program_name: String::new(),
            business_name: String::new(),
            status: EnrollmentRequestStatus::default(),
            data: serde_json::Value::Null,
            responded_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for responding to an enrollment invitation
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RespondToEnrollmentInput {
    pub approved: bool,
}

/// Error codes surfaced in an [`EnrollmentDecisionOutcome`].
///
/// These are data carried back to the caller, never raised as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionErrorCode {
    RequestNotFound,
    AlreadyProcessed,
    CardCreationFailed,
    ApprovalProcessingError,
    RejectionProcessingError,
    ProcessingError,
}

impl std::fmt::Display for DecisionErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RequestNotFound => "REQUEST_NOT_FOUND",
            Self::AlreadyProcessed => "ALREADY_PROCESSED",
            Self::CardCreationFailed => "CARD_CREATION_FAILED",
            Self::ApprovalProcessingError => "APPROVAL_PROCESSING_ERROR",
            Self::RejectionProcessingError => "REJECTION_PROCESSING_ERROR",
            Self::ProcessingError => "PROCESSING_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Caller-facing result of the enrollment response workflow.
///
/// The workflow always returns one of these, it never propagates an error
/// to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDecisionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<StringUuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<DecisionErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_location: Option<String>,
}

impl EnrollmentDecisionOutcome {
    pub fn approved(card_id: StringUuid, program_name: &str) -> Self {
        Self {
            success: true,
            message: format!("Enrollment in {} approved", program_name),
            card_id: Some(card_id),
            error_code: None,
            error_location: None,
        }
    }

    pub fn rejected(program_name: &str) -> Self {
        Self {
            success: true,
            message: format!("Enrollment in {} declined", program_name),
            card_id: None,
            error_code: None,
            error_location: None,
        }
    }

    pub fn failure(
        code: DecisionErrorCode,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            card_id: None,
            error_code: Some(code),
            error_location: Some(location.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_status_default() {
        assert_eq!(
            EnrollmentRequestStatus::default(),
            EnrollmentRequestStatus::Pending
        );
    }

    #[test]
    fn test_request_status_from_str() {
        assert_eq!(
            "pending".parse::<EnrollmentRequestStatus>().unwrap(),
            EnrollmentRequestStatus::Pending
        );
        assert_eq!(
            "APPROVED".parse::<EnrollmentRequestStatus>().unwrap(),
            EnrollmentRequestStatus::Approved
        );
        assert_eq!(
            "rejected".parse::<EnrollmentRequestStatus>().unwrap(),
            EnrollmentRequestStatus::Rejected
        );
        assert!("invalid".parse::<EnrollmentRequestStatus>().is_err());
    }

    #[test]
    fn test_request_status_display() {
        assert_eq!(format!("{}", EnrollmentRequestStatus::Pending), "pending");
        assert_eq!(format!("{}", EnrollmentRequestStatus::Approved), "approved");
        assert_eq!(format!("{}", EnrollmentRequestStatus::Rejected), "rejected");
    }

    #[test]
    fn test_request_is_pending() {
        let request = EnrollmentRequest::default();
        assert!(request.is_pending());

        let request = EnrollmentRequest {
            status: EnrollmentRequestStatus::Approved,
            ..Default::default()
        };
        assert!(!request.is_pending());
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&DecisionErrorCode::AlreadyProcessed).unwrap();
        assert_eq!(json, "\"ALREADY_PROCESSED\"");

        let json = serde_json::to_string(&DecisionErrorCode::CardCreationFailed).unwrap();
        assert_eq!(json, "\"CARD_CREATION_FAILED\"");
    }

    #[test]
    fn test_error_code_display_matches_serialization() {
        for code in [
            DecisionErrorCode::RequestNotFound,
            DecisionErrorCode::AlreadyProcessed,
            DecisionErrorCode::CardCreationFailed,
            DecisionErrorCode::ApprovalProcessingError,
            DecisionErrorCode::RejectionProcessingError,
            DecisionErrorCode::ProcessingError,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code));
        }
    }

    #[test]
    fn test_outcome_approved_shape() {
        let card_id = StringUuid::new_v4();
        let outcome = EnrollmentDecisionOutcome::approved(card_id, "Coffee Club");

        assert!(outcome.success);
        assert_eq!(outcome.card_id, Some(card_id));
        assert!(outcome.error_code.is_none());

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("cardId").is_some());
        assert!(json.get("errorCode").is_none());
        assert!(json.get("errorLocation").is_none());
    }

    #[test]
    fn test_outcome_rejected_has_no_card() {
        let outcome = EnrollmentDecisionOutcome::rejected("Coffee Club");
        assert!(outcome.success);
        assert!(outcome.card_id.is_none());

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("cardId").is_none());
    }

    #[test]
    fn test_outcome_failure_shape() {
        let outcome = EnrollmentDecisionOutcome::failure(
            DecisionErrorCode::AlreadyProcessed,
            "status_guard",
            "Request was already processed",
        );

        assert!(!outcome.success);
        assert!(outcome.card_id.is_none());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["errorCode"], "ALREADY_PROCESSED");
        assert_eq!(json["errorLocation"], "status_guard");
    }
}
