//! OpenAPI document assembly

use crate::api::{MessageResponse, PaginationQuery};
use crate::domain::{
    CardTier, DecisionErrorCode, EnrollmentDecisionOutcome, EnrollmentRequest,
    EnrollmentRequestStatus, LoyaltyCard, MembershipStatus, Notification, NotificationType,
    ProgramEnrollment, RespondToEnrollmentInput,
};
use utoipa::OpenApi;

/// API documentation root
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Perks Core API",
        description = "Loyalty platform backend: enrollment responses, cards, notifications"
    ),
    components(schemas(
        EnrollmentRequest,
        EnrollmentRequestStatus,
        RespondToEnrollmentInput,
        EnrollmentDecisionOutcome,
        DecisionErrorCode,
        LoyaltyCard,
        CardTier,
        ProgramEnrollment,
        MembershipStatus,
        Notification,
        NotificationType,
        PaginationQuery,
        MessageResponse,
    ))
)]
pub struct ApiDoc;
