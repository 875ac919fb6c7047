//! Enrollment request API handlers

use crate::api::SuccessResponse;
use crate::domain::{RespondToEnrollmentInput, StringUuid};
use crate::error::Result;
use crate::state::HasEnrollments;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// Respond to a pending enrollment invitation.
///
/// Always answers 200 with a structured decision outcome; workflow
/// failures are carried in the body, not as HTTP errors.
pub async fn respond<S: HasEnrollments>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
    Json(input): Json<RespondToEnrollmentInput>,
) -> impl IntoResponse {
    let id = StringUuid::from(id);

    let outcome = state
        .enrollment_response_service()
        .respond(id, input.approved)
        .await;

    Json(outcome)
}

/// Get an enrollment request with its program/business context
pub async fn get<S: HasEnrollments>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let id = StringUuid::from(id);

    let request = state.enrollment_response_service().get_request(id).await?;

    Ok(Json(SuccessResponse::new(request)))
}
