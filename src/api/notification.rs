//! Notification API handlers

use crate::api::{PaginatedResponse, PaginationQuery, SuccessResponse};
use crate::domain::StringUuid;
use crate::error::Result;
use crate::state::HasNotifications;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// List notifications for a recipient
pub async fn list_for_recipient<S: HasNotifications>(
    State(state): State<S>,
    Path(recipient_id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let recipient_id = StringUuid::from(recipient_id);

    let (notifications, total) = state
        .notification_service()
        .list_for_recipient(recipient_id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        notifications,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Mark a notification as read
pub async fn mark_read<S: HasNotifications>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let id = StringUuid::from(id);

    let notification = state.notification_service().mark_read(id).await?;

    Ok(Json(SuccessResponse::new(notification)))
}
