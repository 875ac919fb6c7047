//! Loyalty card API handlers

use crate::api::SuccessResponse;
use crate::domain::StringUuid;
use crate::error::Result;
use crate::state::HasCards;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// List a customer's active loyalty cards
pub async fn list_for_customer<S: HasCards>(
    State(state): State<S>,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let customer_id = StringUuid::from(customer_id);

    let cards = state.card_service().list_for_customer(customer_id).await?;

    Ok(Json(SuccessResponse::new(cards)))
}
