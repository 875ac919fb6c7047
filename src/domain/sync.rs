//! Sync event domain types
//!
//! Sync events are ephemeral signals for live UI sessions that an entity
//! changed. They are never persisted and have no identity beyond their
//! payload.

use super::common::StringUuid;
use serde::{Deserialize, Serialize};

/// Operation carried by a sync event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOp {
    Created,
    Updated,
    Deleted,
}

/// A transient change signal broadcast to connected UI clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    CardChanged {
        card_id: StringUuid,
        customer_id: StringUuid,
        business_id: StringUuid,
        op: SyncOp,
        /// Free-form origin marker, e.g. "enrollment_approval"
        context: String,
    },
    EnrollmentChanged {
        customer_id: StringUuid,
        business_id: StringUuid,
        program_id: StringUuid,
        op: SyncOp,
    },
}
