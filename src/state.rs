//! Application state traits for dependency injection
//!
//! Handlers are generic over these traits so the same code serves the
//! production `AppState` and test states built on mock repositories.

use crate::cache::CacheOperations;
use crate::config::Config;
use crate::repository::{
    EnrollmentRequestRepository, LoyaltyCardRepository, NotificationRepository,
    ProgramEnrollmentRepository, RelationshipRepository,
};
use crate::service::{CardService, EnrollmentResponseService, NotificationService};
use crate::sync::SyncEventPublisher;

/// Trait for states that provide the enrollment response workflow
pub trait HasEnrollments: Clone + Send + Sync + 'static {
    /// The enrollment request repository type
    type RequestRepo: EnrollmentRequestRepository;
    /// The program enrollment repository type
    type MembershipRepo: ProgramEnrollmentRepository;
    /// The loyalty card repository type
    type CardRepo: LoyaltyCardRepository;
    /// The relationship repository type
    type RelationshipRepo: RelationshipRepository;
    /// The notification repository type
    type NotificationRepo: NotificationRepository;
    /// The sync event publisher type
    type SyncPublisher: SyncEventPublisher;
    /// The cache type
    type Cache: CacheOperations;

    /// Get the application configuration
    fn config(&self) -> &Config;

    /// Get the enrollment response service
    fn enrollment_response_service(
        &self,
    ) -> &EnrollmentResponseService<
        Self::RequestRepo,
        Self::MembershipRepo,
        Self::CardRepo,
        Self::RelationshipRepo,
        Self::NotificationRepo,
        Self::SyncPublisher,
        Self::Cache,
    >;
}

/// Trait for states that provide card issuance and listing
pub trait HasCards: Clone + Send + Sync + 'static {
    /// The loyalty card repository type
    type CardRepo: LoyaltyCardRepository;
    /// The cache type
    type Cache: CacheOperations;

    /// Get the card service
    fn card_service(&self) -> &CardService<Self::CardRepo, Self::Cache>;
}

/// Trait for states that provide notification records
pub trait HasNotifications: Clone + Send + Sync + 'static {
    /// The notification repository type
    type NotificationRepo: NotificationRepository;

    /// Get the notification service
    fn notification_service(&self) -> &NotificationService<Self::NotificationRepo>;
}
