//! Data access layer (Repository pattern)

pub mod enrollment_request;
pub mod loyalty_card;
pub mod notification;
pub mod program_enrollment;
pub mod relationship;

pub use enrollment_request::EnrollmentRequestRepository;
pub use loyalty_card::LoyaltyCardRepository;
pub use notification::NotificationRepository;
pub use program_enrollment::ProgramEnrollmentRepository;
pub use relationship::RelationshipRepository;
