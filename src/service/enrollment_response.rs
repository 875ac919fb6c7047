//! Enrollment response workflow
//!
//! Processes a customer's answer to a loyalty program invitation:
//! lookup, status guard, transactional status transition, then the
//! approve/reject branch with card issuance, notification fan-out and
//! sync event emission. The workflow always returns a structured
//! [`EnrollmentDecisionOutcome`], never an error.

use crate::cache::CacheOperations;
use crate::domain::{
    DecisionErrorCode, EnrollmentDecisionOutcome, EnrollmentRequest, EnrollmentRequestStatus,
    MembershipStatus, StringUuid, SyncEvent, SyncOp,
};
use crate::error::{AppError, Result};
use crate::repository::{
    EnrollmentRequestRepository, LoyaltyCardRepository, NotificationRepository,
    ProgramEnrollmentRepository, RelationshipRepository,
};
use crate::service::workflow::{run_steps, Step};
use crate::service::{CardService, NotificationService};
use crate::sync::SyncEventPublisher;
use std::sync::Arc;

/// Orchestrates the response to an enrollment invitation
pub struct EnrollmentResponseService<RQ, PE, CR, RR, NR, SP, C>
where
    RQ: EnrollmentRequestRepository,
    PE: ProgramEnrollmentRepository,
    CR: LoyaltyCardRepository,
    RR: RelationshipRepository,
    NR: NotificationRepository,
    SP: SyncEventPublisher,
    C: CacheOperations,
{
    request_repo: Arc<RQ>,
    membership_repo: Arc<PE>,
    card_service: Arc<CardService<CR, C>>,
    relationship_repo: Arc<RR>,
    notification_service: Arc<NotificationService<NR>>,
    sync: Arc<SP>,
}

impl<RQ, PE, CR, RR, NR, SP, C> EnrollmentResponseService<RQ, PE, CR, RR, NR, SP, C>
where
    RQ: EnrollmentRequestRepository,
    PE: ProgramEnrollmentRepository,
    CR: LoyaltyCardRepository,
    RR: RelationshipRepository,
    NR: NotificationRepository,
    SP: SyncEventPublisher,
    C: CacheOperations,
{
    pub fn new(
        request_repo: Arc<RQ>,
        membership_repo: Arc<PE>,
        card_service: Arc<CardService<CR, C>>,
        relationship_repo: Arc<RR>,
        notification_service: Arc<NotificationService<NR>>,
        sync: Arc<SP>,
    ) -> Self {
        Self {
            request_repo,
            membership_repo,
            card_service,
            relationship_repo,
            notification_service,
            sync,
        }
    }

    /// Get an enrollment request with its program/business context
    pub async fn get_request(&self, id: StringUuid) -> Result<EnrollmentRequest> {
        self.request_repo
            .find_enrollment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Enrollment request {} not found", id)))
    }

    /// Process a customer's decision on a pending enrollment invitation.
    ///
    /// The status transition is single-use: the first response wins, any
    /// later one gets `ALREADY_PROCESSED`.
    pub async fn respond(
        &self,
        request_id: StringUuid,
        approved: bool,
    ) -> EnrollmentDecisionOutcome {
        let request = match self.lookup(request_id).await {
            Some(request) => request,
            None => {
                return EnrollmentDecisionOutcome::failure(
                    DecisionErrorCode::RequestNotFound,
                    "request_lookup",
                    format!("Enrollment request {} not found", request_id),
                );
            }
        };

        if !request.is_pending() {
            return EnrollmentDecisionOutcome::failure(
                DecisionErrorCode::AlreadyProcessed,
                "status_guard",
                format!("Enrollment request {} was already processed", request_id),
            );
        }

        let new_status = if approved {
            EnrollmentRequestStatus::Approved
        } else {
            EnrollmentRequestStatus::Rejected
        };

        // Compare-and-swap on status; covers the marking of related
        // notifications as actioned in the same transaction
        match self.request_repo.mark_responded(request_id, new_status).await {
            Ok(true) => {}
            Ok(false) => {
                return EnrollmentDecisionOutcome::failure(
                    DecisionErrorCode::AlreadyProcessed,
                    "status_guard",
                    format!("Enrollment request {} was already processed", request_id),
                );
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    "failed to record enrollment decision"
                );
                return EnrollmentDecisionOutcome::failure(
                    DecisionErrorCode::ProcessingError,
                    "status_transition",
                    "Failed to record the enrollment decision",
                );
            }
        }

        let outcome = if approved {
            self.process_approval(&request).await
        } else {
            self.process_rejection(&request).await
        };

        let decision = if approved { "approved" } else { "rejected" };
        let result = if outcome.success { "success" } else { "error" };
        metrics::counter!(
            "perks_enrollment_decisions_total",
            "decision" => decision,
            "outcome" => result
        )
        .increment(1);

        outcome
    }

    /// Lookup degrades data-access faults to "not found"
    async fn lookup(&self, request_id: StringUuid) -> Option<EnrollmentRequest> {
        match self.request_repo.find_enrollment(request_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %e,
                    "enrollment request lookup failed, treating as not found"
                );
                None
            }
        }
    }

    async fn process_approval(&self, request: &EnrollmentRequest) -> EnrollmentDecisionOutcome {
        if let Err(e) = self.ensure_active_membership(request).await {
            tracing::error!(
                request_id = %request.id,
                error = %e,
                "failed to activate program enrollment"
            );
            return EnrollmentDecisionOutcome::failure(
                DecisionErrorCode::ApprovalProcessingError,
                "membership",
                "Failed to activate the program enrollment",
            );
        }

        let card = match self
            .card_service
            .issue_for_enrollment(request.customer_id, request.business_id, request.program_id)
            .await
        {
            Ok(card) => card,
            Err(e) => {
                tracing::error!(request_id = %request.id, error = %e, "card issuance failed");
                return EnrollmentDecisionOutcome::failure(
                    DecisionErrorCode::CardCreationFailed,
                    "card_issuance",
                    "Failed to issue a loyalty card",
                );
            }
        };

        let card_id = card.id;
        let steps = vec![
            Step::best_effort(
                "relationship_upsert",
                self.relationship_repo
                    .upsert_active(request.customer_id, request.business_id),
            ),
            Step::best_effort("notify_customer", async move {
                self.notification_service
                    .notify_customer_decision(request, true, Some(card_id))
                    .await
                    .map(|_| ())
            }),
            Step::best_effort("notify_business", async move {
                self.notification_service
                    .notify_business_decision(request, true, Some(card_id))
                    .await
                    .map(|_| ())
            }),
            Step::best_effort("sync_events", async move {
                self.sync.publish(SyncEvent::CardChanged {
                    card_id,
                    customer_id: request.customer_id,
                    business_id: request.business_id,
                    op: SyncOp::Created,
                    context: "enrollment_approval".to_string(),
                });
                self.sync.publish(SyncEvent::EnrollmentChanged {
                    customer_id: request.customer_id,
                    business_id: request.business_id,
                    program_id: request.program_id,
                    op: SyncOp::Updated,
                });
                Ok(())
            }),
        ];

        if let Err(failure) = run_steps(steps).await {
            tracing::error!(
                request_id = %request.id,
                error = %failure,
                "approval side effects aborted"
            );
            return EnrollmentDecisionOutcome::failure(
                DecisionErrorCode::ApprovalProcessingError,
                failure.step,
                "Approval side effects failed",
            );
        }

        EnrollmentDecisionOutcome::approved(card_id, &request.program_name)
    }

    async fn process_rejection(&self, request: &EnrollmentRequest) -> EnrollmentDecisionOutcome {
        let steps = vec![
            Step::best_effort("notify_customer", async move {
                self.notification_service
                    .notify_customer_decision(request, false, None)
                    .await
                    .map(|_| ())
            }),
            Step::best_effort("notify_business", async move {
                self.notification_service
                    .notify_business_decision(request, false, None)
                    .await
                    .map(|_| ())
            }),
            Step::best_effort("sync_events", async move {
                self.sync.publish(SyncEvent::EnrollmentChanged {
                    customer_id: request.customer_id,
                    business_id: request.business_id,
                    program_id: request.program_id,
                    op: SyncOp::Updated,
                });
                Ok(())
            }),
        ];

        if let Err(failure) = run_steps(steps).await {
            tracing::error!(
                request_id = %request.id,
                error = %failure,
                "rejection side effects aborted"
            );
            return EnrollmentDecisionOutcome::failure(
                DecisionErrorCode::RejectionProcessingError,
                failure.step,
                "Rejection side effects failed",
            );
        }

        EnrollmentDecisionOutcome::rejected(&request.program_name)
    }

    /// Create the membership on first approval, reactivate it when a
    /// previous one went inactive
    async fn ensure_active_membership(&self, request: &EnrollmentRequest) -> Result<()> {
        match self
            .membership_repo
            .find_by_customer_and_program(request.customer_id, request.program_id)
            .await?
        {
            Some(enrollment) if enrollment.is_active() => Ok(()),
            Some(enrollment) => {
                self.membership_repo
                    .set_status(enrollment.id, MembershipStatus::Active)
                    .await
            }
            None => {
                self.membership_repo
                    .create(request.customer_id, request.program_id, request.business_id)
                    .await?;
                Ok(())
            }
        }
    }
}
