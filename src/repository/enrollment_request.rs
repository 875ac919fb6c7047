//! Enrollment request repository

use crate::domain::{EnrollmentRequest, EnrollmentRequestStatus, StringUuid};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRequestRepository: Send + Sync {
    /// Find an ENROLLMENT-typed request by id, joined with the program and
    /// business display names.
    async fn find_enrollment(&self, id: StringUuid) -> Result<Option<EnrollmentRequest>>;

    /// Record the decision on a pending request.
    ///
    /// One transaction covers the status compare-and-swap and the marking
    /// of notifications referencing the request as actioned. Returns false
    /// when the request was no longer pending (the swap matched no row).
    async fn mark_responded(&self, id: StringUuid, status: EnrollmentRequestStatus)
        -> Result<bool>;
}

pub struct EnrollmentRequestRepositoryImpl {
    pool: MySqlPool,
}

impl EnrollmentRequestRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentRequestRepository for EnrollmentRequestRepositoryImpl {
    async fn find_enrollment(&self, id: StringUuid) -> Result<Option<EnrollmentRequest>> {
        let request = sqlx::query_as::<_, EnrollmentRequest>(
            r#"
            SELECT er.id, er.customer_id, er.business_id, er.program_id,
                   p.name AS program_name, b.name AS business_name,
                   er.status, er.data, er.responded_at, er.created_at, er.updated_at
            FROM enrollment_requests er
            JOIN loyalty_programs p ON p.id = er.program_id
            JOIN businesses b ON b.id = er.business_id
            WHERE er.id = ? AND er.request_type = 'ENROLLMENT'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn mark_responded(
        &self,
        id: StringUuid,
        status: EnrollmentRequestStatus,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE enrollment_requests
            SET status = ?, responded_at = NOW(), updated_at = NOW()
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(status.to_string())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        // Any invitation still displayed by a UI is now settled
        sqlx::query(
            r#"
            UPDATE notifications
            SET requires_action = FALSE, action_taken = TRUE, updated_at = NOW()
            WHERE JSON_UNQUOTE(JSON_EXTRACT(data, '$.request_id')) = ?
            "#,
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    #[tokio::test]
    async fn test_mock_find_enrollment() {
        let mut mock = MockEnrollmentRequestRepository::new();
        let id = StringUuid::new_v4();

        mock.expect_find_enrollment()
            .with(eq(id))
            .returning(move |id| {
                Ok(Some(EnrollmentRequest {
                    id,
                    program_name: "Coffee Club".to_string(),
                    ..Default::default()
                }))
            });

        let result = mock.find_enrollment(id).await.unwrap();
        assert_eq!(result.unwrap().program_name, "Coffee Club");
    }

    #[tokio::test]
    async fn test_mock_find_enrollment_not_found() {
        let mut mock = MockEnrollmentRequestRepository::new();

        mock.expect_find_enrollment().returning(|_| Ok(None));

        let result = mock.find_enrollment(StringUuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_mock_mark_responded_swaps_once() {
        let mut mock = MockEnrollmentRequestRepository::new();
        let id = StringUuid::new_v4();

        mock.expect_mark_responded()
            .with(eq(id), eq(EnrollmentRequestStatus::Approved))
            .times(1)
            .returning(|_, _| Ok(true));

        assert!(mock
            .mark_responded(id, EnrollmentRequestStatus::Approved)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_mock_mark_responded_lost_race() {
        let mut mock = MockEnrollmentRequestRepository::new();

        mock.expect_mark_responded().returning(|_, _| Ok(false));

        let swapped = mock
            .mark_responded(StringUuid::new_v4(), EnrollmentRequestStatus::Rejected)
            .await
            .unwrap();
        assert!(!swapped);
    }
}
