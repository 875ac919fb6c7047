//! Program enrollment (membership) repository

use crate::domain::{MembershipStatus, ProgramEnrollment, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgramEnrollmentRepository: Send + Sync {
    /// Find the membership for a (customer, program) pair
    async fn find_by_customer_and_program(
        &self,
        customer_id: StringUuid,
        program_id: StringUuid,
    ) -> Result<Option<ProgramEnrollment>>;

    /// Create an active membership with zero balances
    async fn create(
        &self,
        customer_id: StringUuid,
        program_id: StringUuid,
        business_id: StringUuid,
    ) -> Result<ProgramEnrollment>;

    /// Update membership status
    async fn set_status(&self, id: StringUuid, status: MembershipStatus) -> Result<()>;
}

pub struct ProgramEnrollmentRepositoryImpl {
    pool: MySqlPool,
}

impl ProgramEnrollmentRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<ProgramEnrollment>> {
        let enrollment = sqlx::query_as::<_, ProgramEnrollment>(
            r#"
            SELECT id, customer_id, program_id, business_id, status,
                   points_balance, lifetime_points, created_at, updated_at
            FROM program_enrollments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enrollment)
    }
}

#[async_trait]
impl ProgramEnrollmentRepository for ProgramEnrollmentRepositoryImpl {
    async fn find_by_customer_and_program(
        &self,
        customer_id: StringUuid,
        program_id: StringUuid,
    ) -> Result<Option<ProgramEnrollment>> {
        let enrollment = sqlx::query_as::<_, ProgramEnrollment>(
            r#"
            SELECT id, customer_id, program_id, business_id, status,
                   points_balance, lifetime_points, created_at, updated_at
            FROM program_enrollments
            WHERE customer_id = ? AND program_id = ?
            "#,
        )
        .bind(customer_id)
        .bind(program_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enrollment)
    }

    async fn create(
        &self,
        customer_id: StringUuid,
        program_id: StringUuid,
        business_id: StringUuid,
    ) -> Result<ProgramEnrollment> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO program_enrollments
                (id, customer_id, program_id, business_id, status,
                 points_balance, lifetime_points, created_at, updated_at)
            VALUES (?, ?, ?, ?, 'active', 0, 0, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(customer_id)
        .bind(program_id)
        .bind(business_id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Failed to create program enrollment"))
        })
    }

    async fn set_status(&self, id: StringUuid, status: MembershipStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE program_enrollments
            SET status = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Program enrollment {} not found",
                id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    #[tokio::test]
    async fn test_mock_find_by_customer_and_program() {
        let mut mock = MockProgramEnrollmentRepository::new();
        let customer_id = StringUuid::new_v4();
        let program_id = StringUuid::new_v4();

        mock.expect_find_by_customer_and_program()
            .with(eq(customer_id), eq(program_id))
            .returning(move |customer_id, program_id| {
                Ok(Some(ProgramEnrollment {
                    customer_id,
                    program_id,
                    ..Default::default()
                }))
            });

        let result = mock
            .find_by_customer_and_program(customer_id, program_id)
            .await
            .unwrap();
        assert_eq!(result.unwrap().customer_id, customer_id);
    }

    #[tokio::test]
    async fn test_mock_create_returns_active() {
        let mut mock = MockProgramEnrollmentRepository::new();

        mock.expect_create()
            .returning(|customer_id, program_id, business_id| {
                Ok(ProgramEnrollment {
                    customer_id,
                    program_id,
                    business_id,
                    status: MembershipStatus::Active,
                    ..Default::default()
                })
            });

        let enrollment = mock
            .create(
                StringUuid::new_v4(),
                StringUuid::new_v4(),
                StringUuid::new_v4(),
            )
            .await
            .unwrap();
        assert!(enrollment.is_active());
    }

    #[tokio::test]
    async fn test_mock_set_status() {
        let mut mock = MockProgramEnrollmentRepository::new();
        let id = StringUuid::new_v4();

        mock.expect_set_status()
            .with(eq(id), eq(MembershipStatus::Active))
            .times(1)
            .returning(|_, _| Ok(()));

        mock.set_status(id, MembershipStatus::Active).await.unwrap();
    }
}
