//! Customer/business relationship repository

use crate::domain::{CustomerBusinessRelationship, StringUuid};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Mark the relationship active, creating it if absent.
    ///
    /// Relies on the uniqueness constraint on (customer_id, business_id).
    async fn upsert_active(&self, customer_id: StringUuid, business_id: StringUuid) -> Result<()>;

    /// Find the relationship for a (customer, business) pair
    async fn find_by_customer_and_business(
        &self,
        customer_id: StringUuid,
        business_id: StringUuid,
    ) -> Result<Option<CustomerBusinessRelationship>>;
}

pub struct RelationshipRepositoryImpl {
    pool: MySqlPool,
}

impl RelationshipRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipRepository for RelationshipRepositoryImpl {
    async fn upsert_active(&self, customer_id: StringUuid, business_id: StringUuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customer_business_relationships
                (id, customer_id, business_id, status, created_at, updated_at)
            VALUES (?, ?, ?, 'active', NOW(), NOW())
            ON DUPLICATE KEY UPDATE status = 'active', updated_at = NOW()
            "#,
        )
        .bind(StringUuid::new_v4())
        .bind(customer_id)
        .bind(business_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_customer_and_business(
        &self,
        customer_id: StringUuid,
        business_id: StringUuid,
    ) -> Result<Option<CustomerBusinessRelationship>> {
        let relationship = sqlx::query_as::<_, CustomerBusinessRelationship>(
            r#"
            SELECT id, customer_id, business_id, status, created_at, updated_at
            FROM customer_business_relationships
            WHERE customer_id = ? AND business_id = ?
            "#,
        )
        .bind(customer_id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(relationship)
    }
}
