//! Loyalty card repository

use crate::domain::{LoyaltyCard, StringUuid};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoyaltyCardRepository: Send + Sync {
    /// Find the active card for a (customer, program) pair
    async fn find_active(
        &self,
        customer_id: StringUuid,
        program_id: StringUuid,
    ) -> Result<Option<LoyaltyCard>>;

    /// Insert a new active card with default tier, zero points and 1.0
    /// multiplier.
    ///
    /// The storage schema enforces at most one active card per
    /// (customer, program); an insert that races past the caller's
    /// existence check resolves to the already-present card.
    async fn insert(
        &self,
        customer_id: StringUuid,
        business_id: StringUuid,
        program_id: StringUuid,
        card_number: &str,
    ) -> Result<LoyaltyCard>;

    /// List a customer's active cards, newest first
    async fn list_by_customer(&self, customer_id: StringUuid) -> Result<Vec<LoyaltyCard>>;
}

pub struct LoyaltyCardRepositoryImpl {
    pool: MySqlPool,
}

impl LoyaltyCardRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<LoyaltyCard>> {
        let card = sqlx::query_as::<_, LoyaltyCard>(
            r#"
            SELECT id, customer_id, business_id, program_id, card_number,
                   tier, points, multiplier, is_active, created_at, updated_at
            FROM loyalty_cards
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }
}

#[async_trait]
impl LoyaltyCardRepository for LoyaltyCardRepositoryImpl {
    async fn find_active(
        &self,
        customer_id: StringUuid,
        program_id: StringUuid,
    ) -> Result<Option<LoyaltyCard>> {
        let card = sqlx::query_as::<_, LoyaltyCard>(
            r#"
            SELECT id, customer_id, business_id, program_id, card_number,
                   tier, points, multiplier, is_active, created_at, updated_at
            FROM loyalty_cards
            WHERE customer_id = ? AND program_id = ? AND is_active = TRUE
            LIMIT 1
            "#,
        )
        .bind(customer_id)
        .bind(program_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    async fn insert(
        &self,
        customer_id: StringUuid,
        business_id: StringUuid,
        program_id: StringUuid,
        card_number: &str,
    ) -> Result<LoyaltyCard> {
        let id = StringUuid::new_v4();

        let inserted = sqlx::query(
            r#"
            INSERT INTO loyalty_cards
                (id, customer_id, business_id, program_id, card_number,
                 tier, points, multiplier, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'standard', 0, 1.0, TRUE, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(customer_id)
        .bind(business_id)
        .bind(program_id)
        .bind(card_number)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => self.find_by_id(id).await?.ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("Failed to create loyalty card"))
            }),
            // A concurrent approval won the insert; hand back its card
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => self
                .find_active(customer_id, program_id)
                .await?
                .ok_or_else(|| {
                    AppError::Conflict(format!(
                        "Active card for customer {} in program {} vanished during insert",
                        customer_id, program_id
                    ))
                }),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_by_customer(&self, customer_id: StringUuid) -> Result<Vec<LoyaltyCard>> {
        let cards = sqlx::query_as::<_, LoyaltyCard>(
            r#"
            SELECT id, customer_id, business_id, program_id, card_number,
                   tier, points, multiplier, is_active, created_at, updated_at
            FROM loyalty_cards
            WHERE customer_id = ? AND is_active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }
}
