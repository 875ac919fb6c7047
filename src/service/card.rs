//! Loyalty card issuance and listing

use crate::cache::{customer_cards_key, CacheOperations};
use crate::domain::{LoyaltyCard, StringUuid};
use crate::error::Result;
use crate::repository::LoyaltyCardRepository;
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Service for issuing and listing loyalty cards
pub struct CardService<R, C>
where
    R: LoyaltyCardRepository,
    C: CacheOperations,
{
    card_repo: Arc<R>,
    cache: Arc<C>,
    number_prefix: String,
    list_ttl: Duration,
}

impl<R, C> CardService<R, C>
where
    R: LoyaltyCardRepository,
    C: CacheOperations,
{
    pub fn new(card_repo: Arc<R>, cache: Arc<C>, number_prefix: String, list_ttl: Duration) -> Self {
        Self {
            card_repo,
            cache,
            number_prefix,
            list_ttl,
        }
    }

    /// Issue a card for an approved enrollment, or hand back the existing
    /// active card for the (customer, program) pair.
    ///
    /// Check-then-insert: the repository's uniqueness constraint backstops
    /// the window between the check and the insert, so repeated approvals
    /// always converge on a single active card.
    pub async fn issue_for_enrollment(
        &self,
        customer_id: StringUuid,
        business_id: StringUuid,
        program_id: StringUuid,
    ) -> Result<LoyaltyCard> {
        if let Some(existing) = self.card_repo.find_active(customer_id, program_id).await? {
            tracing::debug!(
                card_id = %existing.id,
                customer_id = %customer_id,
                "reusing existing active card"
            );
            return Ok(existing);
        }

        let card_number = self.generate_card_number();
        let card = self
            .card_repo
            .insert(customer_id, business_id, program_id, &card_number)
            .await?;

        metrics::counter!("perks_cards_issued_total").increment(1);

        if let Err(e) = self.cache.invalidate(&customer_cards_key(customer_id)).await {
            tracing::warn!(customer_id = %customer_id, error = %e, "card list cache invalidation failed");
        }

        Ok(card)
    }

    /// List a customer's active cards through the cache
    pub async fn list_for_customer(&self, customer_id: StringUuid) -> Result<Vec<LoyaltyCard>> {
        let key = customer_cards_key(customer_id);

        match self.cache.get_json(&key).await {
            Ok(Some(value)) => {
                if let Ok(cards) = serde_json::from_value::<Vec<LoyaltyCard>>(value) {
                    return Ok(cards);
                }
                // A stale shape in cache falls through to the database
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(customer_id = %customer_id, error = %e, "card list cache read failed");
            }
        }

        let cards = self.card_repo.list_by_customer(customer_id).await?;

        if let Ok(value) = serde_json::to_value(&cards) {
            if let Err(e) = self.cache.set_json(&key, &value, self.list_ttl).await {
                tracing::warn!(customer_id = %customer_id, error = %e, "card list cache write failed");
            }
        }

        Ok(cards)
    }

    /// Generate a human-readable card number:
    /// `<prefix>-<last 6 digits of epoch millis>-<4-digit zero-padded random>`.
    ///
    /// Not guaranteed globally unique; the (customer, program) uniqueness
    /// constraint is what the workflow leans on.
    fn generate_card_number(&self) -> String {
        let millis = Utc::now().timestamp_millis() % 1_000_000;
        let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
        format!("{}-{:06}-{:04}", self.number_prefix, millis, suffix)
    }
}
