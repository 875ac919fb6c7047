//! Loyalty card domain types

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Card tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardTier {
    #[default]
    Standard,
    Silver,
    Gold,
    Platinum,
}

impl std::str::FromStr for CardTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            _ => Err(format!("Unknown card tier: {}", s)),
        }
    }
}

impl std::fmt::Display for CardTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Silver => write!(f, "silver"),
            Self::Gold => write!(f, "gold"),
            Self::Platinum => write!(f, "platinum"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for CardTier {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for CardTier {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for CardTier {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = self.to_string();
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s.as_str(), buf)
    }
}

/// The customer-facing artifact of an active enrollment.
///
/// At most one active card exists per (customer, program); the card number
/// is human-readable and not guaranteed globally unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoyaltyCard {
    pub id: StringUuid,
    pub customer_id: StringUuid,
    pub business_id: StringUuid,
    pub program_id: StringUuid,
    pub card_number: String,
    pub tier: CardTier,
    pub points: i64,
    pub multiplier: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for LoyaltyCard {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: StringUuid::new_v4(),
            customer_id: StringUuid::new_v4(),
            business_id: StringUuid::new_v4(),
            program_id: StringUuid::new_v4(),
            card_number: String::new(),
            tier: CardTier::default(),
            points: 0,
            multiplier: 1.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_card_tier_default() {
        assert_eq!(CardTier::default(), CardTier::Standard);
    }

    #[test]
    fn test_card_tier_from_str() {
        assert_eq!("standard".parse::<CardTier>().unwrap(), CardTier::Standard);
        assert_eq!("GOLD".parse::<CardTier>().unwrap(), CardTier::Gold);
        assert!("diamond".parse::<CardTier>().is_err());
    }

    #[rstest]
    #[case(CardTier::Standard, "standard")]
    #[case(CardTier::Silver, "silver")]
    #[case(CardTier::Gold, "gold")]
    #[case(CardTier::Platinum, "platinum")]
    fn test_card_tier_display_roundtrip(#[case] tier: CardTier, #[case] display: &str) {
        assert_eq!(tier.to_string(), display);
        assert_eq!(display.parse::<CardTier>().unwrap(), tier);
    }

    #[test]
    fn test_card_defaults() {
        let card = LoyaltyCard::default();
        assert_eq!(card.tier, CardTier::Standard);
        assert_eq!(card.points, 0);
        assert!((card.multiplier - 1.0).abs() < f64::EPSILON);
        assert!(card.is_active);
    }
}
