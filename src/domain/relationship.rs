//! Customer/business relationship domain types

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Relationship status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    #[default]
    Active,
    Inactive,
}

impl std::str::FromStr for RelationshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("Unknown relationship status: {}", s)),
        }
    }
}

impl std::fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for RelationshipStatus {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for RelationshipStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for RelationshipStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = self.to_string();
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s.as_str(), buf)
    }
}

/// Denormalized edge marking that a customer has a relationship with a
/// business. Upserted on enrollment approval; unique per
/// (customer, business).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CustomerBusinessRelationship {
    pub id: StringUuid,
    pub customer_id: StringUuid,
    pub business_id: StringUuid,
    pub status: RelationshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_status_from_str() {
        assert_eq!(
            "active".parse::<RelationshipStatus>().unwrap(),
            RelationshipStatus::Active
        );
        assert!("blocked".parse::<RelationshipStatus>().is_err());
    }

    #[test]
    fn test_relationship_status_display() {
        assert_eq!(format!("{}", RelationshipStatus::Active), "active");
        assert_eq!(format!("{}", RelationshipStatus::Inactive), "inactive");
    }
}
