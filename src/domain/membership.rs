//! Program enrollment (membership) domain types

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Membership status of a customer in a loyalty program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    #[default]
    Active,
    Inactive,
}

impl std::str::FromStr for MembershipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("Unknown membership status: {}", s)),
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for MembershipStatus {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for MembershipStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for MembershipStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = self.to_string();
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s.as_str(), buf)
    }
}

/// A customer's standing membership in a loyalty program.
///
/// Unique per (customer, program): created on first approval, reactivated
/// on subsequent approvals if previously inactive.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProgramEnrollment {
    pub id: StringUuid,
    pub customer_id: StringUuid,
    pub program_id: StringUuid,
    pub business_id: StringUuid,
    pub status: MembershipStatus,
    pub points_balance: i64,
    pub lifetime_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgramEnrollment {
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }
}

impl Default for ProgramEnrollment {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: StringUuid::new_v4(),
            customer_id: StringUuid::new_v4(),
            program_id: StringUuid::new_v4(),
            business_id: StringUuid::new_v4(),
            status: MembershipStatus::default(),
            points_balance: 0,
            lifetime_points: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_status_from_str() {
        assert_eq!(
            "active".parse::<MembershipStatus>().unwrap(),
            MembershipStatus::Active
        );
        assert_eq!(
            "INACTIVE".parse::<MembershipStatus>().unwrap(),
            MembershipStatus::Inactive
        );
        assert!("dormant".parse::<MembershipStatus>().is_err());
    }

    #[test]
    fn test_membership_status_display() {
        assert_eq!(format!("{}", MembershipStatus::Active), "active");
        assert_eq!(format!("{}", MembershipStatus::Inactive), "inactive");
    }

    #[test]
    fn test_enrollment_default_is_active() {
        let enrollment = ProgramEnrollment::default();
        assert!(enrollment.is_active());
        assert_eq!(enrollment.points_balance, 0);
        assert_eq!(enrollment.lifetime_points, 0);
    }

    #[test]
    fn test_enrollment_inactive() {
        let enrollment = ProgramEnrollment {
            status: MembershipStatus::Inactive,
            ..Default::default()
        };
        assert!(!enrollment.is_active());
    }
}
