//! Authentication claims and role capabilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User's role.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// User roles, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including account deletion.
    Admin,
    /// Can record transactions, manage accounts and invoices.
    Accountant,
    /// Read-only access.
    Staff,
}

impl Role {
    /// Whether this role may create, edit, or soft-delete ledger records
    /// (accounts, transactions, invoices).
    #[must_use]
    pub const fn can_record(self) -> bool {
        matches!(self, Self::Admin | Self::Accountant)
    }

    /// Whether this role may delete accounts. Admin only.
    #[must_use]
    pub const fn can_delete_accounts(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Accountant => write!(f, "accountant"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "accountant" => Ok(Self::Accountant),
            "staff" => Ok(Self::Staff),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_claims_carry_user_and_role() {
        let user_id = Uuid::new_v4();
        let expires = Utc::now() + chrono::Duration::minutes(15);
        let claims = Claims::new(user_id, "accountant", expires);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.role, "accountant");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Accountant, Role::Staff] {
            assert_eq!(Role::from_str(&role.to_string()).unwrap(), role);
        }
        assert!(Role::from_str("root").is_err());
        assert!(Role::from_str("").is_err());
    }

    #[test]
    fn test_mutation_capability() {
        assert!(Role::Admin.can_record());
        assert!(Role::Accountant.can_record());
        assert!(!Role::Staff.can_record());
    }

    #[test]
    fn test_account_deletion_is_admin_only() {
        assert!(Role::Admin.can_delete_accounts());
        assert!(!Role::Accountant.can_delete_accounts());
        assert!(!Role::Staff.can_delete_accounts());
    }
}
