use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;

/// Role a caller holds in the identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A resolved caller identity, looked up fresh for every request.
/// Never cached beyond the request that resolved it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Caller {
    pub id: i64,
    pub email: String,
    /// Stored role string; constrained to 'user' | 'admin' at the database.
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Caller {
    pub fn role(&self) -> Role {
        if self.role == "admin" {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Role check for restricted operations. The stored role is
    /// authoritative — a role claim inside the token is ignored.
    pub fn require_role(&self, required: Role) -> Result<(), AppError> {
        if self.role() == required {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller_with_role(role: &str) -> Caller {
        Caller {
            id: 7,
            email: "a@x.com".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_passes_admin_check() {
        assert!(caller_with_role("admin").require_role(Role::Admin).is_ok());
    }

    #[test]
    fn test_user_fails_admin_check_with_forbidden() {
        let err = caller_with_role("user")
            .require_role(Role::Admin)
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[test]
    fn test_unknown_role_string_defaults_to_user() {
        assert_eq!(caller_with_role("something-else").role(), Role::User);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
