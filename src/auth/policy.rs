//! Access policy for LMS.
//!
//! Authorization decisions are derived from a validated session token.
//! Two rules apply everywhere:
//!
//! - **Ownership**: a non-admin only sees resources they own. Anything
//!   else is reported as not found, so existence is not revealed.
//! - **Role**: admin-only operations fail with `Forbidden` for everyone else.

use crate::auth::token::{SessionClaims, TokenEngine};
use crate::{LmsError, Result};

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// User ID.
    pub user_id: i64,
    /// Whether the caller holds the admin role.
    pub is_admin: bool,
}

impl Identity {
    /// Build an identity for a regular user.
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    /// Build an identity for an admin.
    pub fn admin(user_id: i64) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// Check whether this caller may see a resource owned by `owner_id`.
    pub fn can_access(&self, owner_id: i64) -> bool {
        self.is_admin || self.user_id == owner_id
    }

    /// Apply the ownership rule; `resource` names the hidden thing.
    pub fn ensure_owner_or_admin(&self, owner_id: i64, resource: &str) -> Result<()> {
        if self.can_access(owner_id) {
            Ok(())
        } else {
            Err(LmsError::NotFound(resource.to_string()))
        }
    }

    /// Apply the role rule.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(LmsError::Forbidden("admin access required".to_string()))
        }
    }
}

impl From<&SessionClaims> for Identity {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            is_admin: claims.is_admin,
        }
    }
}

/// Validate a bearer token and derive the caller's identity.
///
/// Every token failure collapses to `Unauthorized`.
pub fn authenticate(engine: &TokenEngine, token: &str) -> Result<Identity> {
    let claims = engine.validate_session(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        LmsError::Unauthorized("invalid or expired token".to_string())
    })?;
    Ok(Identity::from(&claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::User;
    use chrono::Utc;
    use std::time::Duration;

    #[test]
    fn test_owner_can_access() {
        let identity = Identity::user(1);
        assert!(identity.can_access(1));
        assert!(!identity.can_access(2));
    }

    #[test]
    fn test_admin_can_access_anything() {
        let identity = Identity::admin(1);
        assert!(identity.can_access(1));
        assert!(identity.can_access(99));
    }

    #[test]
    fn test_ownership_rule_hides_existence() {
        let result = Identity::user(1).ensure_owner_or_admin(2, "loan");
        assert!(matches!(result, Err(LmsError::NotFound(ref what)) if what == "loan"));
    }

    #[test]
    fn test_role_rule() {
        assert!(Identity::admin(1).require_admin().is_ok());
        assert!(matches!(
            Identity::user(1).require_admin(),
            Err(LmsError::Forbidden(_))
        ));
    }

    #[test]
    fn test_authenticate_valid_token() {
        let engine = TokenEngine::new("secret");
        let user = User {
            id: 3,
            email: "admin@x.com".to_string(),
            password_hash: String::new(),
            is_active: true,
            is_admin: true,
            created_at: Utc::now(),
        };
        let token = engine
            .issue_session(&user, Duration::from_secs(60))
            .unwrap();

        let identity = authenticate(&engine, &token).unwrap();
        assert_eq!(identity, Identity::admin(3));
    }

    #[test]
    fn test_authenticate_rejects_bad_token() {
        let engine = TokenEngine::new("secret");
        let result = authenticate(&engine, "garbage");
        assert!(matches!(result, Err(LmsError::Unauthorized(_))));
    }
}
