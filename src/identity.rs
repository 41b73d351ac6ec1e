use serde::{Deserialize, Serialize};

use crate::error::{ReviewError, ReviewResult};

/// JWT Claims issued by the login service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject - User ID as String
    pub sub: String,
    /// The username of the authenticated user.
    pub username: String,
    /// Role assigned to the user (parent, vendor, admin)
    pub role: String,
    /// Expiration timestamp (UNIX TIME)
    pub exp: usize,
}

/// The caller on whose behalf a review operation runs.
///
/// Built once per request by the identity middleware and passed explicitly
/// into every service call. `user_id` is `None` for anonymous visitors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<i32>,
    pub role: Option<String>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: i32, role: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            role: Some(role.into()),
        }
    }

    /// Returns the caller's user id or fails with `Unauthorized`.
    pub fn require_user(&self) -> ReviewResult<i32> {
        self.user_id
            .ok_or_else(|| ReviewError::unauthorized("login required"))
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

impl TryFrom<Claims> for Identity {
    type Error = ReviewError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ReviewError::unauthorized("Invalid user ID in token"))?;
        Ok(Identity::user(user_id, claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: "aisyah".to_string(),
            role: role.to_string(),
            exp: 0,
        }
    }

    #[test]
    fn claims_become_identity() {
        let identity = Identity::try_from(claims("12", "admin")).unwrap();
        assert_eq!(identity.user_id, Some(12));
        assert!(identity.is_admin());
        assert_eq!(identity.require_user().unwrap(), 12);
    }

    #[test]
    fn malformed_subject_is_unauthorized() {
        assert!(matches!(
            Identity::try_from(claims("abc", "parent")),
            Err(ReviewError::Unauthorized(_))
        ));
        assert!(Identity::try_from(claims("0", "parent")).is_err());
    }

    #[test]
    fn anonymous_cannot_act() {
        let identity = Identity::anonymous();
        assert!(!identity.is_admin());
        assert!(matches!(identity.require_user(), Err(ReviewError::Unauthorized(_))));
    }
}
