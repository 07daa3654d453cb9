use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ceramerp_core::UserId;

use crate::Role;

/// User record as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Tokens issued by the auth service for a signed-in user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl core::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Signed-in user with the role resolved from `user_roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user: AuthUser,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: Option<DateTime<Utc>>) -> AuthSession {
        AuthSession {
            access_token: "secret-token".into(),
            refresh_token: None,
            expires_at,
            user: AuthUser {
                id: UserId::new(),
                email: Some("ana@example.com".into()),
                created_at: None,
                last_sign_in_at: None,
            },
        }
    }

    #[test]
    fn debug_output_hides_tokens() {
        let rendered = format!("{:?}", session(None));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        assert!(session(Some(now)).is_expired(now));
        assert!(!session(Some(now + Duration::minutes(5))).is_expired(now));
        assert!(!session(None).is_expired(now));
    }
}
