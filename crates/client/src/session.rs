//! Session lifecycle: sign-in, role resolution and teardown.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use tokio::sync::watch;

use ceramerp_auth::{AuthSession, Permission, Principal, Role, authorize};
use ceramerp_backend::schema::USER_ROLES;
use ceramerp_backend::{AuthService, DataApi, Query, Table};
use ceramerp_core::UserId;

use crate::cache::QueryCache;
use crate::error::ClientResult;
use crate::notify::{Notification, Notifier};

/// Published on every sign-in and sign-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    SignedIn(Principal),
}

#[derive(Deserialize)]
struct RoleRow {
    role: String,
}

/// Holds the current session and keeps the data API's bearer token in step
/// with it.
pub struct AuthContext {
    auth: Arc<dyn AuthService>,
    data: Arc<dyn DataApi>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    session: RwLock<Option<AuthSession>>,
    state: watch::Sender<AuthState>,
}

impl AuthContext {
    pub fn new(
        auth: Arc<dyn AuthService>,
        data: Arc<dyn DataApi>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);
        Self {
            auth,
            data,
            cache,
            notifier,
            session: RwLock::new(None),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn principal(&self) -> Option<Principal> {
        match self.state() {
            AuthState::SignedIn(principal) => Some(principal),
            AuthState::SignedOut => None,
        }
    }

    /// Role of the signed-in user; the lowest role when signed out.
    pub fn role(&self) -> Role {
        self.principal().map(|p| p.role).unwrap_or_else(Role::lowest)
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.role().allows(permission)
    }

    /// Fails with a forbidden error when the current role lacks `permission`.
    pub fn require(&self, permission: Permission) -> ClientResult<()> {
        Ok(authorize(self.role(), permission)?)
    }

    pub fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Resume from a stored access token.
    ///
    /// An invalid or expired token leaves the context signed out.
    pub async fn restore(&self, access_token: &str) -> ClientResult<Principal> {
        let user = match self.auth.get_user(access_token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::info!(error = %e, "stored session is no longer valid");
                self.teardown();
                return Err(e.into());
            }
        };
        let session = AuthSession {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at: None,
            user,
        };
        Ok(self.establish(session).await)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Principal> {
        match self.auth.sign_in_with_password(email, password).await {
            Ok(session) => {
                let principal = self.establish(session).await;
                self.notifier.notify(Notification::success("Signed in"));
                Ok(principal)
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Sign-in failed", e.message()));
                Err(e.into())
            }
        }
    }

    /// Register a new account. Returns `None` when the account must be
    /// confirmed before a session is issued.
    pub async fn sign_up(&self, email: &str, password: &str) -> ClientResult<Option<Principal>> {
        match self.auth.sign_up(email, password).await {
            Ok(signup) => {
                self.notifier.notify(Notification::success("Account created"));
                match signup.session {
                    Some(session) => Ok(Some(self.establish(session).await)),
                    None => Ok(None),
                }
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Sign-up failed", e.message()));
                Err(e.into())
            }
        }
    }

    /// End the session. Local state is always torn down, even when the remote
    /// sign-out fails.
    pub async fn sign_out(&self) {
        let token = self.access_token();
        if let Some(token) = token {
            if let Err(e) = self.auth.sign_out(&token).await {
                tracing::warn!(error = %e, "remote sign-out failed; clearing local session");
            }
        }
        self.teardown();
    }

    /// Rows cached under the previous identity are dropped along with it.
    async fn establish(&self, session: AuthSession) -> Principal {
        self.data.set_access_token(Some(session.access_token.clone()));
        self.cache.clear();
        let role = self.lookup_role(session.user.id).await;
        let principal = Principal {
            user: session.user.clone(),
            role,
        };
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        tracing::info!(user_id = %principal.user.id, role = %role, "signed in");
        self.state.send_replace(AuthState::SignedIn(principal.clone()));
        principal
    }

    fn teardown(&self) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.data.set_access_token(None);
        self.cache.clear();
        self.state.send_replace(AuthState::SignedOut);
    }

    /// Missing rows, unknown role names and lookup failures all resolve to the
    /// lowest role.
    async fn lookup_role(&self, user_id: UserId) -> Role {
        let query = Query::new().select("role").eq("user_id", user_id);
        match Table::new(self.data.as_ref(), USER_ROLES)
            .fetch_optional::<RoleRow>(&query)
            .await
        {
            Ok(Some(row)) => row.role.parse().unwrap_or_else(|e| {
                tracing::warn!(%user_id, error = %e, "unknown role; using lowest");
                Role::lowest()
            }),
            Ok(None) => Role::lowest(),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "role lookup failed; using lowest");
                Role::lowest()
            }
        }
    }
}

impl core::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthContext")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
