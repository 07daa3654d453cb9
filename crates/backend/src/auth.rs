//! Authentication service contract.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeDelta, Utc};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use ceramerp_auth::{AuthSession, AuthUser};
use ceramerp_core::UserId;

use crate::error::{BackendError, BackendResult};
use crate::rest::{BackendConfig, read_rows};

/// Outcome of a sign-up: a session unless the service requires confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUp {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// External authentication service.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> BackendResult<AuthSession>;

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUp>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;

    /// Look up the user owning `access_token`.
    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser>;
}

/// Token grant as returned by the auth endpoints.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .and_then(TimeDelta::try_seconds)
                    .and_then(|span| now.checked_add_signed(span))
            });
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Auth service over HTTP (`{url}/auth/v1`).
pub struct RestAuthService {
    http: reqwest::Client,
    auth_url: String,
    anon_key: String,
}

impl RestAuthService {
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            auth_url: format!("{}/auth/v1", config.base_url()),
            anon_key: config.anon_key.clone(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
    }

    async fn send_one(&self, request: reqwest::RequestBuilder) -> BackendResult<serde_json::Value> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let mut rows = read_rows("auth", response).await?;
        rows.pop().ok_or_else(|| BackendError::Empty("auth".into()))
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> BackendResult<T> {
    serde_json::from_value(value).map_err(|e| BackendError::Decode {
        table: "auth".into(),
        message: e.to_string(),
    })
}

#[async_trait]
impl AuthService for RestAuthService {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<AuthSession> {
        let request = self
            .post("token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let token: TokenResponse = decode(self.send_one(request).await?)?;
        Ok(token.into_session(Utc::now()))
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUp> {
        let request = self
            .post("signup")
            .json(&json!({ "email": email, "password": password }));
        let body = self.send_one(request).await?;
        // With email confirmation enabled the body is the bare user.
        if body.get("access_token").is_some() {
            let session = decode::<TokenResponse>(body)?.into_session(Utc::now());
            Ok(SignUp {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            Ok(SignUp {
                user: decode(body)?,
                session: None,
            })
        }
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let response = self
            .post("logout")
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        read_rows("auth", response).await.map(|_| ())
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser> {
        let request = self
            .http
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {access_token}"));
        decode(self.send_one(request).await?)
    }
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthUser,
}

#[derive(Debug, Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, UserId>,
    fail_sign_out: bool,
}

/// In-memory auth service for tests and offline demos.
#[derive(Debug, Default)]
pub struct InMemoryAuthService {
    state: RwLock<AuthState>,
}

impl InMemoryAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account directly, bypassing sign-up.
    pub fn register(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: UserId::new(),
            email: Some(email.to_string()),
            created_at: Some(Utc::now()),
            last_sign_in_at: None,
        };
        self.write().accounts.insert(
            email.to_ascii_lowercase(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    /// Make remote sign-out fail (the client must still tear down locally).
    pub fn fail_sign_out(&self, fail: bool) {
        self.write().fail_sign_out = fail;
    }

    pub fn active_tokens(&self) -> usize {
        self.read().tokens.len()
    }

    fn issue(&self, user: &AuthUser) -> AuthSession {
        let token = Uuid::new_v4().to_string();
        self.write().tokens.insert(token.clone(), user.id);
        AuthSession {
            access_token: token,
            refresh_token: Some(Uuid::new_v4().to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            user: user.clone(),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn invalid_credentials() -> BackendError {
    BackendError::api(
        400,
        Some("invalid_credentials".into()),
        "Invalid login credentials",
    )
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<AuthSession> {
        let account = self
            .read()
            .accounts
            .get(&email.to_ascii_lowercase())
            .cloned()
            .ok_or_else(invalid_credentials)?;
        if account.password != password {
            return Err(invalid_credentials());
        }
        let mut user = account.user;
        user.last_sign_in_at = Some(Utc::now());
        Ok(self.issue(&user))
    }

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUp> {
        if self.read().accounts.contains_key(&email.to_ascii_lowercase()) {
            return Err(BackendError::api(
                422,
                Some("user_already_exists".into()),
                "User already registered",
            ));
        }
        if password.len() < 6 {
            return Err(BackendError::api(
                422,
                Some("weak_password".into()),
                "Password should be at least 6 characters",
            ));
        }
        let user = self.register(email, password);
        let session = self.issue(&user);
        Ok(SignUp {
            user,
            session: Some(session),
        })
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let mut state = self.write();
        if state.fail_sign_out {
            return Err(BackendError::Network("connection reset".into()));
        }
        state.tokens.remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser> {
        let state = self.read();
        let user_id = state.tokens.get(access_token).copied().ok_or_else(|| {
            BackendError::api(401, Some("bad_jwt".into()), "invalid JWT: token is not valid")
        })?;
        state
            .accounts
            .values()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| BackendError::api(404, Some("user_not_found".into()), "User not found"))
    }
}
