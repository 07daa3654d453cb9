//! REST implementation of [`DataApi`] against the hosted backend.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::api::DataApi;
use crate::error::{BackendError, BackendResult, ErrorBody};
use crate::query::{Filter, Query};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the hosted backend lives and how to identify this client to it.
#[derive(Clone, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl core::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub(crate) fn http_client(&self) -> BackendResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))
    }
}

/// Data API over HTTP (`{url}/rest/v1/{table}`).
pub struct RestDataApi {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

impl RestDataApi {
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            rest_url: format!("{}/rest/v1", config.base_url()),
            anon_key: config.anon_key.clone(),
            access_token: RwLock::new(None),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let token = self
            .access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| self.anon_key.clone());

        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    fn with_filters(request: RequestBuilder, filters: &[Filter]) -> RequestBuilder {
        let params: Vec<(String, String)> = filters.iter().map(Filter::to_param).collect();
        request.query(&params)
    }

    async fn send(&self, table: &str, request: RequestBuilder) -> BackendResult<Vec<Value>> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        read_rows(table, response).await
    }
}

/// Decode a response body into rows, or the backend's error.
pub(crate) async fn read_rows(table: &str, response: Response) -> BackendResult<Vec<Value>> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Network(e.to_string()))?;

    if !status.is_success() {
        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let error = parsed.into_error(status.as_u16(), &body);
        tracing::debug!(table, status = status.as_u16(), error = %error, "backend request failed");
        return Err(error);
    }

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(Value::Null) => Ok(Vec::new()),
        Ok(row) => Ok(vec![row]),
        Err(e) => Err(BackendError::Decode {
            table: table.to_string(),
            message: e.to_string(),
        }),
    }
}

#[async_trait]
impl DataApi for RestDataApi {
    async fn select(&self, table: &str, query: &Query) -> BackendResult<Vec<Value>> {
        let request = self.request(Method::GET, table).query(&query.to_params());
        self.send(table, request).await
    }

    async fn insert(&self, table: &str, rows: Value) -> BackendResult<Vec<Value>> {
        let request = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&rows);
        self.send(table, request).await
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> BackendResult<Vec<Value>> {
        let request = Self::with_filters(self.request(Method::PATCH, table), filters)
            .header("Prefer", "return=representation")
            .json(&patch);
        self.send(table, request).await
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Value,
        on_conflict: &[&str],
    ) -> BackendResult<Vec<Value>> {
        let mut request = self
            .request(Method::POST, table)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&rows);
        if !on_conflict.is_empty() {
            request = request.query(&[("on_conflict", on_conflict.join(","))]);
        }
        self.send(table, request).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> BackendResult<Vec<Value>> {
        let request = Self::with_filters(self.request(Method::DELETE, table), filters)
            .header("Prefer", "return=representation");
        self.send(table, request).await
    }

    fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }
}
