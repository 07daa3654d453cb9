use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use ceramerp_core::Entity;

use crate::error::{BackendError, BackendResult};
use crate::query::{Filter, Query};

/// Table-oriented data API of the backend.
///
/// Rows travel as JSON objects; [`Table`] adds typed decoding on top. Every
/// write returns the rows as stored by the backend (ids, defaults and
/// triggers applied).
#[async_trait]
pub trait DataApi: Send + Sync {
    /// Read rows matching `query`.
    async fn select(&self, table: &str, query: &Query) -> BackendResult<Vec<Value>>;

    /// Insert one object or an array of objects.
    async fn insert(&self, table: &str, rows: Value) -> BackendResult<Vec<Value>>;

    /// Apply `patch` to every row matching all `filters`.
    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> BackendResult<Vec<Value>>;

    /// Insert, or update the row that collides on the `on_conflict` columns.
    async fn upsert(
        &self,
        table: &str,
        rows: Value,
        on_conflict: &[&str],
    ) -> BackendResult<Vec<Value>>;

    /// Delete every row matching all `filters`.
    async fn delete(&self, table: &str, filters: &[Filter]) -> BackendResult<Vec<Value>>;

    /// Bearer token used for subsequent calls (`None` = anonymous).
    fn set_access_token(&self, _token: Option<String>) {}
}

/// Typed handle over one table of a [`DataApi`].
#[derive(Clone, Copy)]
pub struct Table<'a> {
    api: &'a dyn DataApi,
    name: &'a str,
}

impl<'a> Table<'a> {
    pub fn new(api: &'a dyn DataApi, name: &'a str) -> Self {
        Self { api, name }
    }

    /// Handle for the table an entity is stored in.
    pub fn of<E: Entity>(api: &'a dyn DataApi) -> Self {
        Self::new(api, E::TABLE)
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> BackendResult<Vec<T>> {
        let rows = self.api.select(self.name, query).await?;
        self.decode_all(rows)
    }

    pub async fn fetch_optional<T: DeserializeOwned>(
        &self,
        query: &Query,
    ) -> BackendResult<Option<T>> {
        let query = query.clone().limit(1);
        let mut rows = self.api.select(self.name, &query).await?;
        match rows.pop() {
            Some(row) => self.decode(row).map(Some),
            None => Ok(None),
        }
    }

    pub async fn fetch_one<T: DeserializeOwned>(&self, query: &Query) -> BackendResult<T> {
        self.fetch_optional(query)
            .await?
            .ok_or_else(|| BackendError::Empty(self.name.to_string()))
    }

    pub async fn insert<B, T>(&self, row: &B) -> BackendResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let rows = self.api.insert(self.name, self.encode(row)?).await?;
        self.first(rows)
    }

    pub async fn insert_many<B, T>(&self, rows: &[B]) -> BackendResult<Vec<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let stored = self.api.insert(self.name, self.encode(rows)?).await?;
        self.decode_all(stored)
    }

    pub async fn update<B, T>(&self, filters: &[Filter], patch: &B) -> BackendResult<Vec<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let rows = self.api.update(self.name, filters, self.encode(patch)?).await?;
        self.decode_all(rows)
    }

    /// Update exactly the rows matching `filters` and return the first one.
    pub async fn update_one<B, T>(&self, filters: &[Filter], patch: &B) -> BackendResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let rows = self.api.update(self.name, filters, self.encode(patch)?).await?;
        self.first(rows)
    }

    pub async fn upsert<B, T>(&self, row: &B, on_conflict: &[&str]) -> BackendResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let rows = self
            .api
            .upsert(self.name, self.encode(row)?, on_conflict)
            .await?;
        self.first(rows)
    }

    /// Delete matching rows; returns how many were removed.
    pub async fn delete(&self, filters: &[Filter]) -> BackendResult<usize> {
        Ok(self.api.delete(self.name, filters).await?.len())
    }

    fn encode<B: Serialize + ?Sized>(&self, body: &B) -> BackendResult<Value> {
        serde_json::to_value(body).map_err(|e| BackendError::InvalidRequest(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, row: Value) -> BackendResult<T> {
        serde_json::from_value(row).map_err(|e| BackendError::Decode {
            table: self.name.to_string(),
            message: e.to_string(),
        })
    }

    fn decode_all<T: DeserializeOwned>(&self, rows: Vec<Value>) -> BackendResult<Vec<T>> {
        rows.into_iter().map(|row| self.decode(row)).collect()
    }

    fn first<T: DeserializeOwned>(&self, rows: Vec<Value>) -> BackendResult<T> {
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Empty(self.name.to_string()))?;
        self.decode(row)
    }
}
