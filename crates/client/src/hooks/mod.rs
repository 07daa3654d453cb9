//! Per-entity hooks: cached reads and notified mutations.
//!
//! Every mutation follows the same contract: validate, write, invalidate the
//! dependent cache keys, notify. A failed write notifies once with the
//! backend's message and returns the error; validation failures are returned
//! without a notification.

mod accounting;
mod categories;
mod customers;
mod dashboard;
mod items;
mod purchase_orders;
mod sales_orders;
mod stock;
mod suppliers;
mod taxes;
mod transfers;
mod treasury;
mod warehouses;

use std::fmt::{Debug, Display};
use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use validator::Validate;

use ceramerp_backend::schema::INVENTORY_MOVEMENTS;
use ceramerp_backend::{Filter, Query, Table};
use ceramerp_inventory::NewMovement;

use crate::cache::QueryKey;
use crate::client::ErpClient;
use crate::error::{ClientError, ClientResult};
use crate::notify::Notification;

pub use accounting::AccountingHooks;
pub use categories::CategoryHooks;
pub use customers::CustomerHooks;
pub use dashboard::DashboardHooks;
pub use items::ItemHooks;
pub use purchase_orders::PurchaseOrderHooks;
pub use sales_orders::SalesOrderHooks;
pub use stock::StockHooks;
pub use suppliers::SupplierHooks;
pub use taxes::TaxHooks;
pub use transfers::TransferHooks;
pub use treasury::TreasuryHooks;
pub use warehouses::WarehouseHooks;

/// Notification texts and cache roots of one kind of write.
pub(crate) struct Mutation {
    pub success: &'static str,
    pub failure: &'static str,
    pub invalidates: &'static [&'static str],
}

pub(crate) fn validate<V: Validate>(input: &V) -> ClientResult<()> {
    input.validate().map_err(ClientError::from)
}

impl ErpClient {
    pub(crate) fn table<'a>(&'a self, name: &'a str) -> Table<'a> {
        Table::new(self.data.as_ref(), name)
    }

    /// Rows of `table` through the query cache.
    pub(crate) async fn cached_rows<T>(
        &self,
        key: QueryKey,
        table: &'static str,
        query: Query,
    ) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.cache
            .fetch(key, || async move {
                self.table(table).fetch::<T>(&query).await.map_err(|e| {
                    tracing::warn!(table, error = %e, "read failed");
                    ClientError::from(e)
                })
            })
            .await
    }

    /// Single row, uncached. No match is [`ClientError::NotFound`].
    pub(crate) async fn find<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: &Query,
        what: impl core::fmt::Display,
    ) -> ClientResult<T> {
        self.table(table)
            .fetch_optional(query)
            .await?
            .ok_or_else(|| ClientError::not_found(what.to_string()))
    }

    pub(crate) async fn mutate<T>(
        &self,
        mutation: &Mutation,
        work: impl Future<Output = ClientResult<T>>,
    ) -> ClientResult<T> {
        match work.await {
            Ok(value) => {
                self.cache.invalidate_roots(mutation.invalidates);
                tracing::info!(mutation = mutation.success, "mutation applied");
                self.notifier.notify(Notification::success(mutation.success));
                Ok(value)
            }
            Err(e) => {
                if !e.is_validation() {
                    tracing::warn!(mutation = mutation.failure, error = %e, "mutation failed");
                    self.notifier
                        .notify(Notification::error(mutation.failure, e.user_message()));
                }
                Err(e)
            }
        }
    }

    /// Move a document from `from` to `to`, only while it still is `from`.
    ///
    /// Stock-moving actions claim their document this way before the first
    /// stock write, so a second or concurrent run is a conflict.
    pub(crate) async fn claim_status<I, S, T>(
        &self,
        table: &'static str,
        id: I,
        from: S,
        to: S,
    ) -> ClientResult<T>
    where
        I: Serialize + Display,
        S: Serialize + Debug,
        T: DeserializeOwned,
    {
        let claimed: Vec<T> = self
            .table(table)
            .update(
                &[Filter::eq("id", &id), Filter::eq("status", &from)],
                &json!({ "status": &to }),
            )
            .await?;
        claimed.into_iter().next().ok_or_else(|| {
            ClientError::conflict(format!("{table} row {id} is no longer {from:?}"))
        })
    }

    /// Undo [`claim_status`](Self::claim_status) after a failed stock write.
    pub(crate) async fn release_status<I, S>(&self, table: &'static str, id: I, claimed: S, back: S)
    where
        I: Serialize + Display,
        S: Serialize + Debug,
    {
        let result = self
            .table(table)
            .update::<_, Value>(
                &[Filter::eq("id", &id), Filter::eq("status", &claimed)],
                &json!({ "status": &back }),
            )
            .await;
        if let Err(e) = result {
            tracing::error!(
                table,
                %id,
                status = ?claimed,
                error = %e,
                "failed to release status after a failed stock write"
            );
        }
    }

    /// Append audit movements after a stock write that already succeeded.
    ///
    /// Failures are logged and dropped; the stock write stands.
    pub(crate) async fn append_movements(&self, movements: &[NewMovement]) {
        if movements.is_empty() {
            return;
        }
        let result = self
            .table(INVENTORY_MOVEMENTS)
            .insert_many::<NewMovement, Value>(movements)
            .await;
        if let Err(e) = result {
            tracing::warn!(
                count = movements.len(),
                error = %e,
                "failed to record inventory movement; stock change kept"
            );
        }
    }
}

/// Delete zero rows means the row was already gone (or hidden by row-level
/// security).
pub(crate) fn ensure_deleted(removed: usize, what: impl core::fmt::Display) -> ClientResult<()> {
    if removed == 0 {
        return Err(ClientError::not_found(what.to_string()));
    }
    Ok(())
}
