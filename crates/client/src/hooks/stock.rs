use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ceramerp_backend::schema::{INVENTORY_MOVEMENTS, INVENTORY_STOCK, INVENTORY_STOCK_CONFLICT};
use ceramerp_backend::{Filter, Query};
use ceramerp_inventory::{
    InventoryMovement, InventoryStock, MovementFilter, MovementReason, NewMovement,
    StockAdjustment, StockId, StockUpsert, WarehouseId,
};
use ceramerp_products::ItemId;

use crate::cache::{DASHBOARD, QueryKey};
use crate::client::ErpClient;
use crate::config::AdjustmentGuard;
use crate::error::{ClientError, ClientResult};
use crate::hooks::{Mutation, validate};

const STOCK_SELECT: &str =
    "*, item:items(id, code, description, unit), warehouse:warehouses(id, code, name)";
const MOVEMENT_SELECT: &str =
    "*, item:items(id, code, description), warehouse:warehouses(id, code, name)";

const ADJUST: Mutation = Mutation {
    success: "Stock adjusted",
    failure: "Could not adjust stock",
    invalidates: &[INVENTORY_STOCK, INVENTORY_MOVEMENTS, DASHBOARD],
};
const UPSERT: Mutation = Mutation {
    success: "Stock saved",
    failure: "Could not save stock",
    invalidates: &[INVENTORY_STOCK, INVENTORY_MOVEMENTS, DASHBOARD],
};

#[derive(Serialize)]
struct AdjustmentPatch<'a> {
    #[serde(flatten)]
    adjustment: &'a StockAdjustment,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct QuantityPatch {
    quantity: Decimal,
    updated_at: DateTime<Utc>,
}

pub struct StockHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> StockHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Stock rows with item and warehouse, ordered by item code then
    /// warehouse code.
    pub async fn list(&self) -> ClientResult<Vec<InventoryStock>> {
        let mut rows: Vec<InventoryStock> = self
            .client
            .cached_rows(
                QueryKey::new(INVENTORY_STOCK),
                INVENTORY_STOCK,
                Query::new().select(STOCK_SELECT),
            )
            .await?;
        rows.sort_by(|a, b| {
            let warehouse = |row: &InventoryStock| row.warehouse.as_ref().map(|w| w.code.clone());
            a.item_code()
                .cmp(&b.item_code())
                .then_with(|| warehouse(a).cmp(&warehouse(b)))
        });
        Ok(rows)
    }

    /// Rows whose quantity is below their minimum.
    pub async fn low_stock(&self) -> ClientResult<Vec<InventoryStock>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(InventoryStock::is_below_minimum)
            .collect())
    }

    pub async fn get(&self, id: StockId) -> ClientResult<InventoryStock> {
        self.client
            .find(
                INVENTORY_STOCK,
                &Query::new().select(STOCK_SELECT).eq("id", id),
                format!("stock row {id}"),
            )
            .await
    }

    /// Set quantity and thresholds of one stock row and log the change.
    ///
    /// The movement is appended only after the write succeeded, and a failed
    /// append does not fail the adjustment.
    pub async fn adjust(
        &self,
        id: StockId,
        adjustment: StockAdjustment,
    ) -> ClientResult<InventoryStock> {
        validate(&adjustment)?;
        self.client
            .mutate(&ADJUST, async {
                let before: InventoryStock = self
                    .client
                    .find(
                        INVENTORY_STOCK,
                        &Query::new().eq("id", id),
                        format!("stock row {id}"),
                    )
                    .await?;

                let patch = AdjustmentPatch {
                    adjustment: &adjustment,
                    updated_at: Utc::now(),
                };
                let after = self.client.write_stock(&before, &patch).await?;

                tracing::info!(
                    stock_id = %id,
                    before = %before.quantity,
                    after = %after.quantity,
                    "stock adjusted"
                );
                let movement =
                    NewMovement::from_snapshots(&before, &after, MovementReason::ManualAdjustment);
                self.client.append_movements(&[movement]).await;
                Ok(after)
            })
            .await
    }

    /// Insert or update the row of an `(item, warehouse)` pair.
    ///
    /// A new pair is logged as initial stock; a changed quantity on an
    /// existing pair as a manual adjustment.
    pub async fn upsert(&self, row: StockUpsert) -> ClientResult<InventoryStock> {
        validate(&row)?;
        self.client
            .mutate(&UPSERT, async {
                let before = self.client.stock_slot(row.item_id, row.warehouse_id).await?;
                let after: InventoryStock = self
                    .client
                    .table(INVENTORY_STOCK)
                    .upsert(&row, INVENTORY_STOCK_CONFLICT)
                    .await?;

                let movement = match before {
                    None => Some(NewMovement::between(
                        after.item_id,
                        after.warehouse_id,
                        Decimal::ZERO,
                        after.quantity,
                        MovementReason::InitialStock,
                    )),
                    Some(before) if before.quantity != after.quantity => Some(
                        NewMovement::from_snapshots(&before, &after, MovementReason::ManualAdjustment),
                    ),
                    Some(_) => None,
                };
                if let Some(movement) = movement {
                    self.client.append_movements(&[movement]).await;
                }
                Ok(after)
            })
            .await
    }

    /// Movement history, newest first.
    pub async fn movements(&self, filter: MovementFilter) -> ClientResult<Vec<InventoryMovement>> {
        let mut key = QueryKey::new(INVENTORY_MOVEMENTS);
        let mut query = Query::new().select(MOVEMENT_SELECT);
        if let Some(item_id) = filter.item_id {
            key = key.with(format!("item={item_id}"));
            query = query.eq("item_id", item_id);
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            key = key.with(format!("warehouse={warehouse_id}"));
            query = query.eq("warehouse_id", warehouse_id);
        }
        if let Some(reason) = filter.reason {
            key = key.with(format!("reason={reason}"));
            query = query.eq("reason", reason);
        }
        key = key.with(format!("limit={}", filter.limit));
        query = query.order_desc("created_at").limit(filter.limit);

        self.client
            .cached_rows(key, INVENTORY_MOVEMENTS, query)
            .await
    }
}

impl ErpClient {
    /// Stock row of an `(item, warehouse)` pair, if one exists.
    pub(crate) async fn stock_slot(
        &self,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> ClientResult<Option<InventoryStock>> {
        let query = Query::new()
            .eq("item_id", item_id)
            .eq("warehouse_id", warehouse_id);
        Ok(self.table(INVENTORY_STOCK).fetch_optional(&query).await?)
    }

    /// Patch the row read as `before`.
    ///
    /// Under the snapshot guard the write only applies while the quantity
    /// still equals `before.quantity`; otherwise it is a conflict.
    pub(crate) async fn write_stock<P: Serialize + Sync>(
        &self,
        before: &InventoryStock,
        patch: &P,
    ) -> ClientResult<InventoryStock> {
        let mut filters = vec![Filter::eq("id", before.id)];
        if self.adjustment_guard == AdjustmentGuard::Snapshot {
            filters.push(Filter::eq("quantity", before.quantity));
        }
        let written: Vec<InventoryStock> = self
            .table(INVENTORY_STOCK)
            .update(&filters, patch)
            .await?;
        written.into_iter().next().ok_or_else(|| match self.adjustment_guard {
            AdjustmentGuard::Snapshot => ClientError::conflict(format!(
                "stock changed since it was read (quantity was {}); reload and try again",
                before.quantity
            )),
            AdjustmentGuard::Unguarded => ClientError::not_found(format!("stock row {}", before.id)),
        })
    }

    /// Set the quantity of an existing row, keeping its thresholds.
    pub(crate) async fn set_quantity(
        &self,
        before: &InventoryStock,
        quantity: Decimal,
    ) -> ClientResult<InventoryStock> {
        let patch = QuantityPatch {
            quantity,
            updated_at: Utc::now(),
        };
        self.write_stock(before, &patch).await
    }

    /// Add `amount` to an `(item, warehouse)` pair, creating the row if needed.
    ///
    /// Returns the quantity before the write and the written row.
    pub(crate) async fn add_stock(
        &self,
        item_id: ItemId,
        warehouse_id: WarehouseId,
        amount: Decimal,
    ) -> ClientResult<(Decimal, InventoryStock)> {
        match self.stock_slot(item_id, warehouse_id).await? {
            Some(row) => {
                let after = self.set_quantity(&row, row.quantity + amount).await?;
                Ok((row.quantity, after))
            }
            None => {
                let row = StockUpsert::new(item_id, warehouse_id, amount);
                let after: InventoryStock = self
                    .table(INVENTORY_STOCK)
                    .upsert(&row, INVENTORY_STOCK_CONFLICT)
                    .await?;
                Ok((Decimal::ZERO, after))
            }
        }
    }

    /// Put written rows back to the quantity they had before.
    ///
    /// Used when a multi-row stock action fails part way. Failures are
    /// logged; there is nothing further to fall back to.
    pub(crate) async fn restore_stock(&self, written: &[(Decimal, InventoryStock)]) {
        for (before, after) in written.iter().rev() {
            if let Err(e) = self.set_quantity(after, *before).await {
                tracing::error!(
                    stock_id = %after.id,
                    quantity = %before,
                    error = %e,
                    "failed to restore stock after a failed action"
                );
            }
        }
    }
}
