use rust_decimal::Decimal;
use serde_json::{Value, json};

use ceramerp_backend::schema::{INVENTORY_MOVEMENTS, INVENTORY_STOCK, SALES_ORDER_ITEMS, SALES_ORDERS};
use ceramerp_backend::{Filter, Query};
use ceramerp_inventory::{InventoryStock, MovementReason, NewMovement, WarehouseId};
use ceramerp_sales::{SalesOrder, SalesOrderId, SalesOrderInput, SalesOrderStatus};

use crate::cache::{DASHBOARD, QueryKey};
use crate::client::ErpClient;
use crate::error::{ClientError, ClientResult};
use crate::hooks::{Mutation, ensure_deleted, validate};

const ORDER_SELECT: &str = "*, customer:customers(id, code, name), \
     sales_order_items(*, item:items(id, code, description, unit))";

const WRITE: Mutation = Mutation {
    success: "Sales order saved",
    failure: "Could not save sales order",
    invalidates: &[SALES_ORDERS, DASHBOARD],
};
const DELETE: Mutation = Mutation {
    success: "Sales order deleted",
    failure: "Could not delete sales order",
    invalidates: &[SALES_ORDERS, DASHBOARD],
};
const STATUS: Mutation = Mutation {
    success: "Sales order status updated",
    failure: "Could not update sales order status",
    invalidates: &[SALES_ORDERS, DASHBOARD],
};
const SHIP: Mutation = Mutation {
    success: "Sales order shipped",
    failure: "Could not ship sales order",
    invalidates: &[SALES_ORDERS, INVENTORY_STOCK, INVENTORY_MOVEMENTS, DASHBOARD],
};

pub struct SalesOrderHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> SalesOrderHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Vec<SalesOrder>> {
        self.client
            .cached_rows(
                QueryKey::new(SALES_ORDERS),
                SALES_ORDERS,
                Query::new()
                    .select(ORDER_SELECT)
                    .order_desc("order_date")
                    .order_desc("created_at"),
            )
            .await
    }

    pub async fn get(&self, id: SalesOrderId) -> ClientResult<SalesOrder> {
        self.client
            .find(
                SALES_ORDERS,
                &Query::new().select(ORDER_SELECT).eq("id", id),
                format!("sales order {id}"),
            )
            .await
    }

    /// Insert header and lines; a header whose lines failed is removed.
    pub async fn create(&self, input: SalesOrderInput) -> ClientResult<SalesOrder> {
        validate(&input)?;
        let draft = input.draft();
        self.client
            .mutate(&WRITE, async {
                let header: SalesOrder = self
                    .client
                    .table(SALES_ORDERS)
                    .insert(&draft.header)
                    .await?;
                let lines = draft.lines_for(header.id);
                let inserted = if lines.is_empty() {
                    Ok(Vec::new())
                } else {
                    self.client
                        .table(SALES_ORDER_ITEMS)
                        .insert_many::<_, Value>(&lines)
                        .await
                };
                if let Err(e) = inserted {
                    let cleanup = self
                        .client
                        .table(SALES_ORDERS)
                        .delete(&[Filter::eq("id", header.id)])
                        .await;
                    if let Err(cleanup) = cleanup {
                        tracing::warn!(order_id = %header.id, error = %cleanup, "failed to remove header of incomplete sales order");
                    }
                    return Err(e.into());
                }
                tracing::info!(
                    order_id = %header.id,
                    order_number = %header.order_number,
                    total = %header.total,
                    "sales order created"
                );
                self.get(header.id).await
            })
            .await
    }

    /// Replace header fields and lines while the order is still a draft.
    pub async fn update(&self, id: SalesOrderId, input: SalesOrderInput) -> ClientResult<SalesOrder> {
        validate(&input)?;
        let draft = input.draft();
        self.client
            .mutate(&WRITE, async {
                let current = self.get(id).await?;
                if current.status != SalesOrderStatus::Draft {
                    return Err(ClientError::conflict(format!(
                        "sales order {} is no longer a draft",
                        current.order_number
                    )));
                }
                let _: SalesOrder = self
                    .client
                    .table(SALES_ORDERS)
                    .update_one(&[Filter::eq("id", id)], &draft.header)
                    .await?;
                let lines_table = self.client.table(SALES_ORDER_ITEMS);
                lines_table
                    .delete(&[Filter::eq("sales_order_id", id)])
                    .await?;
                let lines = draft.lines_for(id);
                if !lines.is_empty() {
                    lines_table.insert_many::<_, Value>(&lines).await?;
                }
                self.get(id).await
            })
            .await
    }

    pub async fn delete(&self, id: SalesOrderId) -> ClientResult<()> {
        self.client
            .mutate(&DELETE, async {
                self.client
                    .table(SALES_ORDER_ITEMS)
                    .delete(&[Filter::eq("sales_order_id", id)])
                    .await?;
                let removed = self
                    .client
                    .table(SALES_ORDERS)
                    .delete(&[Filter::eq("id", id)])
                    .await?;
                ensure_deleted(removed, format!("sales order {id}"))
            })
            .await
    }

    /// Status changes other than shipping, which is done by [`ship`](Self::ship).
    pub async fn set_status(
        &self,
        id: SalesOrderId,
        status: SalesOrderStatus,
    ) -> ClientResult<SalesOrder> {
        self.client
            .mutate(&STATUS, async {
                if status == SalesOrderStatus::Shipped {
                    return Err(ClientError::conflict(
                        "use ship to mark a sales order as shipped",
                    ));
                }
                let order = self.get(id).await?;
                order.ensure_transition(status)?;
                Ok(self
                    .client
                    .table(SALES_ORDERS)
                    .update_one(&[Filter::eq("id", id)], &json!({ "status": status }))
                    .await?)
            })
            .await
    }

    /// Take every line out of `warehouse_id` and mark the order shipped.
    ///
    /// All rows are checked for sufficient stock before anything is written.
    /// The order is then claimed as shipped, so it ships at most once. If a
    /// stock write fails, quantities already taken out are put back and the
    /// order returns to its previous status.
    pub async fn ship(&self, id: SalesOrderId, warehouse_id: WarehouseId) -> ClientResult<SalesOrder> {
        self.client
            .mutate(&SHIP, async {
                let order = self.get(id).await?;
                order.ensure_shippable()?;
                order.ensure_transition(SalesOrderStatus::Shipped)?;

                let mut plan: Vec<(InventoryStock, Decimal)> = Vec::new();
                for (item_id, quantity) in order.shipment_quantities() {
                    let row = self
                        .client
                        .stock_slot(item_id, warehouse_id)
                        .await?
                        .ok_or_else(|| {
                            ClientError::conflict(format!(
                                "no stock of item {item_id} in warehouse {warehouse_id}"
                            ))
                        })?;
                    let remaining = row.withdraw(quantity)?;
                    plan.push((row, remaining));
                }

                let shipped: SalesOrder = self
                    .client
                    .claim_status(SALES_ORDERS, id, order.status, SalesOrderStatus::Shipped)
                    .await?;

                let mut written: Vec<(Decimal, InventoryStock)> = Vec::new();
                let mut movements: Vec<NewMovement> = Vec::new();
                let reference = format!("sales_order:{}", order.order_number);
                for (row, remaining) in plan {
                    match self.client.set_quantity(&row, remaining).await {
                        Ok(after) => {
                            movements.push(
                                NewMovement::from_snapshots(
                                    &row,
                                    &after,
                                    MovementReason::SalesShipment,
                                )
                                .with_reference(reference.clone()),
                            );
                            written.push((row.quantity, after));
                        }
                        Err(e) => {
                            self.client.restore_stock(&written).await;
                            self.client
                                .release_status(
                                    SALES_ORDERS,
                                    id,
                                    SalesOrderStatus::Shipped,
                                    order.status,
                                )
                                .await;
                            return Err(e);
                        }
                    }
                }
                self.client.append_movements(&movements).await;

                tracing::info!(order_id = %id, %warehouse_id, "sales order shipped");
                Ok(shipped)
            })
            .await
    }
}
