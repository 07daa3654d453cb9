use rust_decimal::Decimal;
use serde_json::{Value, json};

use ceramerp_backend::schema::{
    INVENTORY_MOVEMENTS, INVENTORY_STOCK, PURCHASE_ORDER_ITEMS, PURCHASE_ORDERS,
};
use ceramerp_backend::{Filter, Query};
use ceramerp_inventory::{InventoryStock, MovementReason, NewMovement, WarehouseId};
use ceramerp_purchasing::{
    NewPurchaseOrderLine, PurchaseOrder, PurchaseOrderId, PurchaseOrderInput,
    PurchaseOrderStatus,
};

use crate::cache::{DASHBOARD, QueryKey};
use crate::client::ErpClient;
use crate::error::{ClientError, ClientResult};
use crate::hooks::{Mutation, ensure_deleted, validate};

const ORDER_SELECT: &str = "*, supplier:suppliers(id, code, name), \
     purchase_order_items(*, item:items(id, code, description, unit))";

const CREATE: Mutation = Mutation {
    success: "Purchase order created",
    failure: "Could not create purchase order",
    invalidates: &[PURCHASE_ORDERS, DASHBOARD],
};
const UPDATE: Mutation = Mutation {
    success: "Purchase order updated",
    failure: "Could not update purchase order",
    invalidates: &[PURCHASE_ORDERS, DASHBOARD],
};
const DELETE: Mutation = Mutation {
    success: "Purchase order deleted",
    failure: "Could not delete purchase order",
    invalidates: &[PURCHASE_ORDERS, DASHBOARD],
};
const STATUS: Mutation = Mutation {
    success: "Purchase order status updated",
    failure: "Could not update purchase order status",
    invalidates: &[PURCHASE_ORDERS, DASHBOARD],
};
const RECEIVE: Mutation = Mutation {
    success: "Goods received",
    failure: "Could not receive purchase order",
    invalidates: &[PURCHASE_ORDERS, INVENTORY_STOCK, INVENTORY_MOVEMENTS, DASHBOARD],
};

pub struct PurchaseOrderHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> PurchaseOrderHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Orders with supplier and lines, most recent first.
    pub async fn list(&self) -> ClientResult<Vec<PurchaseOrder>> {
        self.client
            .cached_rows(
                QueryKey::new(PURCHASE_ORDERS),
                PURCHASE_ORDERS,
                Query::new()
                    .select(ORDER_SELECT)
                    .order_desc("order_date")
                    .order_desc("created_at"),
            )
            .await
    }

    pub async fn get(&self, id: PurchaseOrderId) -> ClientResult<PurchaseOrder> {
        self.client
            .find(
                PURCHASE_ORDERS,
                &Query::new().select(ORDER_SELECT).eq("id", id),
                format!("purchase order {id}"),
            )
            .await
    }

    /// Insert the header, then its lines.
    ///
    /// When the lines cannot be written the header is removed again so no
    /// order is left without lines.
    pub async fn create(&self, input: PurchaseOrderInput) -> ClientResult<PurchaseOrder> {
        validate(&input)?;
        let draft = input.draft();
        self.client
            .mutate(&CREATE, async {
                let header: PurchaseOrder = self
                    .client
                    .table(PURCHASE_ORDERS)
                    .insert(&draft.header)
                    .await?;
                if let Err(e) = self.insert_lines(&draft.lines_for(header.id)).await {
                    self.discard_header(header.id).await;
                    return Err(e);
                }
                tracing::info!(
                    order_id = %header.id,
                    order_number = %header.order_number,
                    lines = draft.line_count(),
                    total = %header.total,
                    "purchase order created"
                );
                self.get(header.id).await
            })
            .await
    }

    /// Replace header fields and lines of a draft order.
    pub async fn update(
        &self,
        id: PurchaseOrderId,
        input: PurchaseOrderInput,
    ) -> ClientResult<PurchaseOrder> {
        validate(&input)?;
        let draft = input.draft();
        self.client
            .mutate(&UPDATE, async {
                let current = self.get(id).await?;
                if current.status != PurchaseOrderStatus::Draft {
                    return Err(ClientError::conflict(format!(
                        "purchase order {} is no longer a draft",
                        current.order_number
                    )));
                }
                let _: PurchaseOrder = self
                    .client
                    .table(PURCHASE_ORDERS)
                    .update_one(&[Filter::eq("id", id)], &draft.header)
                    .await?;
                self.client
                    .table(PURCHASE_ORDER_ITEMS)
                    .delete(&[Filter::eq("purchase_order_id", id)])
                    .await?;
                self.insert_lines(&draft.lines_for(id)).await?;
                self.get(id).await
            })
            .await
    }

    /// Delete the lines, then the header.
    pub async fn delete(&self, id: PurchaseOrderId) -> ClientResult<()> {
        self.client
            .mutate(&DELETE, async {
                self.client
                    .table(PURCHASE_ORDER_ITEMS)
                    .delete(&[Filter::eq("purchase_order_id", id)])
                    .await?;
                let removed = self
                    .client
                    .table(PURCHASE_ORDERS)
                    .delete(&[Filter::eq("id", id)])
                    .await?;
                ensure_deleted(removed, format!("purchase order {id}"))
            })
            .await
    }

    /// Move an order along its lifecycle. Receiving goes through
    /// [`receive`](Self::receive) so stock is updated with it.
    pub async fn set_status(
        &self,
        id: PurchaseOrderId,
        status: PurchaseOrderStatus,
    ) -> ClientResult<PurchaseOrder> {
        self.client
            .mutate(&STATUS, async {
                if status == PurchaseOrderStatus::Received {
                    return Err(ClientError::conflict(
                        "use receive to mark a purchase order as received",
                    ));
                }
                let order = self.get(id).await?;
                order.ensure_transition(status)?;
                Ok(self
                    .client
                    .table(PURCHASE_ORDERS)
                    .update_one(&[Filter::eq("id", id)], &json!({ "status": status }))
                    .await?)
            })
            .await
    }

    /// Book every line into `warehouse_id` and mark the order received.
    ///
    /// The order is claimed as received before the first stock write, so it
    /// is booked at most once. If a stock write fails, lines already booked
    /// are taken out again and the order returns to its previous status.
    pub async fn receive(
        &self,
        id: PurchaseOrderId,
        warehouse_id: WarehouseId,
    ) -> ClientResult<PurchaseOrder> {
        self.client
            .mutate(&RECEIVE, async {
                let order = self.get(id).await?;
                order.ensure_receivable()?;
                order.ensure_transition(PurchaseOrderStatus::Received)?;

                let received: PurchaseOrder = self
                    .client
                    .claim_status(
                        PURCHASE_ORDERS,
                        id,
                        order.status,
                        PurchaseOrderStatus::Received,
                    )
                    .await?;

                let mut written: Vec<(Decimal, InventoryStock)> = Vec::new();
                for (item_id, quantity) in order.receipt_quantities() {
                    match self.client.add_stock(item_id, warehouse_id, quantity).await {
                        Ok(change) => written.push(change),
                        Err(e) => {
                            self.client.restore_stock(&written).await;
                            self.client
                                .release_status(
                                    PURCHASE_ORDERS,
                                    id,
                                    PurchaseOrderStatus::Received,
                                    order.status,
                                )
                                .await;
                            return Err(e);
                        }
                    }
                }

                let reference = format!("purchase_order:{}", order.order_number);
                let movements: Vec<NewMovement> = written
                    .iter()
                    .map(|(before, after)| {
                        NewMovement::between(
                            after.item_id,
                            warehouse_id,
                            *before,
                            after.quantity,
                            MovementReason::PurchaseReceipt,
                        )
                        .with_reference(reference.clone())
                    })
                    .collect();
                self.client.append_movements(&movements).await;

                tracing::info!(
                    order_id = %id,
                    %warehouse_id,
                    items = movements.len(),
                    "purchase order received"
                );
                Ok(received)
            })
            .await
    }

    async fn insert_lines(&self, lines: &[NewPurchaseOrderLine]) -> ClientResult<()> {
        if lines.is_empty() {
            return Ok(());
        }
        self.client
            .table(PURCHASE_ORDER_ITEMS)
            .insert_many::<_, Value>(lines)
            .await?;
        Ok(())
    }

    async fn discard_header(&self, id: PurchaseOrderId) {
        let result = self
            .client
            .table(PURCHASE_ORDERS)
            .delete(&[Filter::eq("id", id)])
            .await;
        if let Err(e) = result {
            tracing::warn!(order_id = %id, error = %e, "failed to remove header of incomplete purchase order");
        }
    }
}
