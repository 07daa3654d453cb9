use serde::Serialize;

use ceramerp_backend::schema::{
    INVENTORY_MOVEMENTS, INVENTORY_STOCK, INVENTORY_STOCK_CONFLICT, STOCK_TRANSFERS,
};
use ceramerp_backend::Query;
use ceramerp_inventory::{
    InventoryStock, StockTransfer, StockUpsert, TransferId, TransferInput, TransferPlan,
    TransferStatus,
};

use crate::cache::{DASHBOARD, QueryKey};
use crate::client::ErpClient;
use crate::error::{ClientError, ClientResult};
use crate::hooks::{Mutation, validate};

const CREATE: Mutation = Mutation {
    success: "Transfer created",
    failure: "Could not create transfer",
    invalidates: &[STOCK_TRANSFERS],
};
const COMPLETE: Mutation = Mutation {
    success: "Transfer completed",
    failure: "Could not complete transfer",
    invalidates: &[STOCK_TRANSFERS, INVENTORY_STOCK, INVENTORY_MOVEMENTS, DASHBOARD],
};
const CANCEL: Mutation = Mutation {
    success: "Transfer cancelled",
    failure: "Could not cancel transfer",
    invalidates: &[STOCK_TRANSFERS],
};

#[derive(Serialize)]
struct NewTransfer<'a> {
    #[serde(flatten)]
    input: &'a TransferInput,
    status: TransferStatus,
}

pub struct TransferHooks<'a> {
    client: &'a ErpClient,
}

impl<'a> TransferHooks<'a> {
    pub(crate) fn new(client: &'a ErpClient) -> Self {
        Self { client }
    }

    /// Transfers, most recent first.
    pub async fn list(&self) -> ClientResult<Vec<StockTransfer>> {
        self.client
            .cached_rows(
                QueryKey::new(STOCK_TRANSFERS),
                STOCK_TRANSFERS,
                Query::new()
                    .order_desc("transfer_date")
                    .order_desc("created_at"),
            )
            .await
    }

    pub async fn get(&self, id: TransferId) -> ClientResult<StockTransfer> {
        self.client
            .find(
                STOCK_TRANSFERS,
                &Query::new().eq("id", id),
                format!("transfer {id}"),
            )
            .await
    }

    /// Record a pending transfer. Stock is not touched until it is completed.
    pub async fn create(&self, input: TransferInput) -> ClientResult<StockTransfer> {
        validate(&input)?;
        let row = NewTransfer {
            input: &input,
            status: TransferStatus::Pending,
        };
        self.client
            .mutate(&CREATE, async {
                Ok(self.client.table(STOCK_TRANSFERS).insert(&row).await?)
            })
            .await
    }

    /// Move the quantity from the source to the destination warehouse.
    ///
    /// The transfer is claimed (`pending` to `completed`) before any stock is
    /// written, so it completes at most once. The source row must exist and
    /// hold enough stock. If a stock write fails, the source quantity is put
    /// back and the transfer returns to `pending`.
    pub async fn complete(&self, id: TransferId) -> ClientResult<StockTransfer> {
        self.client
            .mutate(&COMPLETE, async {
                let transfer = self.get(id).await?;
                transfer.ensure_pending()?;

                let source = self
                    .client
                    .stock_slot(transfer.item_id, transfer.from_warehouse_id)
                    .await?
                    .ok_or_else(|| {
                        ClientError::conflict("the source warehouse holds no stock of this item")
                    })?;
                let destination = self
                    .client
                    .stock_slot(transfer.item_id, transfer.to_warehouse_id)
                    .await?;
                let plan = transfer.plan(&source, destination.as_ref())?;

                let completed: StockTransfer = self
                    .client
                    .claim_status(
                        STOCK_TRANSFERS,
                        id,
                        TransferStatus::Pending,
                        TransferStatus::Completed,
                    )
                    .await?;

                let moved = self
                    .move_stock(&transfer, &source, destination.as_ref(), &plan)
                    .await;
                if let Err(e) = moved {
                    self.client
                        .release_status(
                            STOCK_TRANSFERS,
                            id,
                            TransferStatus::Completed,
                            TransferStatus::Pending,
                        )
                        .await;
                    return Err(e);
                }

                self.client.append_movements(&transfer.movements(&plan)).await;
                tracing::info!(transfer_id = %id, quantity = %transfer.quantity, "transfer completed");
                Ok(completed)
            })
            .await
    }

    async fn move_stock(
        &self,
        transfer: &StockTransfer,
        source: &InventoryStock,
        destination: Option<&InventoryStock>,
        plan: &TransferPlan,
    ) -> ClientResult<()> {
        let source_after = self.client.set_quantity(source, plan.source_after).await?;
        let written = match destination {
            Some(row) => self
                .client
                .set_quantity(row, plan.destination_after)
                .await
                .map(drop),
            None => {
                let row = StockUpsert::new(
                    transfer.item_id,
                    transfer.to_warehouse_id,
                    plan.destination_after,
                );
                self.client
                    .table(INVENTORY_STOCK)
                    .upsert::<_, InventoryStock>(&row, INVENTORY_STOCK_CONFLICT)
                    .await
                    .map(drop)
                    .map_err(ClientError::from)
            }
        };
        if written.is_err() {
            self.client
                .restore_stock(&[(plan.source_before, source_after)])
                .await;
        }
        written
    }

    pub async fn cancel(&self, id: TransferId) -> ClientResult<StockTransfer> {
        self.client
            .mutate(&CANCEL, async {
                let transfer = self.get(id).await?;
                transfer.ensure_pending()?;
                self.client
                    .claim_status(
                        STOCK_TRANSFERS,
                        id,
                        TransferStatus::Pending,
                        TransferStatus::Cancelled,
                    )
                    .await
            })
            .await
    }
}
