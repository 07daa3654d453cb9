#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use ceramerp_backend::schema::{INVENTORY_STOCK, ITEMS, WAREHOUSES};
use ceramerp_backend::{DataApi, InMemoryAuthService, InMemoryDataApi};
use ceramerp_client::{AdjustmentGuard, ErpClient, RecordingNotifier};
use ceramerp_inventory::{StockId, WarehouseId};
use ceramerp_products::ItemId;

pub struct Harness {
    pub data: Arc<InMemoryDataApi>,
    pub auth: Arc<InMemoryAuthService>,
    pub notifier: Arc<RecordingNotifier>,
    pub client: ErpClient,
}

pub fn harness() -> Harness {
    let data = Arc::new(InMemoryDataApi::with_schema());
    harness_over(data.clone(), data, AdjustmentGuard::Snapshot)
}

/// Client talking to `api`, with `data` as the store behind it.
pub fn harness_over(
    data: Arc<InMemoryDataApi>,
    api: Arc<dyn DataApi>,
    guard: AdjustmentGuard,
) -> Harness {
    let auth = Arc::new(InMemoryAuthService::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let client = ErpClient::builder(api, auth.clone())
        .notifier(notifier.clone())
        .adjustment_guard(guard)
        .build();
    Harness {
        data,
        auth,
        notifier,
        client,
    }
}

pub fn seed_item(data: &InMemoryDataApi, code: &str) -> ItemId {
    let id = ItemId::new();
    data.seed(
        ITEMS,
        json!({
            "id": id,
            "code": code,
            "description": format!("{code} glazed"),
            "unit": "un",
            "active": true,
        }),
    )
    .unwrap();
    id
}

pub fn seed_warehouse(data: &InMemoryDataApi, code: &str) -> WarehouseId {
    let id = WarehouseId::new();
    data.seed(
        WAREHOUSES,
        json!({ "id": id, "code": code, "name": format!("Warehouse {code}"), "active": true }),
    )
    .unwrap();
    id
}

pub fn seed_stock(
    data: &InMemoryDataApi,
    item_id: ItemId,
    warehouse_id: WarehouseId,
    quantity: Decimal,
) -> StockId {
    let id = StockId::new();
    data.seed(
        INVENTORY_STOCK,
        json!({
            "id": id,
            "item_id": item_id,
            "warehouse_id": warehouse_id,
            "quantity": quantity,
            "min_quantity": null,
            "max_quantity": null,
        }),
    )
    .unwrap();
    id
}

/// Quantity stored for an `(item, warehouse)` pair, read straight from the store.
pub fn stored_quantity(
    data: &InMemoryDataApi,
    item_id: ItemId,
    warehouse_id: WarehouseId,
) -> Option<Decimal> {
    data.rows(INVENTORY_STOCK)
        .into_iter()
        .find(|row| {
            row["item_id"] == json!(item_id) && row["warehouse_id"] == json!(warehouse_id)
        })
        .map(|row| serde_json::from_value(row["quantity"].clone()).unwrap())
}
