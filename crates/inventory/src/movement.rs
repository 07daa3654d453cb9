use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ceramerp_core::{Entity, define_id};
use ceramerp_products::{ItemId, ItemRef};

use crate::stock::InventoryStock;
use crate::warehouse::{WarehouseId, WarehouseRef};

define_id!(MovementId, "MovementId");

/// Why a stock quantity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    ManualAdjustment,
    TransferOut,
    TransferIn,
    PurchaseReceipt,
    SalesShipment,
    InitialStock,
}

impl MovementReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementReason::ManualAdjustment => "manual_adjustment",
            MovementReason::TransferOut => "transfer_out",
            MovementReason::TransferIn => "transfer_in",
            MovementReason::PurchaseReceipt => "purchase_receipt",
            MovementReason::SalesShipment => "sales_shipment",
            MovementReason::InitialStock => "initial_stock",
        }
    }
}

impl core::fmt::Display for MovementReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of one stock change (`inventory_movements`). Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub id: MovementId,
    pub item_id: ItemId,
    pub warehouse_id: WarehouseId,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    pub delta: Decimal,
    pub reason: MovementReason,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<WarehouseRef>,
}

impl Entity for InventoryMovement {
    type Id = MovementId;
    const TABLE: &'static str = "inventory_movements";

    fn id(&self) -> MovementId {
        self.id
    }
}

/// Movement to append after a successful stock write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub item_id: ItemId,
    pub warehouse_id: WarehouseId,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    pub delta: Decimal,
    pub reason: MovementReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl NewMovement {
    /// Movement between two quantities of the same stock slot.
    ///
    /// `delta` is `after - before`, exact.
    pub fn between(
        item_id: ItemId,
        warehouse_id: WarehouseId,
        before: Decimal,
        after: Decimal,
        reason: MovementReason,
    ) -> Self {
        Self {
            item_id,
            warehouse_id,
            quantity_before: before,
            quantity_after: after,
            delta: after - before,
            reason,
            reference: None,
        }
    }

    /// Movement between the row read before a write and the row the write returned.
    pub fn from_snapshots(
        before: &InventoryStock,
        after: &InventoryStock,
        reason: MovementReason,
    ) -> Self {
        Self::between(
            after.item_id,
            after.warehouse_id,
            before.quantity,
            after.quantity,
            reason,
        )
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Scope of a movement listing, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementFilter {
    pub item_id: Option<ItemId>,
    pub warehouse_id: Option<WarehouseId>,
    pub reason: Option<MovementReason>,
    pub limit: usize,
}

impl Default for MovementFilter {
    fn default() -> Self {
        Self {
            item_id: None,
            warehouse_id: None,
            reason: None,
            limit: 100,
        }
    }
}

impl MovementFilter {
    pub fn for_item(item_id: ItemId) -> Self {
        Self {
            item_id: Some(item_id),
            ..Self::default()
        }
    }

    pub fn for_warehouse(warehouse_id: WarehouseId) -> Self {
        Self {
            warehouse_id: Some(warehouse_id),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::StockId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn stock(quantity: Decimal) -> InventoryStock {
        InventoryStock {
            id: StockId::new(),
            item_id: ItemId::new(),
            warehouse_id: WarehouseId::new(),
            quantity,
            min_quantity: None,
            max_quantity: None,
            updated_at: None,
            item: None,
            warehouse: None,
        }
    }

    #[test]
    fn reason_serializes_snake_case() {
        let json = serde_json::to_value(MovementReason::ManualAdjustment).unwrap();
        assert_eq!(json, "manual_adjustment");
        let parsed: MovementReason = serde_json::from_value("purchase_receipt".into()).unwrap();
        assert_eq!(parsed, MovementReason::PurchaseReceipt);
    }

    #[test]
    fn snapshots_keep_fractional_delta_exact() {
        let before = stock(dec!(10.1));
        let mut after = before.clone();
        after.quantity = dec!(10.3);
        let movement = NewMovement::from_snapshots(&before, &after, MovementReason::ManualAdjustment);
        assert_eq!(movement.delta, dec!(0.2));
        assert_eq!(movement.quantity_before, dec!(10.1));
        assert_eq!(movement.quantity_after, dec!(10.3));
    }

    #[test]
    fn reference_is_omitted_when_absent() {
        let movement = NewMovement::between(
            ItemId::new(),
            WarehouseId::new(),
            dec!(1),
            dec!(0),
            MovementReason::SalesShipment,
        );
        let body = serde_json::to_value(&movement).unwrap();
        assert!(body.get("reference").is_none());
        let body = serde_json::to_value(movement.with_reference("SO-0001")).unwrap();
        assert_eq!(body["reference"], "SO-0001");
    }

    fn quantity() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000, 0u32..4).prop_map(|(units, scale)| Decimal::new(units, scale))
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn delta_reconstructs_after_from_before(before in quantity(), after in quantity()) {
            let movement = NewMovement::between(
                ItemId::new(),
                WarehouseId::new(),
                before,
                after,
                MovementReason::ManualAdjustment,
            );
            prop_assert_eq!(movement.quantity_before + movement.delta, movement.quantity_after);
            prop_assert_eq!(movement.delta, after - before);
        }
    }
}
