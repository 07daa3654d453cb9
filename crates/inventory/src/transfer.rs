use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use ceramerp_core::validation::invalid;
use ceramerp_core::{DomainError, DomainResult, Entity, define_id, positive};
use ceramerp_products::ItemId;

use crate::movement::{MovementReason, NewMovement};
use crate::stock::InventoryStock;
use crate::warehouse::WarehouseId;

define_id!(TransferId, "TransferId");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// Move of one item's quantity between two warehouses (`stock_transfers`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransfer {
    pub id: TransferId,
    pub item_id: ItemId,
    pub from_warehouse_id: WarehouseId,
    pub to_warehouse_id: WarehouseId,
    pub quantity: Decimal,
    #[serde(default)]
    pub status: TransferStatus,
    pub transfer_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for StockTransfer {
    type Id = TransferId;
    const TABLE: &'static str = "stock_transfers";

    fn id(&self) -> TransferId {
        self.id
    }
}

/// Quantities on both ends of a transfer, before and after completing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    pub source_before: Decimal,
    pub source_after: Decimal,
    pub destination_before: Decimal,
    pub destination_after: Decimal,
}

impl StockTransfer {
    pub fn ensure_pending(&self) -> DomainResult<()> {
        match self.status {
            TransferStatus::Pending => Ok(()),
            other => Err(DomainError::conflict(format!(
                "transfer {} is {:?}, not pending",
                self.id, other
            ))),
        }
    }

    /// Work out both stock quantities after completing the transfer.
    ///
    /// `destination` is `None` when the item has no stock row there yet.
    pub fn plan(
        &self,
        source: &InventoryStock,
        destination: Option<&InventoryStock>,
    ) -> DomainResult<TransferPlan> {
        self.ensure_pending()?;
        if source.item_id != self.item_id || source.warehouse_id != self.from_warehouse_id {
            return Err(DomainError::invariant("source stock row does not match transfer"));
        }
        if let Some(dest) = destination {
            if dest.item_id != self.item_id || dest.warehouse_id != self.to_warehouse_id {
                return Err(DomainError::invariant(
                    "destination stock row does not match transfer",
                ));
            }
        }

        let source_after = source.withdraw(self.quantity)?;
        let destination_before = destination.map_or(Decimal::ZERO, |d| d.quantity);
        Ok(TransferPlan {
            source_before: source.quantity,
            source_after,
            destination_before,
            destination_after: destination_before + self.quantity,
        })
    }

    /// `transfer_out` and `transfer_in` movements for a completed plan.
    pub fn movements(&self, plan: &TransferPlan) -> [NewMovement; 2] {
        let reference = format!("transfer:{}", self.id);
        [
            NewMovement::between(
                self.item_id,
                self.from_warehouse_id,
                plan.source_before,
                plan.source_after,
                MovementReason::TransferOut,
            )
            .with_reference(reference.clone()),
            NewMovement::between(
                self.item_id,
                self.to_warehouse_id,
                plan.destination_before,
                plan.destination_after,
                MovementReason::TransferIn,
            )
            .with_reference(reference),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "distinct_warehouses"))]
pub struct TransferInput {
    pub item_id: ItemId,
    pub from_warehouse_id: WarehouseId,
    pub to_warehouse_id: WarehouseId,
    #[validate(custom(function = "positive"))]
    pub quantity: Decimal,
    pub transfer_date: NaiveDate,
    #[serde(default)]
    #[validate(length(max = 500, message = "notes are too long"))]
    pub notes: Option<String>,
}

fn distinct_warehouses(input: &TransferInput) -> Result<(), ValidationError> {
    if input.from_warehouse_id == input.to_warehouse_id {
        return Err(invalid(
            "same_warehouse",
            "source and destination warehouses must differ",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::StockId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn transfer(quantity: Decimal) -> StockTransfer {
        StockTransfer {
            id: TransferId::new(),
            item_id: ItemId::new(),
            from_warehouse_id: WarehouseId::new(),
            to_warehouse_id: WarehouseId::new(),
            quantity,
            status: TransferStatus::Pending,
            transfer_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            notes: None,
            created_at: None,
        }
    }

    fn stock_at(t: &StockTransfer, warehouse_id: WarehouseId, quantity: Decimal) -> InventoryStock {
        InventoryStock {
            id: StockId::new(),
            item_id: t.item_id,
            warehouse_id,
            quantity,
            min_quantity: None,
            max_quantity: None,
            updated_at: None,
            item: None,
            warehouse: None,
        }
    }

    #[test]
    fn plan_creates_destination_from_zero() {
        let t = transfer(dec!(4));
        let source = stock_at(&t, t.from_warehouse_id, dec!(10));
        let plan = t.plan(&source, None).unwrap();
        assert_eq!(plan.source_after, dec!(6));
        assert_eq!(plan.destination_before, dec!(0));
        assert_eq!(plan.destination_after, dec!(4));

        let [out, inn] = t.movements(&plan);
        assert_eq!(out.delta, dec!(-4));
        assert_eq!(out.reason, MovementReason::TransferOut);
        assert_eq!(inn.delta, dec!(4));
        assert_eq!(inn.warehouse_id, t.to_warehouse_id);
    }

    #[test]
    fn plan_rejects_insufficient_source() {
        let t = transfer(dec!(11));
        let source = stock_at(&t, t.from_warehouse_id, dec!(10));
        assert!(matches!(t.plan(&source, None), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn completed_transfer_cannot_be_replanned() {
        let mut t = transfer(dec!(1));
        t.status = TransferStatus::Completed;
        let source = stock_at(&t, t.from_warehouse_id, dec!(10));
        assert!(matches!(t.plan(&source, None), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn wrong_source_row_is_an_invariant_violation() {
        let t = transfer(dec!(1));
        let source = stock_at(&t, t.to_warehouse_id, dec!(10));
        assert!(matches!(
            t.plan(&source, None),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn same_warehouse_input_is_rejected() {
        let warehouse = WarehouseId::new();
        let input = TransferInput {
            item_id: ItemId::new(),
            from_warehouse_id: warehouse,
            to_warehouse_id: warehouse,
            quantity: dec!(1),
            transfer_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            notes: None,
        };
        assert!(input.validate().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn completion_conserves_total_quantity(
            source_qty in 0i64..100_000,
            dest_qty in 0i64..100_000,
            moved in 1i64..100_000,
        ) {
            let t = transfer(Decimal::new(moved, 2));
            let source = stock_at(&t, t.from_warehouse_id, Decimal::new(source_qty, 2));
            let dest = stock_at(&t, t.to_warehouse_id, Decimal::new(dest_qty, 2));
            match t.plan(&source, Some(&dest)) {
                Ok(plan) => {
                    prop_assert_eq!(
                        plan.source_after + plan.destination_after,
                        source.quantity + dest.quantity
                    );
                    prop_assert!(plan.source_after >= Decimal::ZERO);
                }
                Err(_) => prop_assert!(moved > source_qty),
            }
        }
    }
}
