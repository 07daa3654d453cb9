use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use ceramerp_core::validation::invalid;
use ceramerp_core::{DomainError, DomainResult, Entity, define_id, non_negative};
use ceramerp_products::{ItemId, ItemRef};

use crate::warehouse::{WarehouseId, WarehouseRef};

define_id!(StockId, "StockId");

/// Stock of one item in one warehouse (`inventory_stock`).
///
/// At most one row exists per `(item_id, warehouse_id)`; writes go through an
/// upsert on that pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStock {
    pub id: StockId,
    pub item_id: ItemId,
    pub warehouse_id: WarehouseId,
    pub quantity: Decimal,
    #[serde(default)]
    pub min_quantity: Option<Decimal>,
    #[serde(default)]
    pub max_quantity: Option<Decimal>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<WarehouseRef>,
}

impl Entity for InventoryStock {
    type Id = StockId;
    const TABLE: &'static str = "inventory_stock";

    fn id(&self) -> StockId {
        self.id
    }
}

impl InventoryStock {
    /// Quantity is strictly below the configured minimum.
    pub fn is_below_minimum(&self) -> bool {
        self.min_quantity.is_some_and(|min| self.quantity < min)
    }

    pub fn is_above_maximum(&self) -> bool {
        self.max_quantity.is_some_and(|max| self.quantity > max)
    }

    /// Quantity left after taking `amount` out; stock never goes negative.
    pub fn withdraw(&self, amount: Decimal) -> DomainResult<Decimal> {
        let remaining = self.quantity - amount;
        if remaining < Decimal::ZERO {
            return Err(DomainError::conflict(format!(
                "insufficient stock: {} available, {} requested",
                self.quantity, amount
            )));
        }
        Ok(remaining)
    }

    pub fn item_code(&self) -> Option<&str> {
        self.item.as_ref().map(|i| i.code.as_str())
    }
}

/// New quantity and thresholds for an existing stock row.
///
/// Serialized as the update patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "adjustment_thresholds"))]
pub struct StockAdjustment {
    #[validate(custom(function = "non_negative"))]
    pub quantity: Decimal,
    pub min_quantity: Option<Decimal>,
    pub max_quantity: Option<Decimal>,
}

impl StockAdjustment {
    pub fn quantity(quantity: Decimal) -> Self {
        Self {
            quantity,
            min_quantity: None,
            max_quantity: None,
        }
    }

    /// Same quantity change, keeping the thresholds already on `row`.
    pub fn keeping_thresholds(quantity: Decimal, row: &InventoryStock) -> Self {
        Self {
            quantity,
            min_quantity: row.min_quantity,
            max_quantity: row.max_quantity,
        }
    }
}

fn adjustment_thresholds(adjustment: &StockAdjustment) -> Result<(), ValidationError> {
    check_thresholds(adjustment.min_quantity, adjustment.max_quantity)
}

/// Stock row keyed by `(item_id, warehouse_id)` for insert-or-update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "upsert_thresholds"))]
pub struct StockUpsert {
    pub item_id: ItemId,
    pub warehouse_id: WarehouseId,
    #[validate(custom(function = "non_negative"))]
    pub quantity: Decimal,
    pub min_quantity: Option<Decimal>,
    pub max_quantity: Option<Decimal>,
}

impl StockUpsert {
    pub fn new(item_id: ItemId, warehouse_id: WarehouseId, quantity: Decimal) -> Self {
        Self {
            item_id,
            warehouse_id,
            quantity,
            min_quantity: None,
            max_quantity: None,
        }
    }
}

fn upsert_thresholds(upsert: &StockUpsert) -> Result<(), ValidationError> {
    check_thresholds(upsert.min_quantity, upsert.max_quantity)
}

fn check_thresholds(min: Option<Decimal>, max: Option<Decimal>) -> Result<(), ValidationError> {
    if min.is_some_and(|m| m < Decimal::ZERO) {
        return Err(invalid("min_quantity", "minimum quantity must not be negative"));
    }
    if max.is_some_and(|m| m < Decimal::ZERO) {
        return Err(invalid("max_quantity", "maximum quantity must not be negative"));
    }
    if let (Some(min), Some(max)) = (min, max) {
        if max < min {
            return Err(invalid(
                "thresholds",
                "maximum quantity must not be below the minimum",
            ));
        }
    }
    Ok(())
}
